//! Test utilities for driver consumers
//!
//! Provides record constructors and [`FakeDriver`], an in-memory [`Driver`]
//! with canned responses that records every remote call it receives.

use std::collections::HashMap;
use std::sync::Mutex;

use tscope_core::prelude::*;
use tscope_core::{App, ClassTree, Device, DeviceKind, Process};

use crate::driver::Driver;

/// Creates a test device.
pub fn test_device(id: &str, name: &str, kind: DeviceKind) -> Device {
    Device::new(id, name, kind)
}

/// Creates a test app. `pid` of `None` or `Some(0)` means not running.
pub fn test_app(identifier: &str, name: &str, pid: Option<u32>) -> App {
    App {
        identifier: identifier.to_string(),
        name: name.to_string(),
        pid,
        large_icon: None,
        small_icon: None,
    }
}

/// Creates a test process.
pub fn test_process(name: &str, pid: u32) -> Process {
    Process {
        name: name.to_string(),
        pid,
        large_icon: None,
        small_icon: None,
    }
}

/// A remote call observed by [`FakeDriver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCall {
    Devices,
    Apps(String),
    Ps(String),
    Classes(String, u32),
}

type Canned<T> = std::result::Result<T, String>;

/// In-memory driver with canned per-device / per-process responses.
///
/// Unknown devices or processes answer with a driver rejection, the same way
/// the real driver does.
#[derive(Debug, Default)]
pub struct FakeDriver {
    connected: bool,
    devices: Option<Canned<Vec<Device>>>,
    apps: HashMap<String, Canned<Vec<App>>>,
    processes: HashMap<String, Canned<Vec<Process>>>,
    classes: HashMap<(String, u32), Canned<ClassTree>>,
    calls: Mutex<Vec<FakeCall>>,
}

impl FakeDriver {
    /// A connected driver with no devices.
    pub fn connected() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    /// A driver that reports it is not attached.
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn with_devices(mut self, devices: Vec<Device>) -> Self {
        self.devices = Some(Ok(devices));
        self
    }

    pub fn with_devices_error(mut self, message: &str) -> Self {
        self.devices = Some(Err(message.to_string()));
        self
    }

    pub fn with_apps(mut self, device_id: &str, apps: Vec<App>) -> Self {
        self.apps.insert(device_id.to_string(), Ok(apps));
        self
    }

    pub fn with_apps_error(mut self, device_id: &str, message: &str) -> Self {
        self.apps
            .insert(device_id.to_string(), Err(message.to_string()));
        self
    }

    pub fn with_processes(mut self, device_id: &str, processes: Vec<Process>) -> Self {
        self.processes.insert(device_id.to_string(), Ok(processes));
        self
    }

    pub fn with_processes_error(mut self, device_id: &str, message: &str) -> Self {
        self.processes
            .insert(device_id.to_string(), Err(message.to_string()));
        self
    }

    pub fn with_classes(mut self, device_id: &str, pid: u32, tree: ClassTree) -> Self {
        self.classes.insert((device_id.to_string(), pid), Ok(tree));
        self
    }

    pub fn with_classes_error(mut self, device_id: &str, pid: u32, message: &str) -> Self {
        self.classes
            .insert((device_id.to_string(), pid), Err(message.to_string()));
        self
    }

    /// Every remote call received so far, in order.
    pub fn calls(&self) -> Vec<FakeCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn record(&self, call: FakeCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

impl Driver for FakeDriver {
    fn connected(&self) -> bool {
        self.connected
    }

    async fn devices(&self) -> Result<Vec<Device>> {
        self.record(FakeCall::Devices);
        match &self.devices {
            Some(Ok(devices)) => Ok(devices.clone()),
            Some(Err(message)) => Err(Error::driver(message.clone())),
            None => Ok(Vec::new()),
        }
    }

    async fn apps(&self, device_id: &str) -> Result<Vec<App>> {
        self.record(FakeCall::Apps(device_id.to_string()));
        match self.apps.get(device_id) {
            Some(Ok(apps)) => Ok(apps.clone()),
            Some(Err(message)) => Err(Error::driver(message.clone())),
            None => Err(Error::driver(format!("unable to find device with id {device_id}"))),
        }
    }

    async fn ps(&self, device_id: &str) -> Result<Vec<Process>> {
        self.record(FakeCall::Ps(device_id.to_string()));
        match self.processes.get(device_id) {
            Some(Ok(processes)) => Ok(processes.clone()),
            Some(Err(message)) => Err(Error::driver(message.clone())),
            None => Err(Error::driver(format!("unable to find device with id {device_id}"))),
        }
    }

    async fn classes(&self, device_id: &str, pid: u32) -> Result<ClassTree> {
        self.record(FakeCall::Classes(device_id.to_string(), pid));
        match self.classes.get(&(device_id.to_string(), pid)) {
            Some(Ok(tree)) => Ok(tree.clone()),
            Some(Err(message)) => Err(Error::introspection(message.clone())),
            None => Err(Error::introspection(format!("process not found: {pid}"))),
        }
    }
}
