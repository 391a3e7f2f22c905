//! Tree node kinds and their child computation
//!
//! Every node answers one question: "what are my children?". Listing
//! failures under a device are contained there and become a single
//! [`NotFoundItem`] leaf. Introspection failures under an app or process are
//! returned to the caller so the host renders its own failure state.

use serde::Serialize;

use tscope_core::prelude::*;
use tscope_core::{tree_depth, App, ClassNode, ClassTree, Device, Process, ProviderMode};
use tscope_driver::Driver;

use crate::facets::{
    Collapsible, ContextValue, Icon, ItemCommand, Resources, TreeItem, INSPECT_COMMAND,
};
use crate::hierarchy::HierarchyItem;

const ICON_RUNNING: &str = "statusRun.svg";
const ICON_STOPPED: &str = "statusStop.svg";
const ICON_ERROR: &str = "error.svg";

/// Node kind tag, for hosts that filter by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Device,
    App,
    Process,
    Hierarchy,
    NotFound,
}

/// A node of the target tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetItem {
    Device(DeviceItem),
    App(AppItem),
    Process(ProcessItem),
    Hierarchy(HierarchyItem),
    NotFound(NotFoundItem),
}

impl TargetItem {
    /// Compute this node's children, in backend order.
    ///
    /// Device and error-leaf nodes never fail. App and process nodes fail
    /// with the driver's introspection error.
    pub async fn children<D: Driver>(&self, driver: &D) -> Result<Vec<TargetItem>> {
        match self {
            TargetItem::Device(item) => Ok(item.children(driver).await),
            TargetItem::App(item) => item.children(driver).await,
            TargetItem::Process(item) => item.children(driver).await,
            TargetItem::Hierarchy(item) => Ok(item.children()),
            TargetItem::NotFound(_) => Ok(Vec::new()),
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            TargetItem::Device(_) => ItemKind::Device,
            TargetItem::App(_) => ItemKind::App,
            TargetItem::Process(_) => ItemKind::Process,
            TargetItem::Hierarchy(_) => ItemKind::Hierarchy,
            TargetItem::NotFound(_) => ItemKind::NotFound,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TargetItem::Device(item) => &item.device.name,
            TargetItem::App(item) => &item.app.name,
            TargetItem::Process(item) => &item.process.name,
            TargetItem::Hierarchy(item) => &item.name,
            TargetItem::NotFound(item) => &item.reason,
        }
    }

    /// The device this node lives under, if any.
    pub fn device(&self) -> Option<&Device> {
        match self {
            TargetItem::Device(item) => Some(&item.device),
            TargetItem::App(item) => Some(&item.device),
            TargetItem::Process(item) => Some(&item.device),
            TargetItem::NotFound(item) => Some(&item.device),
            TargetItem::Hierarchy(_) => None,
        }
    }

    pub fn tree_item(&self, resources: &Resources) -> TreeItem {
        match self {
            TargetItem::Device(item) => item.tree_item(resources),
            TargetItem::App(item) => item.tree_item(resources),
            TargetItem::Process(item) => item.tree_item(resources),
            TargetItem::Hierarchy(item) => item.tree_item(),
            TargetItem::NotFound(item) => item.tree_item(resources),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Device
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceItem {
    pub device: Device,
    pub mode: ProviderMode,
}

impl DeviceItem {
    pub fn new(device: Device, mode: ProviderMode) -> Self {
        Self { device, mode }
    }

    /// Apps or processes of this device, depending on the provider mode.
    /// A listing failure becomes a single error leaf.
    pub async fn children<D: Driver>(&self, driver: &D) -> Vec<TargetItem> {
        let device = &self.device;
        let listed: Result<Vec<TargetItem>> = match self.mode {
            ProviderMode::Apps => driver.apps(&device.id).await.map(|apps| {
                apps.into_iter()
                    .map(|app| TargetItem::App(AppItem::new(app, device.clone())))
                    .collect()
            }),
            ProviderMode::Processes => driver.ps(&device.id).await.map(|ps| {
                ps.into_iter()
                    .map(|p| TargetItem::Process(ProcessItem::new(p, device.clone())))
                    .collect()
            }),
        };

        listed.unwrap_or_else(|e| {
            warn!("Listing {} on device {} failed: {}", self.mode, device.id, e);
            vec![TargetItem::NotFound(NotFoundItem::from_error(&e, device.clone()))]
        })
    }

    pub fn tree_item(&self, resources: &Resources) -> TreeItem {
        let device = &self.device;
        TreeItem::new(device.name.clone(), Collapsible::Collapsed)
            .with_tooltip(format!("{} ({})", device.id, device.kind))
            .with_description(device.id.clone())
            .with_icon(resources.themed(device.kind.icon_file()))
            .with_context(ContextValue::Device)
    }
}

// ─────────────────────────────────────────────────────────────────
// App
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppItem {
    pub app: App,
    pub device: Device,
}

impl AppItem {
    pub fn new(app: App, device: Device) -> Self {
        Self { app, device }
    }

    /// Top-level namespaces of the running app. Installed-but-not-running
    /// apps have no children and issue no remote call.
    pub async fn children<D: Driver>(&self, driver: &D) -> Result<Vec<TargetItem>> {
        let Some(pid) = self.app.live_pid() else {
            debug!("{} is not running, nothing to introspect", self.app.identifier);
            return Ok(Vec::new());
        };

        let root = driver.classes(&self.device.id, pid).await?;
        Ok(expand_classes(root, pid))
    }

    pub fn tree_item(&self, resources: &Resources) -> TreeItem {
        let app = &self.app;
        let status = match app.live_pid() {
            Some(pid) => pid.to_string(),
            None => "Not Running".to_string(),
        };

        TreeItem::new(app.name.clone(), Collapsible::Collapsed)
            .with_tooltip(format!("{} ({})", app.name, status))
            .with_description(app.identifier.clone())
            .with_icon(status_icon(resources, app.large_icon.as_deref(), app.is_running()))
            .with_command(ItemCommand {
                command: INSPECT_COMMAND.to_string(),
                title: String::new(),
                arguments: vec![self.device.id.clone(), app.identifier.clone()],
            })
            .with_context(ContextValue::App)
    }
}

// ─────────────────────────────────────────────────────────────────
// Process
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessItem {
    pub process: Process,
    pub device: Device,
}

impl ProcessItem {
    pub fn new(process: Process, device: Device) -> Self {
        Self { process, device }
    }

    /// Top-level namespaces of the process.
    pub async fn children<D: Driver>(&self, driver: &D) -> Result<Vec<TargetItem>> {
        let root = driver.classes(&self.device.id, self.process.pid).await?;
        Ok(expand_classes(root, self.process.pid))
    }

    pub fn tree_item(&self, resources: &Resources) -> TreeItem {
        let process = &self.process;
        TreeItem::new(process.name.clone(), Collapsible::Collapsed)
            .with_tooltip(format!("{} ({})", process.name, process.pid))
            .with_description(process.pid.to_string())
            .with_icon(status_icon(
                resources,
                process.large_icon.as_deref(),
                process.pid != 0,
            ))
            .with_context(ContextValue::Process)
    }
}

fn expand_classes(root: ClassTree, pid: u32) -> Vec<TargetItem> {
    debug!(
        "pid {}: {} classes, {} levels deep",
        pid,
        root.values().map(ClassNode::class_count).sum::<usize>(),
        tree_depth(&root)
    );
    HierarchyItem::expand(root)
}

/// Backend image if there is one, otherwise the run/stop status icon.
fn status_icon(resources: &Resources, image: Option<&str>, running: bool) -> Icon {
    match image {
        Some(uri) => Icon::Uri {
            uri: uri.to_string(),
        },
        None if running => resources.themed(ICON_RUNNING),
        None => resources.themed(ICON_STOPPED),
    }
}

// ─────────────────────────────────────────────────────────────────
// Error leaf
// ─────────────────────────────────────────────────────────────────

/// A listing failure shown in place of a device's children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFoundItem {
    pub reason: String,
    pub device: Device,
}

impl NotFoundItem {
    pub fn new(reason: impl Into<String>, device: Device) -> Self {
        Self {
            reason: reason.into(),
            device,
        }
    }

    pub fn from_error(error: &Error, device: Device) -> Self {
        Self::new(error.reason(), device)
    }

    pub fn tree_item(&self, resources: &Resources) -> TreeItem {
        TreeItem::new(self.reason.clone(), Collapsible::None)
            .with_tooltip(self.reason.clone())
            .with_icon(resources.themed(ICON_ERROR))
            .with_context(ContextValue::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;
    use tscope_core::DeviceKind;
    use tscope_driver::test_utils::{test_app, test_device, test_process, FakeCall, FakeDriver};

    fn usb() -> Device {
        test_device("usb1", "iPhone", DeviceKind::Usb)
    }

    fn classes(value: serde_json::Value) -> tscope_core::ClassTree {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_device_lists_apps_in_apps_mode() {
        let driver = FakeDriver::connected().with_apps(
            "usb1",
            vec![
                test_app("com.example.b", "B", Some(7)),
                test_app("com.example.a", "A", None),
            ],
        );
        let item = TargetItem::Device(DeviceItem::new(usb(), ProviderMode::Apps));

        let children = item.children(&driver).await.unwrap();
        let labels: Vec<&str> = children.iter().map(TargetItem::label).collect();
        assert_eq!(labels, vec!["B", "A"]);
        assert!(children.iter().all(|c| c.kind() == ItemKind::App));
        assert_eq!(children[0].device(), Some(&usb()));
        assert_eq!(driver.calls(), vec![FakeCall::Apps("usb1".to_string())]);
    }

    #[tokio::test]
    async fn test_device_lists_processes_in_ps_mode() {
        let driver =
            FakeDriver::connected().with_processes("usb1", vec![test_process("SpringBoard", 61)]);
        let item = TargetItem::Device(DeviceItem::new(usb(), ProviderMode::Processes));

        let children = item.children(&driver).await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].kind(), ItemKind::Process);
        assert_eq!(driver.calls(), vec![FakeCall::Ps("usb1".to_string())]);
    }

    #[tokio::test]
    async fn test_device_listing_failure_becomes_error_leaf() {
        let driver = FakeDriver::connected().with_apps_error("usb1", "device offline");
        let item = TargetItem::Device(DeviceItem::new(usb(), ProviderMode::Apps));

        let children = item.children(&driver).await.unwrap();
        assert_eq!(children.len(), 1);
        match &children[0] {
            TargetItem::NotFound(leaf) => {
                assert_eq!(leaf.reason, "device offline");
                assert_eq!(leaf.device, usb());
            }
            other => panic!("expected error leaf, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_process_listing_failure_becomes_error_leaf() {
        let driver = FakeDriver::connected().with_processes_error("usb1", "access denied");
        let item = DeviceItem::new(usb(), ProviderMode::Processes);

        let children = item.children(&driver).await;
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].label(), "access denied");
    }

    #[tokio::test]
    async fn test_not_running_app_makes_no_call() {
        let driver = FakeDriver::connected();
        for pid in [None, Some(0)] {
            let item = TargetItem::App(AppItem::new(test_app("com.a", "A", pid), usb()));
            assert!(item.children(&driver).await.unwrap().is_empty());
        }
        assert_eq!(driver.call_count(), 0);
    }

    #[tokio::test]
    async fn test_running_app_expands_class_tree() {
        let driver = FakeDriver::connected().with_classes(
            "usb1",
            42,
            classes(json!({"com": {"example": {"Foo": {}}}, "NSObject": {}})),
        );
        let item = TargetItem::App(AppItem::new(test_app("com.a", "A", Some(42)), usb()));

        let children = item.children(&driver).await.unwrap();
        let labels: Vec<&str> = children.iter().map(TargetItem::label).collect();
        assert_eq!(labels, vec!["com", "NSObject"]);
        assert_eq!(
            driver.calls(),
            vec![FakeCall::Classes("usb1".to_string(), 42)]
        );
    }

    #[tokio::test]
    async fn test_app_introspection_failure_propagates() {
        let driver = FakeDriver::connected().with_classes_error("usb1", 42, "process detached");
        let item = TargetItem::App(AppItem::new(test_app("com.a", "A", Some(42)), usb()));

        let err = item.children(&driver).await.unwrap_err();
        assert!(matches!(err, Error::Introspection { .. }));
        assert_eq!(err.reason(), "process detached");
    }

    #[tokio::test]
    async fn test_process_introspection_failure_propagates() {
        let driver = FakeDriver::connected().with_classes_error("usb1", 61, "unsupported");
        let item = TargetItem::Process(ProcessItem::new(test_process("SpringBoard", 61), usb()));

        let err = item.children(&driver).await.unwrap_err();
        assert_eq!(err.reason(), "unsupported");
    }

    #[tokio::test]
    async fn test_error_leaf_has_no_children() {
        let driver = FakeDriver::connected();
        let item = TargetItem::NotFound(NotFoundItem::new("device offline", usb()));
        assert!(item.children(&driver).await.unwrap().is_empty());
        assert_eq!(driver.call_count(), 0);
    }

    #[tokio::test]
    async fn test_children_are_idempotent() {
        let driver = FakeDriver::connected().with_apps(
            "usb1",
            vec![test_app("com.a", "A", Some(1)), test_app("com.b", "B", None)],
        );
        let item = TargetItem::Device(DeviceItem::new(usb(), ProviderMode::Apps));

        let first = item.children(&driver).await.unwrap();
        let second = item.children(&driver).await.unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_device_facets() {
        let res = Resources::new("res");
        let facets = DeviceItem::new(usb(), ProviderMode::Apps).tree_item(&res);

        assert_eq!(facets.label, "iPhone");
        assert_eq!(facets.tooltip.as_deref(), Some("usb1 (usb)"));
        assert_eq!(facets.description.as_deref(), Some("usb1"));
        assert_eq!(facets.context_value, Some(ContextValue::Device));
        assert_eq!(
            facets.icon,
            Some(Icon::Themed {
                light: PathBuf::from("res/light/usb.svg"),
                dark: PathBuf::from("res/dark/usb.svg"),
            })
        );
    }

    #[test]
    fn test_unknown_device_kind_uses_local_icon() {
        let res = Resources::new("res");
        let device = test_device("t1", "Tethered", DeviceKind::Unknown);
        let facets = DeviceItem::new(device, ProviderMode::Apps).tree_item(&res);

        assert_eq!(facets.tooltip.as_deref(), Some("t1 (unknown)"));
        assert_eq!(facets.icon, Some(res.themed("local.svg")));
    }

    #[test]
    fn test_app_facets_not_running() {
        let res = Resources::new("res");
        let facets = AppItem::new(test_app("com.example", "Example", None), usb()).tree_item(&res);

        assert_eq!(facets.tooltip.as_deref(), Some("Example (Not Running)"));
        assert_eq!(facets.description.as_deref(), Some("com.example"));
        assert_eq!(facets.icon, Some(res.themed("statusStop.svg")));
        assert_eq!(facets.context_value, Some(ContextValue::App));

        let command = facets.command.unwrap();
        assert_eq!(command.command, INSPECT_COMMAND);
        assert_eq!(command.arguments, vec!["usb1", "com.example"]);
    }

    #[test]
    fn test_app_facets_running_with_image() {
        let res = Resources::new("res");
        let mut app = test_app("com.example", "Example", Some(42));
        app.large_icon = Some("data:image/png;base64,AAAA".to_string());
        let facets = AppItem::new(app, usb()).tree_item(&res);

        assert_eq!(facets.tooltip.as_deref(), Some("Example (42)"));
        assert_eq!(
            facets.icon,
            Some(Icon::Uri {
                uri: "data:image/png;base64,AAAA".to_string()
            })
        );
    }

    #[test]
    fn test_process_facets() {
        let res = Resources::new("res");
        let facets = ProcessItem::new(test_process("SpringBoard", 61), usb()).tree_item(&res);

        assert_eq!(facets.label, "SpringBoard");
        assert_eq!(facets.tooltip.as_deref(), Some("SpringBoard (61)"));
        assert_eq!(facets.description.as_deref(), Some("61"));
        assert_eq!(facets.icon, Some(res.themed("statusRun.svg")));
        assert_eq!(facets.context_value, Some(ContextValue::Process));
        assert!(facets.command.is_none());
    }

    #[test]
    fn test_error_leaf_facets() {
        let res = Resources::new("res");
        let facets = NotFoundItem::new("device offline", usb()).tree_item(&res);

        assert_eq!(facets.label, "device offline");
        assert_eq!(facets.tooltip.as_deref(), Some("device offline"));
        assert_eq!(facets.icon, Some(res.themed("error.svg")));
        assert_eq!(facets.context_value, Some(ContextValue::Empty));
        assert_eq!(facets.collapsible, Collapsible::None);
    }
}
