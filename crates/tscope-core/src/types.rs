//! Target domain types reported by the driver
//!
//! These records are decoded straight from driver responses and are shared by
//! the transport layer (which parses them) and the tree layer (which wraps them
//! into expandable nodes).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Provider mode
// ============================================================================

/// Which listing a device node expands into.
///
/// Fixed when a provider is constructed; every device node created by that
/// provider carries the same mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProviderMode {
    /// Installed applications (`apps` remote call)
    #[default]
    #[serde(rename = "apps")]
    Apps,
    /// Running processes (`ps` remote call)
    #[serde(rename = "ps")]
    Processes,
}

impl ProviderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderMode::Apps => "apps",
            ProviderMode::Processes => "ps",
        }
    }
}

impl fmt::Display for ProviderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "apps" | "app" => Ok(ProviderMode::Apps),
            "ps" | "processes" | "process" => Ok(ProviderMode::Processes),
            other => Err(format!("unknown provider mode '{other}' (expected apps or ps)")),
        }
    }
}

// ============================================================================
// Device
// ============================================================================

/// How the driver reaches a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    #[default]
    Local,
    Remote,
    Usb,
    /// A category this build does not know; the device is still listed.
    #[serde(other)]
    Unknown,
}

impl DeviceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Local => "local",
            DeviceKind::Remote => "remote",
            DeviceKind::Usb => "usb",
            DeviceKind::Unknown => "unknown",
        }
    }

    /// Bundled icon file for the category. Unknown categories borrow the local icon.
    pub fn icon_file(&self) -> &'static str {
        match self {
            DeviceKind::Local | DeviceKind::Unknown => "local.svg",
            DeviceKind::Remote => "remote.svg",
            DeviceKind::Usb => "usb.svg",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A device the driver can reach
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Opaque identifier, stable per physical/virtual device
    pub id: String,

    /// Human-readable device name
    pub name: String,

    /// Device category. The driver sends it as `type`; `category` is accepted too.
    #[serde(rename = "type", alias = "category", default)]
    pub kind: DeviceKind,

    /// Backend-provided icon reference, if any
    #[serde(default, deserialize_with = "non_empty")]
    pub icon: Option<String>,
}

impl Device {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            icon: None,
        }
    }
}

// ============================================================================
// App / Process
// ============================================================================

/// An installed application on a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct App {
    /// Bundle / package identifier
    pub identifier: String,

    pub name: String,

    /// Process id; `0` or absent means the app is not running
    #[serde(default)]
    pub pid: Option<u32>,

    #[serde(default, deserialize_with = "non_empty")]
    pub large_icon: Option<String>,

    #[serde(default, deserialize_with = "non_empty")]
    pub small_icon: Option<String>,
}

impl App {
    /// The pid of the running app, or `None` when it is installed but not launched.
    pub fn live_pid(&self) -> Option<u32> {
        self.pid.filter(|pid| *pid != 0)
    }

    pub fn is_running(&self) -> bool {
        self.live_pid().is_some()
    }
}

/// A running process on a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    pub name: String,

    pub pid: u32,

    #[serde(default, deserialize_with = "non_empty")]
    pub large_icon: Option<String>,

    #[serde(default, deserialize_with = "non_empty")]
    pub small_icon: Option<String>,
}

/// Treat `""` and `null` the same as a missing field.
fn non_empty<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
