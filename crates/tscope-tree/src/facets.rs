//! Display facets handed to the host tree widget
//!
//! A [`TreeItem`] is everything the host needs to draw one row: label,
//! tooltip, secondary label, icon, activation command, and the context tag it
//! uses to filter contextual actions.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Command id dispatched when an app row is activated.
pub const INSPECT_COMMAND: &str = "tscope.inspect";

/// Context tag the host uses to pick contextual actions for a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextValue {
    Device,
    App,
    Process,
    /// Error leaves
    Empty,
}

impl ContextValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextValue::Device => "device",
            ContextValue::App => "app",
            ContextValue::Process => "process",
            ContextValue::Empty => "empty",
        }
    }
}

/// Whether the host should offer an expander for the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collapsible {
    None,
    Collapsed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// Row icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Icon {
    /// Bundled icon with one file per theme
    Themed { light: PathBuf, dark: PathBuf },
    /// Image supplied by the backend (URI or data URL)
    Uri { uri: String },
}

/// Command the host runs when the row is activated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemCommand {
    pub command: String,
    pub title: String,
    pub arguments: Vec<String>,
}

/// Display facets of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeItem {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    /// Secondary label drawn after the main one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<ItemCommand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_value: Option<ContextValue>,
    pub collapsible: Collapsible,
}

impl TreeItem {
    pub fn new(label: impl Into<String>, collapsible: Collapsible) -> Self {
        Self {
            label: label.into(),
            tooltip: None,
            description: None,
            icon: None,
            command: None,
            context_value: None,
            collapsible,
        }
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn with_command(mut self, command: ItemCommand) -> Self {
        self.command = Some(command);
        self
    }

    pub fn with_context(mut self, context: ContextValue) -> Self {
        self.context_value = Some(context);
        self
    }
}

/// Resolves bundled icon files.
///
/// Layout: `<root>/light/<file>` and `<root>/dark/<file>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resources {
    root: PathBuf,
}

impl Resources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resource(&self, theme: Theme, file: &str) -> PathBuf {
        self.root.join(theme.as_str()).join(file)
    }

    /// Light/dark icon pair for a bundled file name.
    pub fn themed(&self, file: &str) -> Icon {
        Icon::Themed {
            light: self.resource(Theme::Light, file),
            dark: self.resource(Theme::Dark, file),
        }
    }
}

impl Default for Resources {
    fn default() -> Self {
        Self::new("resources")
    }
}
