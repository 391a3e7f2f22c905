//! Root-level tree coordinator
//!
//! [`DevicesProvider`] answers the host's `get_children` queries: the root
//! level comes from the driver's device list, every other level is delegated
//! to the node being expanded. Firing [`DevicesProvider::refresh`] tells
//! subscribers to re-query from the root.

use std::sync::Arc;

use tokio::sync::broadcast;

use tscope_core::prelude::*;
use tscope_core::ProviderMode;
use tscope_driver::Driver;

use crate::facets::{Resources, TreeItem};
use crate::item::{DeviceItem, TargetItem};

/// Refresh signals carry no payload; a lagging subscriber only needs to know
/// that at least one refresh happened.
const REFRESH_CAPACITY: usize = 1;

pub struct DevicesProvider<D> {
    driver: Arc<D>,
    mode: ProviderMode,
    resources: Resources,
    changed_tx: broadcast::Sender<()>,
}

impl<D> std::fmt::Debug for DevicesProvider<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevicesProvider")
            .field("mode", &self.mode)
            .field("resources", &self.resources)
            .field("subscribers", &self.changed_tx.receiver_count())
            .finish()
    }
}

impl<D: Driver> DevicesProvider<D> {
    /// The mode is fixed for the provider's lifetime.
    pub fn new(driver: Arc<D>, mode: ProviderMode, resources: Resources) -> Self {
        let (changed_tx, _) = broadcast::channel(REFRESH_CAPACITY);
        Self {
            driver,
            mode,
            resources,
            changed_tx,
        }
    }

    pub fn mode(&self) -> ProviderMode {
        self.mode
    }

    pub fn driver(&self) -> &Arc<D> {
        &self.driver
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    /// Children of `item`, or the device list when `item` is `None`.
    ///
    /// Node expansion results pass through unchanged. An unattached driver
    /// yields an empty root rather than an error.
    pub async fn get_children(&self, item: Option<&TargetItem>) -> Result<Vec<TargetItem>> {
        match item {
            Some(item) => item.children(self.driver.as_ref()).await,
            None => self.roots().await,
        }
    }

    async fn roots(&self) -> Result<Vec<TargetItem>> {
        if !self.driver.connected() {
            debug!("Driver not attached, root is empty");
            return Ok(Vec::new());
        }

        let devices = self.driver.devices().await?;
        debug!("Driver reported {} devices", devices.len());

        Ok(devices
            .into_iter()
            .map(|device| TargetItem::Device(DeviceItem::new(device, self.mode)))
            .collect())
    }

    /// Display facets for `item`.
    pub fn tree_item(&self, item: &TargetItem) -> TreeItem {
        item.tree_item(&self.resources)
    }

    /// Ask subscribers to re-query the whole tree.
    pub fn refresh(&self) {
        // No subscribers is fine
        let _ = self.changed_tx.send(());
    }

    /// Subscribe to whole-tree refresh notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.changed_tx.subscribe()
    }
}
