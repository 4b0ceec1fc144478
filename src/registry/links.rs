//! Registered links, scanned linearly by (instance, name)
//!
//! Link counts stay in the tens, so an ordered list with first-match lookup
//! is enough.

use tokio::sync::RwLock;

use crate::error::{ManagementError, Result};
use crate::link::{LinkEntry, LinkInfo};

/// Registry of data links
#[derive(Default)]
pub struct LinkRegistry {
    links: RwLock<Vec<LinkEntry>>,
}

impl LinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a link, returning its initial snapshot
    pub async fn register(&self, entry: LinkEntry) -> LinkInfo {
        let info = entry.info().clone();
        self.links.write().await.push(entry);
        info
    }

    /// Remove the first link matching `instance`/`name`
    pub async fn unregister(&self, instance: &str, name: &str) -> Option<LinkInfo> {
        let mut links = self.links.write().await;
        let pos = links.iter().position(|l| l.matches(instance, name))?;
        Some(links.remove(pos).info().clone())
    }

    pub async fn enable(&self, instance: &str, name: &str) -> Result<()> {
        let links = self.links.read().await;
        let entry = find(&links, instance, name)?;
        entry.enable();
        Ok(())
    }

    pub async fn disable(&self, instance: &str, name: &str) -> Result<()> {
        let links = self.links.read().await;
        let entry = find(&links, instance, name)?;
        entry.disable();
        Ok(())
    }

    /// Last snapshot of a link
    pub async fn info(&self, instance: &str, name: &str) -> Option<LinkInfo> {
        self.links
            .read()
            .await
            .iter()
            .find(|l| l.matches(instance, name))
            .map(|l| l.info().clone())
    }

    /// Last snapshots of every link, in registration order
    pub async fn infos(&self) -> Vec<LinkInfo> {
        self.links
            .read()
            .await
            .iter()
            .map(|l| l.info().clone())
            .collect()
    }

    /// Re-read every link and collect the ones whose state moved
    pub async fn poll_changes(&self) -> Vec<LinkInfo> {
        self.links
            .write()
            .await
            .iter_mut()
            .filter_map(|l| l.poll_change())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.links.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.links.read().await.is_empty()
    }
}

fn find<'a>(links: &'a [LinkEntry], instance: &str, name: &str) -> Result<&'a LinkEntry> {
    links
        .iter()
        .find(|l| l.matches(instance, name))
        .ok_or_else(|| {
            ManagementError::not_found(format!(
                "there is no link named '{}' in instance {}",
                name, instance
            ))
        })
}
