use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use uuid::Uuid;

use super::SelectedFile;

const SCHEME_PREFIX: &str = "blob:crowd-monitor/";

/// Registry of page-local playback URLs for selected files.
///
/// A URL stays resolvable until it is revoked. Clones share the registry.
#[derive(Debug, Clone, Default)]
pub struct ObjectUrls {
    live: Arc<Mutex<HashMap<String, SelectedFile>>>,
}

impl ObjectUrls {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, file: &SelectedFile) -> String {
        let url = format!("{SCHEME_PREFIX}{}", Uuid::now_v7());
        self.entries().insert(url.clone(), file.clone());
        url
    }

    /// Returns `false` if the URL was unknown or already revoked.
    pub fn revoke(&self, url: &str) -> bool {
        self.entries().remove(url).is_some()
    }

    #[must_use]
    pub fn resolve(&self, url: &str) -> Option<SelectedFile> {
        self.entries().get(url).cloned()
    }

    /// Number of URLs created and not yet revoked.
    #[must_use]
    pub fn live(&self) -> usize {
        self.entries().len()
    }

    fn entries(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<String, SelectedFile>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
