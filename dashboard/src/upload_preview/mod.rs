pub mod object_url;
pub mod provider;

use std::{
    future::Future,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use crate::{
    DashboardError,
    page::{MediaSink, Navigator, TextSink},
    timer::{self, TimerHandle},
};

pub use object_url::ObjectUrls;
pub use provider::SimulatedCount;

pub const PROCESSING_MESSAGE: &str = "Processing video...";
pub const SIMULATION_DELAY: Duration = Duration::from_millis(3000);
pub const HEATMAP_PAGE: &str = "heatmap.html";

/// A local file the user picked for preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    path: PathBuf,
    name: String,
}

impl SelectedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.file_name().map_or_else(
            || path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        Self { path, name }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Produces the people count for an uploaded file.
pub trait ResultProvider: Send + Sync + 'static {
    fn people_count(
        &self,
        file: &SelectedFile,
    ) -> impl Future<Output = Result<u32, DashboardError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSettings {
    /// How long after selection the count is requested from the provider.
    pub simulation_delay: Duration,
    pub heatmap_page: String,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            simulation_delay: SIMULATION_DELAY,
            heatmap_page: HEATMAP_PAGE.to_string(),
        }
    }
}

#[must_use]
pub fn count_message(count: u32) -> String {
    format!("People Count: {count}")
}

struct Inner<P, M, T, N> {
    provider: P,
    preview: M,
    status: T,
    navigator: N,
    settings: PreviewSettings,
}

impl<P, M, T, N> Inner<P, M, T, N>
where
    P: ResultProvider,
    M: MediaSink,
    T: TextSink,
    N: Navigator,
{
    async fn deliver_count(&self, file: &SelectedFile) {
        match self.provider.people_count(file).await {
            Ok(count) => self.status.set_text(&count_message(count)),
            Err(e) => {
                tracing::error!(file = %file.name(), error = %e, "failed to get people count");
            }
        }
    }
}

/// Previews a locally selected video and reports a people count for it.
///
/// Every selection schedules its own count delivery. Selecting another file
/// does not cancel a delivery that is still pending, so an older result can
/// land after the newer "processing" message.
pub struct UploadPreview<P, M, T, N> {
    inner: Arc<Inner<P, M, T, N>>,
    object_urls: ObjectUrls,
    current_url: Option<String>,
    pending: Vec<TimerHandle>,
}

impl<P, M, T, N> UploadPreview<P, M, T, N>
where
    P: ResultProvider,
    M: MediaSink,
    T: TextSink,
    N: Navigator,
{
    pub fn new(
        provider: P,
        preview: M,
        status: T,
        navigator: N,
        settings: PreviewSettings,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                provider,
                preview,
                status,
                navigator,
                settings,
            }),
            object_urls: ObjectUrls::new(),
            current_url: None,
            pending: Vec::new(),
        }
    }

    pub fn on_file_selected(&mut self, file: Option<SelectedFile>) {
        let Some(file) = file else {
            return;
        };

        tracing::info!(file = %file.path().display(), "video selected");

        let url = self.object_urls.create(&file);
        self.inner.preview.set_source(&url);
        if let Some(previous) = self.current_url.replace(url) {
            self.object_urls.revoke(&previous);
        }

        if let Err(e) = self.inner.preview.play() {
            tracing::warn!(file = %file.name(), error = %e, "preview playback failed");
        }

        self.inner.status.set_text(PROCESSING_MESSAGE);

        self.pending.retain(|timer| !timer.is_finished());
        let inner = Arc::clone(&self.inner);
        self.pending.push(timer::after(
            self.inner.settings.simulation_delay,
            async move { inner.deliver_count(&file).await },
        ));
    }

    pub fn on_generate_heatmap(&self) {
        // TODO: ask the backend to render the heatmap before navigating once
        // it exposes an endpoint for it.
        self.inner.navigator.navigate(&self.inner.settings.heatmap_page);
    }
}

impl<P, M, T, N> UploadPreview<P, M, T, N> {
    /// Count deliveries scheduled and not yet completed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending
            .iter()
            .filter(|timer| !timer.is_finished())
            .count()
    }

    /// Wait for every scheduled count delivery to complete.
    pub async fn settle(&mut self) {
        for timer in self.pending.drain(..) {
            timer.join().await;
        }
    }

    #[must_use]
    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    #[must_use]
    pub const fn object_urls(&self) -> &ObjectUrls {
        &self.object_urls
    }

    /// Cancel pending deliveries and release the current preview URL.
    pub fn dispose(&mut self) {
        for timer in self.pending.drain(..) {
            timer.stop();
        }
        if let Some(url) = self.current_url.take() {
            self.object_urls.revoke(&url);
        }
    }
}

impl<P, M, T, N> Drop for UploadPreview<P, M, T, N> {
    fn drop(&mut self) {
        self.dispose();
    }
}
