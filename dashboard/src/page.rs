//! Display sinks the controllers write into.
//!
//! The controllers are handed these at construction instead of looking
//! elements up by id, so any sink can be swapped for a test double or a
//! different front end. The in-process implementations below keep their state
//! behind an `Arc`, so a clone observes every write made through another
//! clone.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::DashboardError;

/// A text element, e.g. the people-count label.
pub trait TextSink: Send + Sync + 'static {
    fn set_text(&self, text: &str);
}

/// A media element the controllers can point at a source and start.
pub trait MediaSink: Send + Sync + 'static {
    fn set_source(&self, url: &str);

    /// Start playback of the bound source.
    ///
    /// # Errors
    /// If nothing is bound or the element refuses to play.
    fn play(&self) -> Result<(), DashboardError>;
}

/// The browsing context's location.
pub trait Navigator: Send + Sync + 'static {
    fn navigate(&self, path: &str);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // a panic while holding the lock leaves plain data behind, still usable
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone)]
pub struct TextDisplay {
    name: Arc<str>,
    text: Arc<Mutex<String>>,
}

impl TextDisplay {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self::with_text(name, "")
    }

    #[must_use]
    pub fn with_text(name: &str, text: &str) -> Self {
        Self {
            name: Arc::from(name),
            text: Arc::new(Mutex::new(text.to_string())),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn text(&self) -> String {
        lock(&self.text).clone()
    }
}

impl TextSink for TextDisplay {
    fn set_text(&self, text: &str) {
        *lock(&self.text) = text.to_string();
        tracing::info!(element = %self.name, text, "display updated");
    }
}

#[derive(Debug, Default)]
struct MediaState {
    source: Option<String>,
    playing: bool,
    assignments: usize,
}

#[derive(Debug, Clone)]
pub struct MediaElement {
    name: Arc<str>,
    rejects_playback: bool,
    state: Arc<Mutex<MediaState>>,
}

impl MediaElement {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            rejects_playback: false,
            state: Arc::default(),
        }
    }

    /// An element whose `play` always fails, as a browser does for a file it
    /// cannot decode.
    #[must_use]
    pub fn rejecting_playback(name: &str) -> Self {
        Self {
            rejects_playback: true,
            ..Self::new(name)
        }
    }

    #[must_use]
    pub fn source(&self) -> Option<String> {
        lock(&self.state).source.clone()
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        lock(&self.state).playing
    }

    /// How many times a source has been assigned to this element.
    #[must_use]
    pub fn assignments(&self) -> usize {
        lock(&self.state).assignments
    }
}

impl MediaSink for MediaElement {
    fn set_source(&self, url: &str) {
        let mut state = lock(&self.state);
        state.source = Some(url.to_string());
        state.playing = false;
        state.assignments += 1;
        tracing::info!(element = %self.name, source = url, "media source bound");
    }

    fn play(&self) -> Result<(), DashboardError> {
        let mut state = lock(&self.state);
        if state.source.is_none() {
            return Err(DashboardError::Playback(format!(
                "no source bound to {}",
                self.name
            )));
        }
        if self.rejects_playback {
            return Err(DashboardError::Playback(format!(
                "{} cannot play {}",
                self.name,
                state.source.as_deref().unwrap_or_default()
            )));
        }
        state.playing = true;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Location {
    href: Arc<Mutex<Option<String>>>,
}

impl Location {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn href(&self) -> Option<String> {
        lock(&self.href).clone()
    }
}

impl Navigator for Location {
    fn navigate(&self, path: &str) {
        *lock(&self.href) = Some(path.to_string());
        tracing::info!(target_page = path, "navigating");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_display_clones_share_text() {
        let display = TextDisplay::with_text("peopleCount", "0");
        let writer = display.clone();

        writer.set_text("17");

        assert_eq!(display.text(), "17");
        assert_eq!(display.name(), "peopleCount");
    }

    #[test]
    fn test_media_element_play_requires_source() {
        let media = MediaElement::new("videoPlayer");

        assert!(matches!(media.play(), Err(DashboardError::Playback(_))));
        assert!(!media.is_playing());

        media.set_source("blob:crowd-monitor/1");
        media.play().unwrap();

        assert!(media.is_playing());
        assert_eq!(media.assignments(), 1);
    }

    #[test]
    fn test_rebinding_source_stops_playback() {
        let media = MediaElement::new("videoPlayer");
        media.set_source("blob:crowd-monitor/1");
        media.play().unwrap();

        media.set_source("blob:crowd-monitor/2");

        assert!(!media.is_playing());
        assert_eq!(media.source().as_deref(), Some("blob:crowd-monitor/2"));
        assert_eq!(media.assignments(), 2);
    }

    #[test]
    fn test_rejecting_element_never_plays() {
        let media = MediaElement::rejecting_playback("videoPlayer");
        media.set_source("blob:crowd-monitor/1");

        assert!(media.play().is_err());
        assert!(!media.is_playing());
    }

    #[test]
    fn test_location_records_last_navigation() {
        let location = Location::new();
        assert_eq!(location.href(), None);

        location.navigate("heatmap.html");

        assert_eq!(location.href().as_deref(), Some("heatmap.html"));
    }
}
