//! Media viewer state machine
//!
//! Per open instance: Closed → Loading → Ready | Errored, and back to
//! Closed on explicit close, backdrop click, or Escape. Video assets get
//! a [`Transport`] once ready; images and documents have no transport.
//! Unsupported content types still reach Ready so the host can render a
//! neutral placeholder instead of failing silently.

use crate::transport::{Transport, KEYBOARD_SKIP_SECS};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;

/// Media load failure, contained within the viewer
#[derive(Debug, Clone, Error)]
#[error("Media failed to load: {0}")]
pub struct PlaybackError(String);

impl PlaybackError {
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Asset kind, classified from the declared MIME value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Pdf,
    Unsupported,
}

impl MediaKind {
    pub fn classify(mime: &str) -> Self {
        let mime = mime.trim().to_ascii_lowercase();
        if mime.starts_with("image/") {
            MediaKind::Image
        } else if mime.starts_with("video/") {
            MediaKind::Video
        } else if mime == "application/pdf" {
            MediaKind::Pdf
        } else {
            MediaKind::Unsupported
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
            MediaKind::Pdf => write!(f, "pdf"),
            MediaKind::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Viewer lifecycle phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewerPhase {
    Closed,
    Loading,
    Ready,
    Errored,
}

/// Keyboard input recognized while the viewer is open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    ArrowLeft,
    ArrowRight,
    KeyM,
    KeyF,
    Escape,
}

/// Host hook for entering/leaving the surface's fullscreen mode.
///
/// Both calls are best-effort: a `false` return (the surface denied or
/// silently ignored the request) leaves the tracked state unchanged.
pub trait FullscreenHost {
    fn enter(&mut self) -> bool;
    fn exit(&mut self) -> bool;
}

/// Host with no fullscreen capability; every request is denied
pub struct NoopFullscreen;

impl FullscreenHost for NoopFullscreen {
    fn enter(&mut self) -> bool {
        false
    }
    fn exit(&mut self) -> bool {
        false
    }
}

/// One viewer instance
pub struct Viewer {
    phase: ViewerPhase,
    kind: MediaKind,
    url: Option<String>,
    error: Option<PlaybackError>,
    transport: Option<Transport>,
    fullscreen: bool,
}

impl Viewer {
    pub fn new() -> Self {
        Self {
            phase: ViewerPhase::Closed,
            kind: MediaKind::Unsupported,
            url: None,
            error: None,
            transport: None,
            fullscreen: false,
        }
    }

    pub fn phase(&self) -> &ViewerPhase {
        &self.phase
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Resolved signed URL for the host to load, present while open
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn error(&self) -> Option<&PlaybackError> {
        self.error.as_ref()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Video transport, present once a video asset is ready
    pub fn transport(&self) -> Option<&Transport> {
        self.transport.as_ref()
    }

    pub fn transport_mut(&mut self) -> Option<&mut Transport> {
        self.transport.as_mut()
    }

    /// Open on a resolved asset URL; classification happens here and a
    /// spinner shows until the host reports the load outcome
    pub fn open(&mut self, url: impl Into<String>, mime: &str) {
        self.kind = MediaKind::classify(mime);
        self.url = Some(url.into());
        self.error = None;
        self.transport = None;
        self.fullscreen = false;
        self.phase = ViewerPhase::Loading;
        tracing::debug!(kind = %self.kind, "Viewer opened");
    }

    /// Host reports a successful media load. `duration_secs` only matters
    /// for video; pass zero for images and documents.
    pub fn media_loaded(&mut self, duration_secs: f64, now: Instant) {
        if self.phase != ViewerPhase::Loading {
            return;
        }
        if self.kind == MediaKind::Video {
            self.transport = Some(Transport::new(duration_secs, now));
        }
        self.phase = ViewerPhase::Ready;
    }

    /// Host reports a load failure (broken URL, unsupported codec).
    /// Rendered as an in-viewer error state; never escapes the viewer.
    pub fn media_failed(&mut self, message: impl Into<String>) {
        if self.phase != ViewerPhase::Loading && self.phase != ViewerPhase::Ready {
            return;
        }
        let error = PlaybackError(message.into());
        tracing::warn!(error = %error, "Media load failed");
        self.error = Some(error);
        self.transport = None;
        self.phase = ViewerPhase::Errored;
    }

    /// Close from any state
    pub fn close(&mut self, host: &mut dyn FullscreenHost) {
        if self.fullscreen {
            host.exit();
            self.fullscreen = false;
        }
        self.phase = ViewerPhase::Closed;
        self.url = None;
        self.error = None;
        self.transport = None;
    }

    /// Background click behind the content closes the viewer
    pub fn backdrop_clicked(&mut self, host: &mut dyn FullscreenHost) {
        if self.phase != ViewerPhase::Closed {
            self.close(host);
        }
    }

    /// Best-effort fullscreen toggle; a denied request changes nothing
    pub fn toggle_fullscreen(&mut self, host: &mut dyn FullscreenHost) {
        if self.fullscreen {
            if host.exit() {
                self.fullscreen = false;
            }
        } else if host.enter() {
            self.fullscreen = true;
        }
    }

    /// Keyboard dispatch, active only while the viewer is open.
    ///
    /// Returns whether the key was consumed; a closed viewer consumes
    /// nothing, so bindings never leak to the rest of the page.
    pub fn handle_key(&mut self, key: Key, now: Instant, host: &mut dyn FullscreenHost) -> bool {
        if self.phase == ViewerPhase::Closed {
            return false;
        }

        match key {
            Key::Escape => {
                self.close(host);
                true
            }
            Key::KeyF => {
                self.toggle_fullscreen(host);
                true
            }
            // Transport keys are no-ops without a video transport but are
            // still consumed, so nothing leaks to the page while open
            Key::Space => {
                if let Some(t) = self.transport.as_mut() {
                    t.toggle_play(now);
                }
                true
            }
            Key::ArrowLeft => {
                if let Some(t) = self.transport.as_mut() {
                    t.skip(-KEYBOARD_SKIP_SECS);
                }
                true
            }
            Key::ArrowRight => {
                if let Some(t) = self.transport.as_mut() {
                    t.skip(KEYBOARD_SKIP_SECS);
                }
                true
            }
            Key::KeyM => {
                if let Some(t) = self.transport.as_mut() {
                    t.toggle_mute();
                }
                true
            }
        }
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new()
    }
}
