//! # CourseKit Player
//!
//! Media playback engine for consuming uploaded course assets. The engine
//! is a pure state machine: the host surface (whatever actually renders
//! pixels and decodes media) reports load outcomes and pointer/keyboard
//! input, and reads back phase, transport state, and control visibility.
//!
//! Asset URLs are time-limited signed links; the caller resolves the
//! object key to a fresh link on every open (see `coursekit-client`).

pub mod transport;
pub mod viewer;

pub use transport::{Transport, CONTROLS_HIDE_AFTER, KEYBOARD_SKIP_SECS, POINTER_SKIP_SECS};
pub use viewer::{
    FullscreenHost, Key, MediaKind, NoopFullscreen, PlaybackError, Viewer, ViewerPhase,
};
