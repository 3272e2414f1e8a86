//! Video transport state
//!
//! Play/pause, seek, skip, volume, mute, and on-screen control
//! visibility. All time-dependent behavior takes an explicit `Instant`
//! so the host drives the clock and tests stay deterministic.

use coursekit_common::human_time::format_clock;
use std::time::{Duration, Instant};

/// Skip offset for on-screen skip buttons (seconds)
pub const POINTER_SKIP_SECS: f64 = 10.0;

/// Skip offset for ArrowLeft/ArrowRight (seconds)
pub const KEYBOARD_SKIP_SECS: f64 = 5.0;

/// Pointer inactivity after which on-screen controls hide while playing
pub const CONTROLS_HIDE_AFTER: Duration = Duration::from_secs(3);

/// Transport state for a video asset
#[derive(Debug, Clone)]
pub struct Transport {
    playing: bool,
    position: f64,
    duration: f64,
    volume: f64,
    muted: bool,
    premute_volume: f64,
    last_pointer_activity: Instant,
}

impl Transport {
    /// New transport, paused at the start of the media
    pub fn new(duration_secs: f64, now: Instant) -> Self {
        let duration = if duration_secs.is_finite() && duration_secs > 0.0 {
            duration_secs
        } else {
            0.0
        };
        Self {
            playing: false,
            position: 0.0,
            duration,
            volume: 1.0,
            muted: false,
            premute_volume: 1.0,
            last_pointer_activity: now,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Single toggle between Paused and Playing
    pub fn toggle_play(&mut self, now: Instant) {
        self.playing = !self.playing;
        if !self.playing {
            // Pause reveals the controls immediately
            self.last_pointer_activity = now;
        }
        tracing::debug!(playing = self.playing, "Playback toggled");
    }

    /// Host position update as playback progresses
    pub fn set_position(&mut self, position_secs: f64) {
        self.position = self.clamp_position(position_secs);
    }

    /// Scrub to a position immediately (no debounce), clamped to
    /// `[0, duration]`
    pub fn seek(&mut self, position_secs: f64) {
        self.position = self.clamp_position(position_secs);
    }

    /// Move playback by a signed offset, clamped to `[0, duration]`
    pub fn skip(&mut self, offset_secs: f64) {
        self.seek(self.position + offset_secs);
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            self.volume
        };
        if self.muted && self.volume > 0.0 {
            self.muted = false;
        }
    }

    /// Mute drops the volume to zero; unmute restores the exact pre-mute
    /// volume, not a default
    pub fn toggle_mute(&mut self) {
        if self.muted {
            self.muted = false;
            self.volume = self.premute_volume;
        } else {
            self.muted = true;
            self.premute_volume = self.volume;
            self.volume = 0.0;
        }
    }

    /// Pointer moved over the viewer; controls reappear immediately
    pub fn pointer_moved(&mut self, now: Instant) {
        self.last_pointer_activity = now;
    }

    /// Whether on-screen controls are visible. Controls are always
    /// visible while paused, and hide after three seconds of pointer
    /// inactivity while playing.
    pub fn controls_visible(&self, now: Instant) -> bool {
        if !self.playing {
            return true;
        }
        now.duration_since(self.last_pointer_activity) < CONTROLS_HIDE_AFTER
    }

    /// Elapsed time, formatted for display
    pub fn elapsed_display(&self) -> String {
        format_clock(self.position, self.duration)
    }

    /// Remaining time, formatted for display
    pub fn remaining_display(&self) -> String {
        format_clock(self.duration - self.position, self.duration)
    }

    fn clamp_position(&self, position_secs: f64) -> f64 {
        if !position_secs.is_finite() {
            return self.position;
        }
        position_secs.clamp(0.0, self.duration)
    }
}
