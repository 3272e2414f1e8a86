//! Clock formatting for the media viewer
//!
//! Provides consistent elapsed/remaining time display across viewer surfaces.

/// Format a playback position for display.
///
/// The format is chosen by the *duration* of the media, not the position,
/// so the display width never jumps mid-playback:
/// - duration >= 1 hour → `H:MM:SS`
/// - otherwise → `M:SS`
///
/// # Examples
///
/// ```
/// use coursekit_common::human_time::format_clock;
///
/// assert_eq!(format_clock(75.0, 300.0), "1:15");
/// assert_eq!(format_clock(75.0, 7200.0), "0:01:15");
/// assert_eq!(format_clock(3661.0, 7200.0), "1:01:01");
/// ```
pub fn format_clock(position_secs: f64, duration_secs: f64) -> String {
    // Negative or NaN positions render as zero rather than garbage
    let secs = if position_secs.is_finite() && position_secs > 0.0 {
        position_secs as i64
    } else {
        0
    };

    let long_format = duration_secs.is_finite() && duration_secs >= 3600.0;

    if long_format {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        let s = secs % 60;
        format!("{}:{:02}:{:02}", hours, mins, s)
    } else {
        let mins = secs / 60;
        let s = secs % 60;
        format!("{}:{:02}", mins, s)
    }
}
