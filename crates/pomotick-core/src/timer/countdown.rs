//! Countdown display formatting and duration-entry parsing.

use crate::error::ValidationError;

pub const MIN_INPUT_MINUTES: u32 = 1;
pub const MAX_INPUT_MINUTES: u32 = 999;

/// Format seconds as `MM:SS`.
///
/// Both fields are zero-padded to two digits. Minutes are not capped, so
/// 100 minutes renders as `100:00`.
pub fn format_display(remaining_secs: u64) -> String {
    let min = remaining_secs / 60;
    let sec = remaining_secs % 60;
    format!("{min:02}:{sec:02}")
}

/// Parse a free-form duration entry as whole minutes.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDuration`] for anything that is not an
/// integer in `MIN_INPUT_MINUTES..=MAX_INPUT_MINUTES`.
pub fn parse_duration_input(input: &str) -> Result<u32, ValidationError> {
    let invalid = || ValidationError::InvalidDuration {
        input: input.to_string(),
        min: MIN_INPUT_MINUTES,
        max: MAX_INPUT_MINUTES,
    };
    let minutes: u32 = input.trim().parse().map_err(|_| invalid())?;
    if !(MIN_INPUT_MINUTES..=MAX_INPUT_MINUTES).contains(&minutes) {
        return Err(invalid());
    }
    Ok(minutes)
}
