use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alarm::{AlarmOutcome, AlarmStopReason};
use crate::timer::TimerState;

/// Every state change in the system produces an Event.
/// The front end renders them; nothing in the core reads them back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        remaining_secs: u64,
        display: String,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        display: String,
        at: DateTime<Utc>,
    },
    TimerReset {
        remaining_secs: u64,
        display: String,
        at: DateTime<Utc>,
    },
    /// One second elapsed while running.
    Tick {
        remaining_secs: u64,
        display: String,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero; the timer is idle again.
    TimerCompleted {
        preset_minutes: u32,
        at: DateTime<Utc>,
    },
    /// Transient acknowledgement after cycling presets.
    PresetCycled {
        preset_index: usize,
        minutes: u32,
        display: String,
        at: DateTime<Utc>,
    },
    /// The preset acknowledgement should no longer be shown.
    PresetAckCleared {
        at: DateTime<Utc>,
    },
    /// Manual duration entry accepted.
    DurationChanged {
        minutes: u32,
        display: String,
        at: DateTime<Utc>,
    },
    AlarmFired {
        outcome: AlarmOutcome,
        at: DateTime<Utc>,
    },
    AlarmStopped {
        reason: AlarmStopReason,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        remaining_secs: u64,
        display: String,
        preset_index: usize,
        preset_minutes: u32,
        input_minutes: u32,
        alarm_sounding: bool,
        at: DateTime<Utc>,
    },
    /// Release feed reports a newer version.
    UpdateAvailable {
        current: String,
        latest: String,
        url: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The `MM:SS` value this event asks the front end to show, if any.
    pub fn display(&self) -> Option<&str> {
        match self {
            Event::TimerStarted { display, .. }
            | Event::TimerPaused { display, .. }
            | Event::TimerReset { display, .. }
            | Event::Tick { display, .. }
            | Event::PresetCycled { display, .. }
            | Event::DurationChanged { display, .. }
            | Event::StateSnapshot { display, .. } => Some(display),
            _ => None,
        }
    }
}
