//! Countdown controller.
//!
//! The controller is a two-state machine driven by a [`TimerQueue`]. It
//! does not use internal threads - the caller is responsible for advancing
//! the clock with [`TimerController::advance_to`].
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Active --pause | reaches 0--> Idle
//! any  --reset--> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = TimerController::new(PresetCycle::default(), AlarmNotifier::silent());
//! timer.start();
//! // In a loop:
//! for event in timer.advance_to(elapsed) { render(event) }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::countdown::{format_display, parse_duration_input};
use super::presets::PresetCycle;
use super::scheduler::{TimerId, TimerQueue};
use crate::alarm::{AlarmNotifier, AlarmStopReason, AudioSink};
use crate::error::{CoreError, ValidationError};
use crate::events::Event;
use crate::storage::Config;

/// Period of the countdown tick.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// How long the preset-cycle acknowledgement stays visible.
pub const PRESET_ACK: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Active,
}

#[derive(Debug)]
pub struct TimerController {
    timers: TimerQueue,
    presets: PresetCycle,
    alarm: AlarmNotifier,
    remaining_secs: u64,
    /// Value of the duration entry, in minutes.
    input_minutes: u32,
    /// Repeating tick; `Some` exactly while Active.
    tick: Option<TimerId>,
    /// Pending preset acknowledgement expiry.
    ack: Option<TimerId>,
}

impl TimerController {
    /// Create an idle controller loaded with the current preset.
    pub fn new(presets: PresetCycle, alarm: AlarmNotifier) -> Self {
        let minutes = presets.current();
        Self {
            timers: TimerQueue::new(),
            presets,
            alarm,
            remaining_secs: minutes_to_secs(minutes),
            input_minutes: minutes,
            tick: None,
            ack: None,
        }
    }

    /// Build from configuration. `sink` is ignored when the alarm is disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails [`Config::validate`], which also
    /// covers unusable presets and an out-of-range alarm cutoff.
    pub fn from_config(
        config: &Config,
        sink: Option<Box<dyn AudioSink>>,
    ) -> Result<Self, CoreError> {
        config.validate()?;
        let presets = PresetCycle::new(config.timer.presets.clone(), config.timer.default_preset)?;
        let sink = if config.alarm.enabled { sink } else { None };
        let alarm = AlarmNotifier::new(sink, Duration::from_secs(config.alarm.cutoff_secs));
        Ok(Self::new(presets, alarm))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        if self.tick.is_some() {
            TimerState::Active
        } else {
            TimerState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.tick.is_some()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn display(&self) -> String {
        format_display(self.remaining_secs)
    }

    pub fn input_minutes(&self) -> u32 {
        self.input_minutes
    }

    pub fn presets(&self) -> &PresetCycle {
        &self.presets
    }

    pub fn preset_minutes(&self) -> u32 {
        self.presets.current()
    }

    pub fn is_alarm_sounding(&self) -> bool {
        self.alarm.is_sounding()
    }

    /// Whether the preset acknowledgement is still showing.
    pub fn is_acknowledging(&self) -> bool {
        self.ack.is_some()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// When the driver next needs to call [`advance_to`](Self::advance_to).
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state(),
            remaining_secs: self.remaining_secs,
            display: self.display(),
            preset_index: self.presets.index(),
            preset_minutes: self.presets.current(),
            input_minutes: self.input_minutes,
            alarm_sounding: self.alarm.is_sounding(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.tick.is_some() {
            return None;
        }
        if self.remaining_secs == 0 {
            self.remaining_secs = minutes_to_secs(self.presets.current());
        }
        self.tick = Some(self.timers.schedule_repeating(TICK_PERIOD));
        tracing::debug!(remaining_secs = self.remaining_secs, "timer started");
        Some(Event::TimerStarted {
            remaining_secs: self.remaining_secs,
            display: self.display(),
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        let tick = self.tick.take()?;
        self.timers.cancel(tick);
        tracing::debug!(remaining_secs = self.remaining_secs, "timer paused");
        Some(Event::TimerPaused {
            remaining_secs: self.remaining_secs,
            display: self.display(),
            at: Utc::now(),
        })
    }

    pub fn toggle(&mut self) -> Option<Event> {
        if self.is_running() {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Back to Idle with the duration entry's value. Silences the alarm.
    pub fn reset(&mut self) -> Event {
        if let Some(tick) = self.tick.take() {
            self.timers.cancel(tick);
        }
        self.remaining_secs = minutes_to_secs(self.input_minutes);
        self.alarm.stop(&mut self.timers);
        tracing::debug!(remaining_secs = self.remaining_secs, "timer reset");
        Event::TimerReset {
            remaining_secs: self.remaining_secs,
            display: self.display(),
            at: Utc::now(),
        }
    }

    /// Select the next preset. Running state is left alone.
    pub fn cycle_preset(&mut self) -> Event {
        let minutes = self.presets.advance();
        self.input_minutes = minutes;
        self.remaining_secs = minutes_to_secs(minutes);

        if let Some(ack) = self.ack.take() {
            self.timers.cancel(ack);
        }
        self.ack = Some(self.timers.schedule_once(PRESET_ACK));

        Event::PresetCycled {
            preset_index: self.presets.index(),
            minutes,
            display: self.display(),
            at: Utc::now(),
        }
    }

    /// Apply a manual duration entry.
    ///
    /// # Errors
    ///
    /// [`ValidationError::TimerActive`] while running, or
    /// [`ValidationError::InvalidDuration`] for unparseable text. Either
    /// way nothing changes.
    pub fn set_duration_input(&mut self, input: &str) -> Result<Event, ValidationError> {
        if self.is_running() {
            return Err(ValidationError::TimerActive);
        }
        let minutes = parse_duration_input(input)?;
        self.input_minutes = minutes;
        self.remaining_secs = minutes_to_secs(minutes);
        Ok(Event::DurationChanged {
            minutes,
            display: self.display(),
            at: Utc::now(),
        })
    }

    /// User dismissal of the alarm. `None` if nothing was sounding.
    pub fn stop_alarm(&mut self) -> Option<Event> {
        self.alarm.stop(&mut self.timers).then(|| Event::AlarmStopped {
            reason: AlarmStopReason::Dismissed,
            at: Utc::now(),
        })
    }

    // ── Clock ────────────────────────────────────────────────────────

    /// Move the clock to `now`, dispatching every due timer in order.
    pub fn advance_to(&mut self, now: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        while let Some(id) = self.timers.pop_due(now) {
            self.dispatch(id, &mut events);
        }
        self.timers.settle(now);
        events
    }

    pub fn advance_by(&mut self, delta: Duration) -> Vec<Event> {
        let now = self.timers.now() + delta;
        self.advance_to(now)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn dispatch(&mut self, id: TimerId, events: &mut Vec<Event>) {
        if self.tick == Some(id) {
            self.on_tick(events);
        } else if self.ack == Some(id) {
            self.ack = None;
            events.push(Event::PresetAckCleared { at: Utc::now() });
        } else if self.alarm.on_timer(id) {
            events.push(Event::AlarmStopped {
                reason: AlarmStopReason::TimedOut,
                at: Utc::now(),
            });
        } else {
            tracing::trace!(?id, "ignoring stale timer");
        }
    }

    fn on_tick(&mut self, events: &mut Vec<Event>) {
        if self.remaining_secs > 0 {
            self.remaining_secs -= 1;
            events.push(Event::Tick {
                remaining_secs: self.remaining_secs,
                display: self.display(),
                at: Utc::now(),
            });
        }
        if self.remaining_secs > 0 {
            return;
        }

        if let Some(tick) = self.tick.take() {
            self.timers.cancel(tick);
        }
        tracing::debug!("countdown complete");
        events.push(Event::TimerCompleted {
            preset_minutes: self.presets.current(),
            at: Utc::now(),
        });
        let outcome = self.alarm.play(&mut self.timers);
        events.push(Event::AlarmFired {
            outcome,
            at: Utc::now(),
        });
    }
}

fn minutes_to_secs(minutes: u32) -> u64 {
    u64::from(minutes) * 60
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::AlarmOutcome;

    const SEC: Duration = Duration::from_secs(1);

    fn controller() -> TimerController {
        TimerController::new(PresetCycle::default(), AlarmNotifier::silent())
    }

    /// Idle controller with `secs` on the clock.
    fn with_remaining(secs: u64) -> TimerController {
        let mut timer = controller();
        timer.remaining_secs = secs;
        timer
    }

    fn count_fired(events: &[Event]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, Event::AlarmFired { .. }))
            .count()
    }

    #[test]
    fn starts_idle_on_default_preset() {
        let timer = controller();
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.remaining_secs(), 45 * 60);
        assert_eq!(timer.display(), "45:00");
        assert_eq!(timer.input_minutes(), 45);
    }

    #[test]
    fn start_is_noop_when_active() {
        let mut timer = controller();
        assert!(timer.start().is_some());
        assert!(timer.start().is_none());
        assert_eq!(timer.state(), TimerState::Active);
        assert_eq!(timer.next_deadline(), Some(SEC));
    }

    #[test]
    fn start_then_pause_keeps_remaining() {
        let mut timer = controller();
        timer.start();
        assert!(timer.pause().is_some());
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.remaining_secs(), 45 * 60);
        assert!(timer.pause().is_none());
    }

    #[test]
    fn three_ticks_finish_three_seconds() {
        let mut timer = with_remaining(3);
        timer.start();

        let mut events = Vec::new();
        for _ in 0..3 {
            events.extend(timer.advance_by(SEC));
        }

        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.remaining_secs(), 0);
        assert_eq!(count_fired(&events), 1);
        let displays: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, Event::Tick { .. }))
            .filter_map(Event::display)
            .collect();
        assert_eq!(displays, ["00:02", "00:01", "00:00"]);

        // Nothing is left ticking.
        assert!(timer.advance_by(SEC * 10).is_empty());
        assert_eq!(timer.remaining_secs(), 0);
    }

    #[test]
    fn start_at_zero_reloads_preset() {
        let mut timer = with_remaining(1);
        timer.start();
        timer.advance_by(SEC);
        assert_eq!(timer.remaining_secs(), 0);

        timer.start();
        assert_eq!(timer.remaining_secs(), 45 * 60);
    }

    #[test]
    fn pause_then_start_resumes() {
        let mut timer = with_remaining(100);
        timer.start();
        timer.advance_by(SEC * 10);
        timer.pause();
        timer.advance_by(SEC * 30);
        assert_eq!(timer.remaining_secs(), 90);

        timer.start();
        assert_eq!(timer.remaining_secs(), 90);
        timer.advance_by(SEC);
        assert_eq!(timer.remaining_secs(), 89);
    }

    #[test]
    fn partial_second_before_pause_is_not_counted() {
        let mut timer = with_remaining(10);
        timer.start();
        timer.advance_by(Duration::from_millis(900));
        timer.pause();
        timer.start();
        timer.advance_by(Duration::from_millis(900));
        assert_eq!(timer.remaining_secs(), 10);
    }

    #[test]
    fn reset_uses_duration_entry() {
        let mut timer = controller();
        timer.set_duration_input("20").unwrap();
        timer.start();
        timer.advance_by(SEC * 5);
        timer.reset();
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.remaining_secs(), 20 * 60);
        assert!(timer.advance_by(SEC * 5).is_empty());
    }

    #[test]
    fn toggle_flips_state() {
        let mut timer = controller();
        assert!(matches!(timer.toggle(), Some(Event::TimerStarted { .. })));
        assert!(matches!(timer.toggle(), Some(Event::TimerPaused { .. })));
        assert_eq!(timer.state(), TimerState::Idle);
    }

    #[test]
    fn cycle_preset_keeps_running_state() {
        let mut timer = controller();
        timer.start();
        let event = timer.cycle_preset();
        assert!(matches!(event, Event::PresetCycled { minutes: 60, preset_index: 2, .. }));
        assert!(timer.is_running());
        assert_eq!(timer.remaining_secs(), 60 * 60);
        assert_eq!(timer.input_minutes(), 60);
    }

    #[test]
    fn preset_ack_clears_after_300ms() {
        let mut timer = controller();
        timer.cycle_preset();
        assert!(timer.is_acknowledging());
        assert!(timer.advance_by(Duration::from_millis(299)).is_empty());
        let events = timer.advance_by(Duration::from_millis(1));
        assert!(matches!(events.as_slice(), [Event::PresetAckCleared { .. }]));
        assert!(!timer.is_acknowledging());
    }

    #[test]
    fn recycling_replaces_pending_ack() {
        let mut timer = controller();
        timer.cycle_preset();
        timer.advance_by(Duration::from_millis(200));
        timer.cycle_preset();
        assert!(timer.advance_by(Duration::from_millis(200)).is_empty());
        assert_eq!(timer.advance_by(Duration::from_millis(100)).len(), 1);
    }

    #[test]
    fn duration_entry_rejected_while_active() {
        let mut timer = controller();
        timer.start();
        assert_eq!(
            timer.set_duration_input("10").unwrap_err(),
            ValidationError::TimerActive
        );
        assert_eq!(timer.input_minutes(), 45);
        assert_eq!(timer.remaining_secs(), 45 * 60);
    }

    #[test]
    fn invalid_duration_entry_keeps_state() {
        let mut timer = controller();
        assert!(timer.set_duration_input("soon").is_err());
        assert_eq!(timer.remaining_secs(), 45 * 60);
        assert_eq!(timer.input_minutes(), 45);
    }

    #[test]
    fn silent_alarm_reports_fallback() {
        let mut timer = with_remaining(1);
        timer.start();
        let events = timer.advance_by(SEC);
        assert!(events.iter().any(|e| matches!(
            e,
            Event::AlarmFired {
                outcome: AlarmOutcome::Fallback,
                ..
            }
        )));
        assert!(!timer.is_alarm_sounding());
        assert!(timer.stop_alarm().is_none());
    }

    #[test]
    fn late_driver_catches_up_without_overshooting() {
        let mut timer = with_remaining(5);
        timer.start();
        let events = timer.advance_by(SEC * 60);
        let ticks = events
            .iter()
            .filter(|e| matches!(e, Event::Tick { .. }))
            .count();
        assert_eq!(ticks, 5);
        assert_eq!(count_fired(&events), 1);
        assert_eq!(timer.state(), TimerState::Idle);
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut timer = controller();
        timer.start();
        match timer.snapshot() {
            Event::StateSnapshot {
                state,
                remaining_secs,
                preset_minutes,
                alarm_sounding,
                ..
            } => {
                assert_eq!(state, TimerState::Active);
                assert_eq!(remaining_secs, 45 * 60);
                assert_eq!(preset_minutes, 45);
                assert!(!alarm_sounding);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }
}
