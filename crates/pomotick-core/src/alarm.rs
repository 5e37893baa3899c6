//! Alarm notifier.
//!
//! Plays the completion alert through an [`AudioSink`] and silences it after
//! a fixed cutoff. Audio is optional: a missing sink or a failing one
//! degrades to a logged beep, and no error ever reaches the caller.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::AudioError;
use crate::timer::{TimerId, TimerQueue};

/// How long the alarm sounds unless dismissed earlier.
pub const ALARM_CUTOFF: Duration = Duration::from_secs(5);

/// Audio backend used by the notifier.
///
/// Implementations must return quickly from `play`; playback continues in
/// the background until `stop` is called.
pub trait AudioSink {
    fn play(&mut self) -> Result<(), AudioError>;
    fn stop(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmOutcome {
    /// The sink accepted the sound; the cutoff is armed.
    Sounding,
    /// No audio; the alert was logged instead.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmStopReason {
    TimedOut,
    Dismissed,
}

pub struct AlarmNotifier {
    sink: Option<Box<dyn AudioSink>>,
    cutoff: Duration,
    /// Pending cutoff; `Some` exactly while the sink is sounding.
    cutoff_timer: Option<TimerId>,
}

impl AlarmNotifier {
    pub fn new(sink: Option<Box<dyn AudioSink>>, cutoff: Duration) -> Self {
        Self {
            sink,
            cutoff,
            cutoff_timer: None,
        }
    }

    /// Notifier with no audio backend. Every alarm takes the fallback path.
    pub fn silent() -> Self {
        Self::new(None, ALARM_CUTOFF)
    }

    pub fn is_sounding(&self) -> bool {
        self.cutoff_timer.is_some()
    }

    /// Sound the alarm. A still-sounding alarm is restarted.
    pub fn play(&mut self, timers: &mut TimerQueue) -> AlarmOutcome {
        self.stop(timers);

        let Some(sink) = self.sink.as_mut() else {
            fallback_beep();
            return AlarmOutcome::Fallback;
        };

        match sink.play() {
            Ok(()) => {
                self.cutoff_timer = Some(timers.schedule_once(self.cutoff));
                tracing::debug!(cutoff_secs = self.cutoff.as_secs(), "alarm sounding");
                AlarmOutcome::Sounding
            }
            Err(e) => {
                tracing::warn!("alarm playback failed: {e}");
                fallback_beep();
                AlarmOutcome::Fallback
            }
        }
    }

    /// Silence the alarm. Safe to call when nothing is playing.
    ///
    /// Returns true if a sounding alarm was stopped.
    pub fn stop(&mut self, timers: &mut TimerQueue) -> bool {
        let Some(id) = self.cutoff_timer.take() else {
            return false;
        };
        timers.cancel(id);
        if let Some(sink) = self.sink.as_mut() {
            sink.stop();
        }
        true
    }

    /// Handle a fired timer. Returns true if `id` was this notifier's cutoff.
    pub fn on_timer(&mut self, id: TimerId) -> bool {
        if self.cutoff_timer != Some(id) {
            return false;
        }
        self.cutoff_timer = None;
        if let Some(sink) = self.sink.as_mut() {
            sink.stop();
        }
        tracing::debug!("alarm cutoff reached");
        true
    }
}

impl std::fmt::Debug for AlarmNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlarmNotifier")
            .field("has_sink", &self.sink.is_some())
            .field("cutoff", &self.cutoff)
            .field("cutoff_timer", &self.cutoff_timer)
            .finish()
    }
}

fn fallback_beep() {
    tracing::info!("Beep! Timer finished!");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Calls {
        plays: u32,
        stops: u32,
    }

    struct FakeSink {
        calls: Rc<RefCell<Calls>>,
        fail: bool,
    }

    impl AudioSink for FakeSink {
        fn play(&mut self) -> Result<(), AudioError> {
            self.calls.borrow_mut().plays += 1;
            if self.fail {
                Err(AudioError::Unavailable("no device".into()))
            } else {
                Ok(())
            }
        }

        fn stop(&mut self) {
            self.calls.borrow_mut().stops += 1;
        }
    }

    fn notifier(fail: bool) -> (AlarmNotifier, Rc<RefCell<Calls>>) {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let sink = FakeSink {
            calls: Rc::clone(&calls),
            fail,
        };
        (AlarmNotifier::new(Some(Box::new(sink)), ALARM_CUTOFF), calls)
    }

    #[test]
    fn play_arms_cutoff() {
        let (mut alarm, calls) = notifier(false);
        let mut timers = TimerQueue::new();
        assert_eq!(alarm.play(&mut timers), AlarmOutcome::Sounding);
        assert!(alarm.is_sounding());
        assert_eq!(timers.next_deadline(), Some(ALARM_CUTOFF));

        let id = timers.pop_due(ALARM_CUTOFF).unwrap();
        assert!(alarm.on_timer(id));
        assert!(!alarm.is_sounding());
        assert_eq!(calls.borrow().stops, 1);
    }

    #[test]
    fn failing_sink_falls_back() {
        let (mut alarm, calls) = notifier(true);
        let mut timers = TimerQueue::new();
        assert_eq!(alarm.play(&mut timers), AlarmOutcome::Fallback);
        assert!(!alarm.is_sounding());
        assert!(timers.is_empty());
        assert_eq!(calls.borrow().plays, 1);
    }

    #[test]
    fn silent_notifier_falls_back() {
        let mut alarm = AlarmNotifier::silent();
        let mut timers = TimerQueue::new();
        assert_eq!(alarm.play(&mut timers), AlarmOutcome::Fallback);
        assert!(!alarm.stop(&mut timers));
    }

    #[test]
    fn stop_twice_is_harmless() {
        let (mut alarm, calls) = notifier(false);
        let mut timers = TimerQueue::new();
        alarm.play(&mut timers);
        assert!(alarm.stop(&mut timers));
        assert!(!alarm.stop(&mut timers));
        assert_eq!(calls.borrow().stops, 1);
        assert!(timers.is_empty());
    }

    #[test]
    fn replaying_restarts_cutoff() {
        let (mut alarm, calls) = notifier(false);
        let mut timers = TimerQueue::new();
        alarm.play(&mut timers);
        timers.settle(Duration::from_secs(3));
        alarm.play(&mut timers);
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.next_deadline(), Some(Duration::from_secs(8)));
        assert_eq!(calls.borrow().plays, 2);
    }

    #[test]
    fn unrelated_timer_is_not_the_cutoff() {
        let (mut alarm, _) = notifier(false);
        let mut timers = TimerQueue::new();
        let other = timers.schedule_once(Duration::from_secs(1));
        alarm.play(&mut timers);
        assert!(!alarm.on_timer(other));
        assert!(alarm.is_sounding());
    }
}
