//! # Pomotick Core Library
//!
//! This library provides the core logic for the pomotick countdown timer.
//! Front ends (the `pomotick` terminal binary, or any GUI) feed it user
//! commands and clock time and render the [`Event`]s it returns.
//!
//! ## Architecture
//!
//! - **Timer Controller**: Idle/Active countdown state machine driven by a
//!   virtual-clock [`TimerQueue`]; the caller advances the clock
//! - **Alarm**: completion alert through a pluggable [`AudioSink`] with a
//!   logged fallback and a fixed cutoff
//! - **Storage**: TOML-based configuration
//! - **Update**: release feed check
//!
//! ## Key Components
//!
//! - [`TimerController`]: Core countdown state machine
//! - [`AlarmNotifier`]: Alarm playback and cutoff
//! - [`Config`]: Application configuration management
//! - [`UpdateChecker`]: Release feed client

pub mod alarm;
pub mod error;
pub mod events;
pub mod storage;
pub mod timer;
pub mod update;

pub use alarm::{AlarmNotifier, AlarmOutcome, AlarmStopReason, AudioSink, ALARM_CUTOFF};
pub use error::{AudioError, ConfigError, CoreError, UpdateError, ValidationError};
pub use events::Event;
pub use storage::Config;
pub use timer::{format_display, PresetCycle, TimerController, TimerId, TimerQueue, TimerState};
pub use update::{UpdateChecker, UpdateStatus, Version};
