mod controller;
mod countdown;
mod presets;
mod scheduler;

pub use controller::{TimerController, TimerState, PRESET_ACK, TICK_PERIOD};
pub use countdown::{format_display, parse_duration_input, MAX_INPUT_MINUTES, MIN_INPUT_MINUTES};
pub use presets::{PresetCycle, DEFAULT_PRESETS, DEFAULT_PRESET_INDEX};
pub use scheduler::{TimerId, TimerQueue};
