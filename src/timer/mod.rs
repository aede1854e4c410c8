pub mod controller;
pub mod state;

pub use controller::{PomodoroSnapshot, PomodoroTimer, TIMER_ID};
pub use state::{Phase, PomodoroConfig, PomodoroState, TickOutcome};
