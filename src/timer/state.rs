use serde::{Deserialize, Serialize};

use crate::settings::SettingsStore;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Work,
    Break,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Work => "Work",
            Phase::Break => "Break",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Phase::Work => Phase::Break,
            Phase::Break => Phase::Work,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroConfig {
    pub work_minutes: u32,
    pub break_minutes: u32,
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            break_minutes: 5,
        }
    }
}

impl PomodoroConfig {
    /// Reads the synced durations; zero or absurd values fall back to one
    /// minute so a phase can never be empty.
    pub fn from_settings(settings: &SettingsStore) -> Self {
        let (work, brk) = settings.pomodoro_minutes();
        let clamp = |minutes: u64| u32::try_from(minutes).unwrap_or(u32::MAX).max(1);
        Self {
            work_minutes: clamp(work),
            break_minutes: clamp(brk),
        }
    }

    pub fn seconds(&self, phase: Phase) -> u32 {
        let minutes = match phase {
            Phase::Work => self.work_minutes,
            Phase::Break => self.break_minutes,
        };
        minutes.saturating_mul(60)
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// First tick of a timer: the full duration is shown, nothing counted.
    Rendered,
    Counted,
    /// The countdown hit zero and the timer switched to this phase.
    PhaseChanged(Phase),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroState {
    pub phase: Phase,
    pub remaining_seconds: u32,
    pub config: PomodoroConfig,
    #[serde(skip)]
    rendered: bool,
}

impl PomodoroState {
    pub fn new(config: PomodoroConfig) -> Self {
        Self {
            phase: Phase::Work,
            remaining_seconds: config.seconds(Phase::Work),
            config,
            rendered: false,
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.rendered {
            self.rendered = true;
            return TickOutcome::Rendered;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds > 0 {
            return TickOutcome::Counted;
        }

        self.phase = self.phase.flipped();
        self.remaining_seconds = self.config.seconds(self.phase);
        TickOutcome::PhaseChanged(self.phase)
    }

    /// `Work: 24:59`, minutes unpadded and seconds zero-padded.
    pub fn display(&self) -> String {
        format!(
            "{}: {}:{:02}",
            self.phase.label(),
            self.remaining_seconds / 60,
            self.remaining_seconds % 60
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(config: PomodoroConfig) -> PomodoroState {
        let mut state = PomodoroState::new(config);
        assert_eq!(state.tick(), TickOutcome::Rendered);
        state
    }

    #[test]
    fn first_tick_shows_full_duration() {
        let mut state = PomodoroState::new(PomodoroConfig::default());
        state.tick();
        assert_eq!(state.remaining_seconds, 1500);
        assert_eq!(state.display(), "Work: 25:00");
        state.tick();
        assert_eq!(state.display(), "Work: 24:59");
    }

    #[test]
    fn switches_to_break_after_the_work_interval() {
        let mut state = started(PomodoroConfig::default());
        let mut changes = Vec::new();
        for _ in 0..25 * 60 {
            if let TickOutcome::PhaseChanged(phase) = state.tick() {
                changes.push(phase);
            }
        }
        assert_eq!(changes, vec![Phase::Break]);
        assert_eq!(state.phase, Phase::Break);
        assert_eq!(state.remaining_seconds, 300);
    }

    #[test]
    fn returns_to_work_after_a_full_cycle() {
        let mut state = started(PomodoroConfig::default());
        for _ in 0..(25 * 60 + 5 * 60) {
            state.tick();
        }
        assert_eq!(state.phase, Phase::Work);
        assert_eq!(state.remaining_seconds, 1500);
    }

    #[test]
    fn remaining_strictly_decreases_between_flips() {
        let mut state = started(PomodoroConfig {
            work_minutes: 1,
            break_minutes: 1,
        });
        let mut previous = state.remaining_seconds;
        for _ in 0..59 {
            state.tick();
            assert_eq!(state.remaining_seconds, previous - 1);
            previous = state.remaining_seconds;
        }
    }

    #[test]
    fn settings_durations_are_clamped() {
        let settings = SettingsStore::in_memory();
        settings
            .set(crate::settings::StorageArea::Sync, "pomodoroWork", 0)
            .unwrap();
        settings
            .set(crate::settings::StorageArea::Sync, "pomodoroBreak", 10)
            .unwrap();
        let config = PomodoroConfig::from_settings(&settings);
        assert_eq!(config.work_minutes, 1);
        assert_eq!(config.break_minutes, 10);
    }
}
