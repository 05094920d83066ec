use tracing::{debug, info};

pub const DEFAULT_DURATION_SECS: u32 = 25 * 60;
pub const COMPLETION_MESSAGE: &str = "Timer completed! Take a break.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// The timer was not running; nothing changed.
    Idle,
    Ticked(u32),
    /// Countdown hit zero. The timer is already back at its full duration.
    Completed,
}

/// Single countdown clock. It has no tick source of its own: the owning event
/// loop calls [`Timer::tick`] once per second while it is running, so pausing
/// or resetting can never leave a stray tick behind.
#[derive(Debug, Clone)]
pub struct Timer {
    duration_secs: u32,
    remaining_secs: u32,
    state: TimerState,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_SECS)
    }
}

impl Timer {
    pub fn new(duration_secs: u32) -> Self {
        let duration_secs = duration_secs.max(1);
        Self {
            duration_secs,
            remaining_secs: duration_secs,
            state: TimerState::Idle,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Returns false when already running.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        debug!(remaining = self.remaining_secs, "timer started");
        self.state = TimerState::Running;
        true
    }

    pub fn pause(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        debug!(remaining = self.remaining_secs, "timer paused");
        self.state = TimerState::Paused;
        true
    }

    /// The start/pause button.
    pub fn toggle(&mut self) {
        if self.is_running() {
            self.pause();
        } else {
            self.start();
        }
    }

    pub fn reset(&mut self) {
        self.remaining_secs = self.duration_secs;
        self.state = TimerState::Idle;
    }

    pub fn tick(&mut self) -> TimerEvent {
        if !self.is_running() {
            return TimerEvent::Idle;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return TimerEvent::Ticked(self.remaining_secs);
        }

        self.state = TimerState::Completed;
        info!(duration = self.duration_secs, "timer completed");
        self.reset();
        TimerEvent::Completed
    }

    /// `MM:SS`
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }

    pub fn button_label(&self) -> &'static str {
        match self.state {
            TimerState::Running => "Pause",
            TimerState::Paused => "Resume",
            TimerState::Idle | TimerState::Completed => "Start",
        }
    }
}
