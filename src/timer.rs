use std::fmt;
use std::time::Duration;

const ONE_SECOND: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Completed,
}

/// One-second countdown with start/pause/reset and a completion hook.
///
/// The timer never reads the clock itself. Owners either call [`tick`] once
/// per second or feed measured wall time through [`advance`], which turns it
/// into whole-second ticks.
///
/// [`tick`]: CountdownTimer::tick
/// [`advance`]: CountdownTimer::advance
pub struct CountdownTimer {
    duration_secs: u32,
    remaining_secs: u32,
    state: TimerState,
    carry: Duration,
    on_complete: Option<Box<dyn FnMut()>>,
}

impl fmt::Debug for CountdownTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountdownTimer")
            .field("duration_secs", &self.duration_secs)
            .field("remaining_secs", &self.remaining_secs)
            .field("state", &self.state)
            .field("carry", &self.carry)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl CountdownTimer {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            duration_secs,
            remaining_secs: duration_secs,
            state: TimerState::Idle,
            carry: Duration::ZERO,
            on_complete: None,
        }
    }

    pub fn with_on_complete(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn is_completed(&self) -> bool {
        self.state == TimerState::Completed
    }

    pub fn start(&mut self) {
        match self.state {
            TimerState::Idle | TimerState::Paused => self.state = TimerState::Running,
            TimerState::Running | TimerState::Completed => {}
        }
    }

    pub fn pause(&mut self) {
        if self.state == TimerState::Running {
            self.state = TimerState::Paused;
            self.carry = Duration::ZERO;
        }
    }

    pub fn reset(&mut self) {
        self.remaining_secs = self.duration_secs;
        self.state = TimerState::Idle;
        self.carry = Duration::ZERO;
    }

    /// Reset to the full duration and run immediately
    pub fn restart(&mut self) {
        self.reset();
        self.start();
    }

    /// Change the duration used by the next reset/restart
    pub fn set_duration(&mut self, duration_secs: u32) {
        self.duration_secs = duration_secs;
        if self.state == TimerState::Idle {
            self.remaining_secs = duration_secs;
        }
    }

    /// Mark the countdown done without firing the completion hook
    pub fn finish(&mut self) {
        self.state = TimerState::Completed;
        self.carry = Duration::ZERO;
    }

    /// Advance by one second. Returns true on the tick that completes the
    /// countdown; that is also the only tick that fires the hook.
    pub fn tick(&mut self) -> bool {
        if self.state != TimerState::Running {
            return false;
        }

        if self.remaining_secs <= 1 {
            self.remaining_secs = 0;
            self.state = TimerState::Completed;
            self.carry = Duration::ZERO;
            if let Some(f) = self.on_complete.as_mut() {
                f();
            }
            return true;
        }

        self.remaining_secs -= 1;
        false
    }

    /// Feed elapsed wall time. Returns true if the countdown completed.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        if self.state != TimerState::Running {
            return false;
        }

        self.carry += elapsed;
        while self.carry >= ONE_SECOND {
            self.carry -= ONE_SECOND;
            if self.tick() {
                return true;
            }
        }
        false
    }

    pub fn format(&self) -> String {
        format_mmss(self.remaining_secs)
    }
}

/// Render seconds as `M:SS`
pub fn format_mmss(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
