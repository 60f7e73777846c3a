use std::time::Duration;

use tracing::{debug, info};

use crate::menu::{TrainingMenu, TrainingMenuItem};
use crate::timer::CountdownTimer;

pub const DEFAULT_INTERVAL_SECS: u32 = 10;

/// Delay between the end of a rest interval and the auto-started item
pub const AUTO_START_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub auto_start: bool,
    pub interval_secs: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auto_start: false,
            interval_secs: DEFAULT_INTERVAL_SECS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub active_item_index: usize,
    pub completed: bool,
    pub in_interval: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Item,
    Interval,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    ItemStarted(usize),
    ItemCompleted(usize),
    IntervalStarted { next: usize, secs: u32 },
    IntervalFinished,
    IntervalSkipped,
    SessionCompleted,
}

/// Runs one menu: sequences its items, owns their timers and the rest
/// interval between them.
#[derive(Debug)]
pub struct SessionRunner {
    menu: TrainingMenu,
    config: SessionConfig,
    state: SessionState,
    item_timers: Vec<CountdownTimer>,
    interval_timer: CountdownTimer,
    pending_start: Option<Duration>,
}

impl SessionRunner {
    pub fn new(menu: TrainingMenu, config: SessionConfig) -> Self {
        let item_timers = menu
            .items
            .iter()
            .map(|item| CountdownTimer::new(item.duration_in_seconds))
            .collect();
        let state = SessionState {
            completed: menu.items.is_empty(),
            ..SessionState::default()
        };
        info!(menu = %menu.id, items = menu.items.len(), "session created");

        Self {
            interval_timer: CountdownTimer::new(config.interval_secs),
            menu,
            config,
            state,
            item_timers,
            pending_start: None,
        }
    }

    pub fn menu(&self) -> &TrainingMenu {
        &self.menu
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        if self.state.completed {
            SessionPhase::Completed
        } else if self.state.in_interval {
            SessionPhase::Interval
        } else {
            SessionPhase::Item
        }
    }

    pub fn active_index(&self) -> usize {
        self.state.active_item_index
    }

    pub fn active_item(&self) -> Option<&TrainingMenuItem> {
        self.menu.items.get(self.state.active_item_index)
    }

    /// The item that starts once the current interval ends
    pub fn next_item(&self) -> Option<&TrainingMenuItem> {
        if self.state.in_interval {
            self.active_item()
        } else {
            None
        }
    }

    /// 1-based position of the active item and the item count
    pub fn progress(&self) -> (usize, usize) {
        (self.state.active_item_index + 1, self.menu.items.len())
    }

    pub fn total_duration(&self) -> u64 {
        self.menu.total_duration()
    }

    pub fn item_timer(&self, idx: usize) -> Option<&CountdownTimer> {
        self.item_timers.get(idx)
    }

    pub fn interval_timer(&self) -> &CountdownTimer {
        &self.interval_timer
    }

    pub fn has_pending_start(&self) -> bool {
        self.pending_start.is_some()
    }

    pub fn set_auto_start(&mut self, enabled: bool) {
        self.config.auto_start = enabled;
        if !enabled {
            self.pending_start = None;
        }
    }

    pub fn toggle_auto_start(&mut self) {
        self.set_auto_start(!self.config.auto_start);
    }

    /// Takes effect when the next interval starts
    pub fn set_interval_secs(&mut self, secs: u32) {
        self.config.interval_secs = secs;
        if !self.state.in_interval {
            self.interval_timer.set_duration(secs);
        }
    }

    pub fn adjust_interval_secs(&mut self, delta: i64) {
        let secs = (i64::from(self.config.interval_secs) + delta).clamp(0, i64::from(u32::MAX));
        self.set_interval_secs(u32::try_from(secs).unwrap_or(u32::MAX));
    }

    pub fn start_active(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.phase() == SessionPhase::Item {
            self.start_active_inner(&mut events);
        }
        events
    }

    pub fn pause_active(&mut self) {
        if self.phase() != SessionPhase::Item {
            return;
        }
        self.pending_start = None;
        if let Some(timer) = self.item_timers.get_mut(self.state.active_item_index) {
            timer.pause();
            debug!(index = self.state.active_item_index, "item paused");
        }
    }

    pub fn toggle_active(&mut self) -> Vec<SessionEvent> {
        let running = self
            .item_timers
            .get(self.state.active_item_index)
            .is_some_and(CountdownTimer::is_running);
        if running {
            self.pause_active();
            Vec::new()
        } else {
            self.start_active()
        }
    }

    /// Mark the active item done by hand, regardless of its timer
    pub fn complete_active(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.phase() != SessionPhase::Item {
            return events;
        }
        self.pending_start = None;
        if let Some(timer) = self.item_timers.get_mut(self.state.active_item_index) {
            timer.finish();
        }
        self.on_item_completed(&mut events);
        events
    }

    pub fn skip_interval(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.phase() != SessionPhase::Interval {
            return events;
        }
        self.state.in_interval = false;
        self.interval_timer.reset();
        events.push(SessionEvent::IntervalSkipped);
        debug!("interval skipped");

        if self.config.auto_start {
            self.start_active_inner(&mut events);
        }
        events
    }

    pub fn reset(&mut self) {
        self.state = SessionState {
            completed: self.menu.items.is_empty(),
            ..SessionState::default()
        };
        for timer in &mut self.item_timers {
            timer.reset();
        }
        self.interval_timer.reset();
        self.interval_timer.set_duration(self.config.interval_secs);
        self.pending_start = None;
        info!(menu = %self.menu.id, "session reset");
    }

    /// Feed elapsed wall time into whichever countdown is live
    pub fn on_tick(&mut self, elapsed: Duration) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        match self.phase() {
            SessionPhase::Completed => {}
            SessionPhase::Interval => {
                if self.interval_timer.advance(elapsed) {
                    self.finish_interval(&mut events);
                }
            }
            SessionPhase::Item => {
                if let Some(wait) = self.pending_start.take() {
                    match wait.checked_sub(elapsed) {
                        Some(left) if !left.is_zero() => self.pending_start = Some(left),
                        _ => self.start_active_inner(&mut events),
                    }
                    return events;
                }

                let completed = self
                    .item_timers
                    .get_mut(self.state.active_item_index)
                    .is_some_and(|timer| timer.advance(elapsed));
                if completed {
                    self.on_item_completed(&mut events);
                }
            }
        }

        events
    }

    fn start_active_inner(&mut self, events: &mut Vec<SessionEvent>) {
        self.pending_start = None;
        let idx = self.state.active_item_index;
        if let Some(timer) = self.item_timers.get_mut(idx) {
            if !timer.is_running() && !timer.is_completed() {
                timer.start();
                events.push(SessionEvent::ItemStarted(idx));
                debug!(index = idx, "item started");
            }
        }
    }

    fn on_item_completed(&mut self, events: &mut Vec<SessionEvent>) {
        let idx = self.state.active_item_index;
        events.push(SessionEvent::ItemCompleted(idx));
        debug!(index = idx, "item completed");

        if idx + 1 < self.menu.items.len() {
            self.state.active_item_index = idx + 1;
            if self.config.auto_start {
                self.state.in_interval = true;
                self.interval_timer.set_duration(self.config.interval_secs);
                self.interval_timer.restart();
                events.push(SessionEvent::IntervalStarted {
                    next: idx + 1,
                    secs: self.config.interval_secs,
                });
            }
        } else {
            self.state.completed = true;
            events.push(SessionEvent::SessionCompleted);
            info!(menu = %self.menu.id, "session completed");
        }
    }

    fn finish_interval(&mut self, events: &mut Vec<SessionEvent>) {
        self.state.in_interval = false;
        events.push(SessionEvent::IntervalFinished);
        if self.config.auto_start {
            self.pending_start = Some(AUTO_START_GRACE);
        }
    }
}
