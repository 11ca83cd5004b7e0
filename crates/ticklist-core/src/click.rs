//! Single versus double click disambiguation.
//!
//! A single click on a tag selects it, a double click opens it for editing.
//! Because every double click starts with a single click, the single-click
//! action is held back for a short window and dropped if a double click
//! arrives first. The machine holds no timer: callers feed it the current
//! instant and poll it.

use std::time::{Duration, Instant};

use crate::defaults::DOUBLE_CLICK_WINDOW_MS;

/// Debounce state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickState<T> {
    /// Nothing pending.
    Idle,
    /// A single click is waiting for the window to close.
    Pending { target: T, deadline: Instant },
    /// The last pending click has fired.
    Committed,
}

/// Action released by the debouncer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction<T> {
    /// Single click confirmed.
    Select(T),
    /// Double click; any pending single click was cancelled.
    Edit(T),
}

/// Debounce state machine for click targets of type `T`.
#[derive(Debug, Clone)]
pub struct ClickDebouncer<T> {
    window: Duration,
    state: ClickState<T>,
}

impl<T: Clone> Default for ClickDebouncer<T> {
    fn default() -> Self {
        Self::new(Duration::from_millis(DOUBLE_CLICK_WINDOW_MS))
    }
}

impl<T: Clone> ClickDebouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            state: ClickState::Idle,
        }
    }

    pub fn state(&self) -> &ClickState<T> {
        &self.state
    }

    /// Register a single click. Replaces any click still pending.
    pub fn on_click(&mut self, target: T, now: Instant) {
        self.state = ClickState::Pending {
            target,
            deadline: now + self.window,
        };
    }

    /// Register a double click. Cancels the pending single click.
    pub fn on_double_click(&mut self, target: T) -> ClickAction<T> {
        self.state = ClickState::Idle;
        ClickAction::Edit(target)
    }

    /// Fire the pending click once its window has passed.
    pub fn poll(&mut self, now: Instant) -> Option<ClickAction<T>> {
        match &self.state {
            ClickState::Pending { target, deadline } if now >= *deadline => {
                let target = target.clone();
                self.state = ClickState::Committed;
                Some(ClickAction::Select(target))
            }
            _ => None,
        }
    }

    /// Drop anything pending, e.g. when the component unmounts.
    pub fn reset(&mut self) {
        self.state = ClickState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_single_click_fires_after_window() {
        let start = Instant::now();
        let mut clicks = ClickDebouncer::default();
        clicks.on_click("tag-1", start);

        assert_eq!(clicks.poll(start + ms(100)), None);
        assert_eq!(
            clicks.poll(start + ms(DOUBLE_CLICK_WINDOW_MS)),
            Some(ClickAction::Select("tag-1"))
        );
        assert_eq!(clicks.state(), &ClickState::Committed);
        assert_eq!(clicks.poll(start + ms(1000)), None);
    }

    #[test]
    fn test_double_click_cancels_pending() {
        let start = Instant::now();
        let mut clicks = ClickDebouncer::default();
        clicks.on_click("tag-1", start);

        assert_eq!(clicks.on_double_click("tag-1"), ClickAction::Edit("tag-1"));
        assert_eq!(clicks.state(), &ClickState::Idle);
        assert_eq!(clicks.poll(start + ms(500)), None);
    }

    #[test]
    fn test_second_click_restarts_window() {
        let start = Instant::now();
        let mut clicks = ClickDebouncer::new(ms(200));
        clicks.on_click("tag-1", start);
        clicks.on_click("tag-2", start + ms(150));

        assert_eq!(clicks.poll(start + ms(250)), None);
        assert_eq!(
            clicks.poll(start + ms(350)),
            Some(ClickAction::Select("tag-2"))
        );
    }

    #[test]
    fn test_reset_drops_pending() {
        let start = Instant::now();
        let mut clicks = ClickDebouncer::default();
        clicks.on_click(7u32, start);
        clicks.reset();
        assert_eq!(clicks.poll(start + ms(1000)), None);
        assert_eq!(clicks.state(), &ClickState::Idle);
    }
}
