//! Cancellable idle timer that offers a hint on the hazard scene.
//!
//! Time is passed in explicitly as milliseconds so hosts can drive it from
//! `setTimeout`, a frame loop, or a test clock.
use serde::{Deserialize, Serialize};

use crate::constants::HINT_IDLE_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdleHintTimer {
    delay_ms: u64,
    deadline_ms: Option<u64>,
    prompt_visible: bool,
}

impl Default for IdleHintTimer {
    fn default() -> Self {
        Self::new(HINT_IDLE_MS)
    }
}

impl IdleHintTimer {
    #[must_use]
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            deadline_ms: None,
            prompt_visible: false,
        }
    }

    /// Start (or restart) the countdown from `now_ms`.
    pub const fn arm(&mut self, now_ms: u64) {
        self.deadline_ms = Some(now_ms.saturating_add(self.delay_ms));
    }

    /// Stop the countdown without touching a prompt that is already showing.
    pub const fn cancel(&mut self) {
        self.deadline_ms = None;
    }

    /// Hide the prompt, leaving any pending countdown running.
    pub const fn hide_prompt(&mut self) {
        self.prompt_visible = false;
    }

    /// Hide the prompt and stop the countdown.
    pub const fn dismiss(&mut self) {
        self.prompt_visible = false;
        self.deadline_ms = None;
    }

    /// Fire if the deadline has passed. Returns `true` only on the firing call.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                self.prompt_visible = true;
                log::debug!("idle hint prompt raised at {now_ms}ms");
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.deadline_ms.is_some()
    }

    #[must_use]
    pub const fn deadline_ms(&self) -> Option<u64> {
        self.deadline_ms
    }

    #[must_use]
    pub const fn prompt_visible(&self) -> bool {
        self.prompt_visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_delay() {
        let mut timer = IdleHintTimer::default();
        timer.arm(1_000);
        assert!(!timer.poll(20_999));
        assert!(timer.poll(21_000));
        assert!(timer.prompt_visible());
        assert!(!timer.poll(50_000));
    }

    #[test]
    fn rearming_pushes_deadline_out() {
        let mut timer = IdleHintTimer::new(100);
        timer.arm(0);
        timer.arm(80);
        assert!(!timer.poll(120));
        assert_eq!(timer.deadline_ms(), Some(180));
        assert!(timer.poll(180));
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timer = IdleHintTimer::new(10);
        timer.arm(0);
        timer.cancel();
        assert!(!timer.is_armed());
        assert!(!timer.poll(1_000));
        assert!(!timer.prompt_visible());
    }

    #[test]
    fn hiding_prompt_keeps_countdown() {
        let mut timer = IdleHintTimer::new(10);
        timer.arm(0);
        timer.hide_prompt();
        assert!(timer.poll(10));
    }

    #[test]
    fn dismiss_hides_prompt() {
        let mut timer = IdleHintTimer::new(10);
        timer.arm(0);
        assert!(timer.poll(10));
        timer.dismiss();
        assert!(!timer.prompt_visible());
    }
}
