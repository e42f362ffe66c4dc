//! Touch long-press activation.
//!
//! The activator is clock-driven: every call takes the current `Instant`, so the
//! embedding surface decides how often to `tick` and tests can use synthetic
//! time. Each touch event first settles a timer that has already come due.

use std::time::{Duration, Instant};

use crate::traits::ItemId;

/// Default hold duration before activation.
pub const DEFAULT_HOLD: Duration = Duration::from_millis(600);

/// Touch contact identifier as reported by the platform.
pub type ContactId = u64;

/// One armed long-press timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LongPressTimer {
    pub item_id: ItemId,
    pub contact: ContactId,
    pub armed_at: Instant,
    pub fired: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum PressPhase {
    #[default]
    Idle,
    Pressing(LongPressTimer),
    /// The hold fired; waiting for the finger to lift
    Activated(LongPressTimer),
}

/// What the session should do in response to a touch step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LongPressEvent {
    None,
    /// The hold completed: enter batch mode, mark the item, request haptics
    Fired(ItemId),
    /// The press ended early; no side effect
    Cancelled,
    /// The finger lifted after activation; the synthesized click must be swallowed
    ReleasedAfterActivation,
}

/// Long-Press Activator state machine.
#[derive(Debug, Clone)]
pub struct LongPressActivator {
    phase: PressPhase,
    hold: Duration,
}

impl Default for LongPressActivator {
    fn default() -> Self {
        Self::new(DEFAULT_HOLD)
    }
}

impl LongPressActivator {
    pub fn new(hold: Duration) -> Self {
        Self {
            phase: PressPhase::Idle,
            hold,
        }
    }

    pub fn hold(&self) -> Duration {
        self.hold
    }

    /// Changes the hold duration; a pending press is measured against the new value.
    pub fn set_hold(&mut self, hold: Duration) {
        self.hold = hold;
    }

    pub fn is_idle(&self) -> bool {
        self.phase == PressPhase::Idle
    }

    pub fn is_activated(&self) -> bool {
        matches!(self.phase, PressPhase::Activated(_))
    }

    /// Returns the armed timer, if a press is pending.
    pub fn timer(&self) -> Option<LongPressTimer> {
        match self.phase {
            PressPhase::Pressing(timer) => Some(timer),
            _ => None,
        }
    }

    /// Time left before the pending press fires; `None` when nothing is pending.
    pub fn time_remaining(&self, now: Instant) -> Option<Duration> {
        self.timer()
            .map(|t| self.hold.saturating_sub(now.saturating_duration_since(t.armed_at)))
    }

    /// Touch started on an item.
    ///
    /// A second concurrent contact is ignored while another is tracked.
    pub fn touch_start(&mut self, contact: ContactId, item_id: ItemId, now: Instant) -> LongPressEvent {
        let settled = self.settle(now);
        if settled != LongPressEvent::None || !self.is_idle() {
            return settled;
        }
        self.phase = PressPhase::Pressing(LongPressTimer {
            item_id,
            contact,
            armed_at: now,
            fired: false,
        });
        LongPressEvent::None
    }

    /// Touch moved. Movement before the timer fires cancels the press.
    pub fn touch_move(&mut self, contact: ContactId, now: Instant) -> LongPressEvent {
        let settled = self.settle(now);
        if settled != LongPressEvent::None {
            return settled;
        }
        match self.phase {
            PressPhase::Pressing(timer) if timer.contact == contact => {
                tracing::debug!(item_id = timer.item_id, "long press cancelled by movement");
                self.phase = PressPhase::Idle;
                LongPressEvent::Cancelled
            }
            _ => LongPressEvent::None,
        }
    }

    /// Touch lifted.
    ///
    /// A timer that came due before the release fires first; the caller sees
    /// `Fired` and the activator is then waiting for this same release, which
    /// it treats as already observed.
    pub fn touch_end(&mut self, contact: ContactId, now: Instant) -> LongPressEvent {
        let settled = self.settle(now);
        if let LongPressEvent::Fired(_) = settled {
            if matches!(self.phase, PressPhase::Activated(timer) if timer.contact == contact) {
                self.phase = PressPhase::Idle;
            }
            return settled;
        }
        match self.phase {
            PressPhase::Pressing(timer) if timer.contact == contact => {
                self.phase = PressPhase::Idle;
                LongPressEvent::Cancelled
            }
            PressPhase::Activated(timer) if timer.contact == contact => {
                self.phase = PressPhase::Idle;
                LongPressEvent::ReleasedAfterActivation
            }
            _ => LongPressEvent::None,
        }
    }

    /// Advances the clock; fires the pending timer if it is due.
    pub fn tick(&mut self, now: Instant) -> LongPressEvent {
        self.settle(now)
    }

    /// Drops any pending press without side effects.
    pub fn cancel(&mut self) {
        self.phase = PressPhase::Idle;
    }

    fn settle(&mut self, now: Instant) -> LongPressEvent {
        let PressPhase::Pressing(mut timer) = self.phase else {
            return LongPressEvent::None;
        };
        if now.saturating_duration_since(timer.armed_at) < self.hold {
            return LongPressEvent::None;
        }
        timer.fired = true;
        tracing::debug!(item_id = timer.item_id, "long press fired");
        self.phase = PressPhase::Activated(timer);
        LongPressEvent::Fired(timer.item_id)
    }
}
