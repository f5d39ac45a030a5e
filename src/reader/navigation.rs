use std::time::{Duration, Instant};

/// Current position in the page sequence. Moves outside the book are
/// ignored.
#[derive(Debug, Clone)]
pub struct Navigator {
    index: usize,
    len: usize,
}

impl Navigator {
    pub fn new(len: usize, start: usize) -> Self {
        Self {
            index: start.min(len.saturating_sub(1)),
            len,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.len
    }

    pub fn next_index(&self) -> Option<usize> {
        (!self.is_last()).then(|| self.index + 1)
    }

    pub fn prev_index(&self) -> Option<usize> {
        self.index.checked_sub(1)
    }

    /// Returns false and leaves the position alone when `index` is out of
    /// range.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        self.index = index;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    FadingOut { target: usize, until: Instant },
    Settling { until: Instant },
}

/// Two-step page turn: fade the outgoing page, swap, then let the new page
/// settle. New turns are refused until the sequence finishes.
#[derive(Debug, Clone)]
pub struct PageTransition {
    phase: Phase,
    fade: Duration,
    settle: Duration,
}

impl PageTransition {
    pub fn new(fade: Duration, settle: Duration) -> Self {
        Self {
            phase: Phase::Idle,
            fade,
            settle,
        }
    }

    pub fn is_transitioning(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Starts turning to `target`. Returns false if a turn is in flight.
    pub fn begin(&mut self, target: usize, now: Instant) -> bool {
        if self.is_transitioning() {
            return false;
        }
        self.phase = Phase::FadingOut {
            target,
            until: now + self.fade,
        };
        true
    }

    /// Advances the animation. Returns the page to swap in when the fade
    /// completes.
    pub fn tick(&mut self, now: Instant) -> Option<usize> {
        match self.phase {
            Phase::FadingOut { target, until } if now >= until => {
                self.phase = Phase::Settling {
                    until: now + self.settle,
                };
                Some(target)
            }
            Phase::Settling { until } if now >= until => {
                self.phase = Phase::Idle;
                None
            }
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
    }
}

/// Highlighted block on the current page. `None` means above all blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockCursor {
    active: Option<usize>,
}

impl BlockCursor {
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn up(&mut self) {
        self.active = self.active.and_then(|i| i.checked_sub(1));
    }

    pub fn down(&mut self, block_count: usize) {
        if block_count == 0 {
            return;
        }
        self.active = Some(match self.active {
            None => 0,
            Some(i) => (i + 1).min(block_count - 1),
        });
    }

    pub fn reset(&mut self) {
        self.active = None;
    }
}

/// Hides reader chrome after a period without input.
#[derive(Debug, Clone)]
pub struct ControlsTimer {
    visible: bool,
    last_activity: Instant,
    delay: Duration,
}

impl ControlsTimer {
    pub fn new(delay: Duration, now: Instant) -> Self {
        Self {
            visible: true,
            last_activity: now,
            delay,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn touch(&mut self, now: Instant) {
        self.visible = true;
        self.last_activity = now;
    }

    /// `hold` keeps the controls on screen regardless of idle time.
    pub fn tick(&mut self, now: Instant, hold: bool) {
        if self.visible && !hold && now.duration_since(self.last_activity) >= self.delay {
            self.visible = false;
        }
    }
}
