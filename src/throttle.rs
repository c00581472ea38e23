//! Single-flight-per-frame guard for scroll handling.

/// Allows at most one pending animation-frame callback at a time.
///
/// Scroll events call [`FrameThrottle::try_schedule`]; only the first one
/// since the last completed frame gets `true` and should request a frame.
/// The frame callback calls [`FrameThrottle::complete`] after doing its work.
#[derive(Debug, Default, Clone)]
pub struct FrameThrottle {
    pending: bool,
}

impl FrameThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a frame as pending. Returns `false` if one already is.
    pub fn try_schedule(&mut self) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        true
    }

    /// Clear the pending flag once the frame's work has run.
    pub fn complete(&mut self) {
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}
