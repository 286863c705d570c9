/// Coalesces redraw requests into at most one draw per animation frame.
///
/// `schedule` may be called any number of times between frames; the host
/// only needs to request a frame when it returns `true`.
#[derive(Debug, Default, Clone)]
pub struct FrameScheduler {
    pending: bool,
    requests: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a redraw as needed. Returns `true` only for the first call
    /// since the last frame.
    pub fn schedule(&mut self) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        self.requests += 1;
        true
    }

    /// Consumes the pending request at frame time.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    pub fn cancel(&mut self) {
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Number of frames requested from the host so far.
    pub fn requests(&self) -> u64 {
        self.requests
    }
}
