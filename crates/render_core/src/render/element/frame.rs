//! Frame-scoped update marks

/// Epoch stamp compared to decide whether anything was drawn since a value was last
/// refreshed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct UpdateMark(u64);

impl UpdateMark {
    /// Mark with a specific value
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw counter value
    pub const fn value(self) -> u64 {
        self.0
    }

    /// The mark following this one
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Per-render-loop state threaded through every element execution
///
/// The mark advances by one after each executed element, so two executions see the
/// same mark only if nothing else ran in between.
#[derive(Debug, Default)]
pub struct FrameContext {
    mark: UpdateMark,
}

impl FrameContext {
    /// Context starting at mark zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Context resuming at `mark`
    pub fn at(mark: UpdateMark) -> Self {
        Self { mark }
    }

    /// Current mark
    pub fn mark(&self) -> UpdateMark {
        self.mark
    }

    /// Step to the next mark and return it
    pub fn advance(&mut self) -> UpdateMark {
        self.mark = self.mark.next();
        self.mark
    }
}
