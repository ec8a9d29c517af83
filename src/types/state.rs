//! Lifecycle state of an [`AtomicFile`](crate::AtomicFile).

/// `Open --commit--> Closed`, `Open --abort--> Aborted`, `Open --commit fails--> Aborted`.
///
/// `Closed` and `Aborted` are terminal; further commit/abort calls are no-ops.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// Temp file is open and accepts reads and writes. The target is untouched.
    Open,
    /// Temp file was renamed over the target.
    Closed,
    /// Temp file was removed; the target is untouched.
    Aborted,
}

impl State {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, State::Open)
    }
}
