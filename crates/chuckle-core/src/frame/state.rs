/// Lifecycle of a `RenderWindow`.
///
/// `NotOpened -> Running -> Closing -> Closed`; `Closed` is terminal.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    /// Constructed, `run` not entered yet.
    NotOpened,
    /// Inside `run`.
    Running,
    /// Close observed or a fatal error returned; tearing down the loop.
    Closing,
    Closed,
}

impl LoopState {
    #[inline]
    pub fn is_closed(self) -> bool {
        self == LoopState::Closed
    }
}
