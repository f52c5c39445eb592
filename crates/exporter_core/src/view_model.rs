use crate::Phase;

/// Snapshot of the collection progress, used for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectView {
    pub phase: Phase,
    /// Number of pages the DOM announced; `None` until known or when settling.
    pub expected: Option<usize>,
    pub stored: usize,
    /// Responses held back until the expected page list is known.
    pub pending: usize,
    pub ignored: usize,
}
