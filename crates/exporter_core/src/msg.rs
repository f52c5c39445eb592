use std::time::Duration;

/// Inputs to the collection state machine. Times are offsets from the start
/// of the harvest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The chapter page finished loading.
    NavigationFinished { at: Duration },
    /// The navigation bound elapsed before the page loaded.
    NavigationTimedOut,
    /// Image URLs read from the rendered DOM, in reading order.
    ExpectedPages(Vec<String>),
    /// An image response finished loading.
    ImageResponse { url: String, at: Duration },
    /// Timer wake-up requested through `CollectState::next_wakeup`.
    Tick { now: Duration },
}
