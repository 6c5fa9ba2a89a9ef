//! Error taxonomy for portal navigation and harvesting.

use std::time::Duration;

use crate::driver::DriverError;
use crate::parse::MalformedSection;

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// The requested label is absent from the live option list. Non-retryable;
    /// the option space was fully enumerated before giving up.
    #[error("option '{label}' not found in the {control} list")]
    OptionNotFound {
        control: &'static str,
        label: String,
    },

    /// An option list was rebuilt between read and click, and the single
    /// local re-open retry also failed.
    #[error("ui reference went stale while {action}")]
    StaleUiReference {
        action: &'static str,
        #[source]
        source: DriverError,
    },

    /// A polled wait expired. For search submission this is downgraded to a
    /// log line ("results may be stale or empty"); everywhere else it aborts.
    #[error("timed out after {timeout:?} waiting for '{locator}'")]
    WaitTimeout { locator: String, timeout: Duration },

    #[error(transparent)]
    Malformed(#[from] MalformedSection),

    #[error(transparent)]
    Driver(#[from] DriverError),
}
