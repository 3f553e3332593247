//! Shared HTTP agent construction for network-backed handlers.

use std::time::Duration;

use ureq::Agent;

/// Default timeout applied to every upstream request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Create an HTTP agent with the given global timeout.
///
/// Status errors are disabled so handlers can map non-2xx responses to
/// their own error detail instead of a transport error.
#[must_use]
pub fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_agent() {
        let _agent = create_agent(DEFAULT_TIMEOUT);
    }
}
