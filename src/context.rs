//! Caller-supplied execution context threaded through to the outbound call.

use std::time::Duration;

/// Per-call execution context.
///
/// The deadline is applied to the single outbound request the facade makes.
/// Cancellation is expressed by dropping the returned future.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CallContext {
    deadline: Option<Duration>,
    api_ticket: Option<String>,
}

impl CallContext {
    /// Creates a context with no deadline and the ambient API ticket.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            deadline: None,
            api_ticket: None,
        }
    }

    /// Bounds the outbound request by `deadline`.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Overrides the ticket presented to the legacy service bridge, usually
    /// taken from the inbound request's `X-AppEngine-API-Ticket` header.
    #[must_use]
    pub fn with_api_ticket(mut self, ticket: impl Into<String>) -> Self {
        self.api_ticket = Some(ticket.into());
        self
    }

    /// Deadline for the outbound request, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Caller supplied API ticket, if any.
    #[must_use]
    pub fn api_ticket(&self) -> Option<&str> {
        self.api_ticket.as_deref()
    }
}
