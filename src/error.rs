use thiserror::Error;

/// Enumerates all errors that this crate may return.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O failure while dialing, writing to, or reading from a connection.
    ///
    /// The connection that observed this error is closed rather than
    /// returned to the pool.
    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),

    /// The broker replied with an error frame.
    ///
    /// The message is the broker-supplied text verbatim, e.g. `ERR syntax error`
    /// or `NOREPL Not enough reachable nodes for the requested replication level`.
    /// Callers discriminate by prefix.
    #[error("{message}")]
    Server {
        /// Broker error text, verbatim.
        message: String,
    },

    /// The reply stream violated RESP framing rules.
    #[error("protocol violation: {msg}")]
    Protocol {
        /// Details on what exactly went wrong.
        msg: &'static str,
    },

    /// The reply was well-formed RESP but not the shape this command expects.
    #[error("unexpected reply: {msg}")]
    UnexpectedReply {
        /// Details on what exactly went wrong.
        msg: &'static str,
    },
}
