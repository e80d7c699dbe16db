use std::sync::Arc;
use std::time::Duration;

use super::{opts, Client};
use crate::pool::Connection;
use crate::utils;
use crate::Error;

/// Builder for [`Client`].
#[derive(Clone, Default)]
pub struct ClientBuilder {
    opts: opts::ClientOptions,
}

impl ClientBuilder {
    /// Cap on simultaneously idle connections kept for reuse (default 3).
    ///
    /// In-use connections are not bounded; bursts of concurrent calls dial
    /// freely and only `max_idle` of them are retained afterwards.
    pub fn max_idle(mut self, max_idle: usize) -> Self {
        self.opts.max_idle = max_idle;
        self
    }

    /// Idle duration after which a pooled connection is evicted
    /// (default 240 seconds).
    pub fn idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.opts.idle_timeout = idle_timeout;
        self
    }

    /// Predicate applied to an idle connection before every borrow.
    ///
    /// Receives the connection and the time it has spent idle; returning
    /// `false` evicts the connection and the borrow falls through to the
    /// next idle one, or dials fresh.
    pub fn health_check<F>(mut self, check: F) -> Self
    where
        F: Fn(&Connection, Duration) -> bool + Send + Sync + 'static,
    {
        self.opts.health_check = Some(Arc::new(check));
        self
    }

    /// Connect to the broker.
    ///
    /// The endpoint is resolved from the environment as described on
    /// [`Client::connect`].
    pub async fn connect(self) -> Result<Client, Error> {
        let endpoint = utils::resolve_endpoint(None);
        Client::new(endpoint, self.opts).await
    }

    /// Connect to the broker at this address, e.g. `127.0.0.1:7711`.
    pub async fn connect_to<A>(self, addr: A) -> Result<Client, Error>
    where
        A: AsRef<str>,
    {
        Client::new(addr.as_ref().to_string(), self.opts).await
    }
}
