use crate::pool::{Pool, PoolConfig};

mod builder;
mod opts;
mod public;

pub use builder::ClientBuilder;

/// Disque client.
///
/// Each method leases one pooled connection for its duration, so a client
/// is cheap to clone and safe to share across tasks; concurrent calls run
/// on distinct connections.
#[derive(Clone)]
pub struct Client {
    pool: Pool,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

impl Client {
    async fn new(endpoint: String, opts: opts::ClientOptions) -> Result<Self, crate::Error> {
        let pool = Pool::new(PoolConfig {
            endpoint,
            max_idle: opts.max_idle,
            idle_timeout: opts.idle_timeout,
            health_check: opts.health_check,
        });
        let c = Client { pool };
        // One PING round-trip verifies the endpoint is a live broker before
        // the client is handed out; the connection then seeds the idle set.
        c.ping().await?;
        Ok(c)
    }
}
