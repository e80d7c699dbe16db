use std::time::Duration;

use crate::pool::HealthCheck;

#[derive(Clone)]
pub(crate) struct ClientOptions {
    pub(crate) max_idle: usize,
    pub(crate) idle_timeout: Duration,
    pub(crate) health_check: Option<HealthCheck>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            max_idle: 3,
            idle_timeout: Duration::from_secs(240),
            health_check: None,
        }
    }
}
