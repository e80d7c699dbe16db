mod client;
mod commands;
mod error;
mod job;
mod pool;
mod queue;
mod resp;
mod utils;

pub use client::{Client, ClientBuilder};
pub use error::Error;
pub use job::{AddOptions, GetOptions, Job};
pub use pool::{Connection, HealthCheck};
pub use queue::{QueueStats, StatValue};
