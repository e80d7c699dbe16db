use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tracing::debug;

use crate::resp::{encode_command, read_reply, Reply};
use crate::Error;

/// Per-borrow predicate applied to an idle connection before it is handed
/// out. Receives the connection and the time it has spent idle; returning
/// `false` evicts the connection and the borrow moves on to the next one.
pub type HealthCheck = Arc<dyn Fn(&Connection, Duration) -> bool + Send + Sync>;

#[derive(Clone)]
pub(crate) struct PoolConfig {
    pub(crate) endpoint: String,
    pub(crate) max_idle: usize,
    pub(crate) idle_timeout: Duration,
    pub(crate) health_check: Option<HealthCheck>,
}

/// One broker connection: a TCP stream with RESP framing on top.
pub struct Connection {
    reader: BufReader<TcpStream>,
    write_buf: Vec<u8>,
}

impl Connection {
    pub(crate) async fn connect(endpoint: &str) -> Result<Self, Error> {
        let stream = TcpStream::connect(endpoint).await?;
        // Requests are small; trading bandwidth for latency is the right call.
        stream.set_nodelay(true)?;
        Ok(Connection {
            reader: BufReader::new(stream),
            write_buf: Vec::with_capacity(256),
        })
    }

    /// Address of the broker end of this connection.
    pub fn peer_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.reader.get_ref().peer_addr()
    }

    /// Writes one request frame and reads one reply frame.
    ///
    /// A RESP error frame comes back as [`Error::Server`] carrying the
    /// broker text verbatim; the wire is clean in that case.
    pub(crate) async fn exec(&mut self, args: &[Vec<u8>]) -> Result<Reply, Error> {
        self.write_frame(args).await?;
        match read_reply(&mut self.reader).await? {
            Reply::Error(message) => Err(Error::Server { message }),
            reply => Ok(reply),
        }
    }

    /// Writes one request frame without awaiting the reply.
    pub(crate) async fn send(&mut self, args: &[Vec<u8>]) -> Result<(), Error> {
        self.write_frame(args).await
    }

    async fn write_frame(&mut self, args: &[Vec<u8>]) -> Result<(), Error> {
        self.write_buf.clear();
        encode_command(args, &mut self.write_buf);
        let stream = self.reader.get_mut();
        stream.write_all(&self.write_buf).await?;
        stream.flush().await?;
        Ok(())
    }
}

struct Idle {
    conn: Connection,
    since: Instant,
}

struct PoolShared {
    config: PoolConfig,
    idle: Mutex<VecDeque<Idle>>,
}

impl PoolShared {
    fn prune(&self) {
        let mut idle = self.idle.lock().expect("pool mutex poisoned");
        let timeout = self.config.idle_timeout;
        let before = idle.len();
        idle.retain(|entry| entry.since.elapsed() < timeout);
        let evicted = before - idle.len();
        if evicted > 0 {
            debug!(evicted, "evicted connections past the idle timeout");
        }
    }
}

/// Reservoir of reusable broker connections.
///
/// Only the idle set is bounded (`max_idle`); concurrent borrows dial
/// freely, so callers must bound their own concurrency if the broker's
/// accept queue is limited.
#[derive(Clone)]
pub(crate) struct Pool {
    shared: Arc<PoolShared>,
}

impl Pool {
    pub(crate) fn new(config: PoolConfig) -> Self {
        let idle = Mutex::new(VecDeque::with_capacity(config.max_idle));
        let pool = Pool {
            shared: Arc::new(PoolShared { config, idle }),
        };
        pool.spawn_reaper();
        pool
    }

    /// Background sweep for idle connections. Holds only a weak reference,
    /// so the task winds down once the last pool handle is dropped.
    fn spawn_reaper(&self) {
        let shared = Arc::downgrade(&self.shared);
        let period = (self.shared.config.idle_timeout / 2).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(period);
            tick.tick().await;
            loop {
                tick.tick().await;
                match shared.upgrade() {
                    Some(shared) => shared.prune(),
                    None => break,
                }
            }
        });
    }

    /// Borrows an idle connection, or dials a new one when none passes the
    /// idle-timeout and health checks.
    pub(crate) async fn acquire(&self) -> Result<PooledConnection, Error> {
        while let Some(entry) = self.pop_idle() {
            let idle_for = entry.since.elapsed();
            if idle_for >= self.shared.config.idle_timeout {
                debug!("evicting idle connection past the idle timeout");
                continue;
            }
            if let Some(check) = &self.shared.config.health_check {
                if !check(&entry.conn, idle_for) {
                    debug!("evicting idle connection rejected by health check");
                    continue;
                }
            }
            return Ok(PooledConnection::new(self.shared.clone(), entry.conn));
        }
        let conn = Connection::connect(&self.shared.config.endpoint).await?;
        debug!(endpoint = %self.shared.config.endpoint, "dialed new connection");
        Ok(PooledConnection::new(self.shared.clone(), conn))
    }

    fn pop_idle(&self) -> Option<Idle> {
        let mut idle = self.shared.idle.lock().expect("pool mutex poisoned");
        idle.pop_front()
    }

    #[cfg(test)]
    fn idle_len(&self) -> usize {
        self.shared.idle.lock().expect("pool mutex poisoned").len()
    }
}

/// RAII guard for a borrowed connection.
///
/// On drop the connection re-enters the idle set iff its wire state is
/// known clean and the idle set is under `max_idle`; otherwise it is
/// closed. Every borrow is therefore matched by a return or a close on
/// every exit path, including failures.
pub(crate) struct PooledConnection {
    shared: Arc<PoolShared>,
    conn: Option<Connection>,
    reusable: bool,
}

impl PooledConnection {
    fn new(shared: Arc<PoolShared>, conn: Connection) -> Self {
        PooledConnection {
            shared,
            conn: Some(conn),
            reusable: true,
        }
    }

    pub(crate) async fn exec(&mut self, args: &[Vec<u8>]) -> Result<Reply, Error> {
        let conn = self.conn.as_mut().expect("connection present until drop");
        let result = conn.exec(args).await;
        if matches!(result, Err(Error::Io(_)) | Err(Error::Protocol { .. })) {
            // Partial frame may be left on the wire.
            self.reusable = false;
        }
        result
    }

    pub(crate) async fn send(&mut self, args: &[Vec<u8>]) -> Result<(), Error> {
        let conn = self.conn.as_mut().expect("connection present until drop");
        let result = conn.send(args).await;
        // The broker's reply to this frame is never read, so the next
        // borrower would see it as a stale reply. Retire the connection.
        self.reusable = false;
        result
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let conn = match self.conn.take() {
            Some(conn) => conn,
            None => return,
        };
        if !self.reusable {
            debug!("closing connection with unclean wire state");
            return;
        }
        self.shared.prune();
        let mut idle = self.shared.idle.lock().expect("pool mutex poisoned");
        if idle.len() < self.shared.config.max_idle {
            idle.push_back(Idle {
                conn,
                since: Instant::now(),
            });
        }
    }
}
