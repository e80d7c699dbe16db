use super::Client;
use crate::commands;
use crate::queue::{stats_from_reply, QueueStats};
use crate::resp::Reply;
use crate::Error;

impl Client {
    /// Returns the number of jobs currently queued in this queue.
    pub async fn queue_len<Q>(&self, queue: Q) -> Result<usize, Error>
    where
        Q: AsRef<str>,
    {
        let mut conn = self.pool.acquire().await?;
        match conn.exec(&commands::qlen(queue.as_ref())).await? {
            Reply::Integer(len) if len >= 0 => Ok(len as usize),
            _ => Err(Error::UnexpectedReply {
                msg: "QLEN reply is not a non-negative integer",
            }),
        }
    }

    /// Returns [`QueueStats`] on the queue with this name, if any.
    ///
    /// Field values keep their wire types: discriminate per known field
    /// (`name` and `import-from` are text, `len`, `jobs-in`, `jobs-out`,
    /// `age`, `idle` integers, and so on).
    pub async fn queue_stats<Q>(&self, queue: Q) -> Result<Option<QueueStats>, Error>
    where
        Q: AsRef<str>,
    {
        let mut conn = self.pool.acquire().await?;
        let reply = conn.exec(&commands::qstat(queue.as_ref())).await?;
        stats_from_reply(reply)
    }
}
