use std::borrow::Borrow;
use std::time::Duration;

use super::Client;
use crate::commands;
use crate::job::{jobs_from_reply, AddOptions, GetOptions, Job};
use crate::resp::Reply;
use crate::Error;

impl Client {
    /// Enqueue a job.
    ///
    /// `timeout` is how long the broker may block before confirming the
    /// requested replication level; it is sent in milliseconds. On success
    /// returns the broker-assigned job id. Broker refusals (e.g. `NOREPL ...`
    /// on replication shortage, or `ERR ...` when the delay exceeds the TTL)
    /// come back as [`Error::Server`] with the broker text verbatim.
    pub async fn send_job<Q, B>(
        &self,
        queue: Q,
        body: B,
        timeout: Duration,
        opts: &AddOptions,
    ) -> Result<String, Error>
    where
        Q: AsRef<str>,
        B: AsRef<[u8]>,
    {
        let args = commands::add_job(queue.as_ref(), body.as_ref(), timeout, opts);
        let mut conn = self.pool.acquire().await?;
        match conn.exec(&args).await? {
            Reply::Simple(id) => Ok(id),
            Reply::Bulk(id) => Ok(String::from_utf8_lossy(&id).into_owned()),
            _ => Err(Error::UnexpectedReply {
                msg: "ADDJOB reply is not a job id",
            }),
        }
    }

    /// Enqueue a job with default options.
    pub async fn send_data<Q, B>(&self, queue: Q, body: B, timeout: Duration) -> Result<String, Error>
    where
        Q: AsRef<str>,
        B: AsRef<[u8]>,
    {
        self.send_job(queue, body, timeout, &AddOptions::default()).await
    }

    /// Consume jobs from one or more queues.
    ///
    /// Blocks until a job arrives, [`GetOptions::timeout`] expires, or
    /// immediately when [`GetOptions::no_hang`] is set; an exhausted wait
    /// returns an empty vector. The queue list is forwarded as given — the
    /// broker rejects an empty one with `ERR syntax error`.
    pub async fn fetch_jobs<Q>(&self, opts: &GetOptions, queues: &[Q]) -> Result<Vec<Job>, Error>
    where
        Q: AsRef<str>,
    {
        let args = commands::get_job(opts, queues);
        let mut conn = self.pool.acquire().await?;
        let reply = conn.exec(&args).await?;
        jobs_from_reply(reply, opts.with_counters)
    }

    /// Consume a single job from a queue, without blocking.
    ///
    /// Returns `None` when the queue has no job ready.
    pub async fn fetch_job<Q>(&self, queue: Q) -> Result<Option<Job>, Error>
    where
        Q: AsRef<str>,
    {
        let opts = GetOptions {
            count: 1,
            no_hang: true,
            ..Default::default()
        };
        let mut jobs = self.fetch_jobs(&opts, &[queue.as_ref()]).await?;
        Ok(jobs.pop())
    }

    /// Acknowledge numerous jobs, permitting the broker to discard them.
    ///
    /// The acknowledgement propagates to other nodes that may hold copies.
    /// This is a fire-and-forget send: only transport-level errors are
    /// surfaced, so treat acknowledgement as best-effort.
    pub async fn ack_jobs<J, I>(&self, jobs: J) -> Result<(), Error>
    where
        J: IntoIterator<Item = I>,
        I: Borrow<Job>,
    {
        let ids: Vec<String> = jobs.into_iter().map(|j| j.borrow().id.clone()).collect();
        if ids.is_empty() {
            return Ok(());
        }
        let mut conn = self.pool.acquire().await?;
        conn.send(&commands::ack_job(ids.iter())).await
    }

    /// Acknowledge a single job.
    ///
    /// To acknowledge numerous jobs in one frame, use [`Client::ack_jobs`].
    pub async fn ack_job(&self, job: &Job) -> Result<(), Error> {
        self.ack_jobs([job]).await
    }

    /// Acknowledge numerous jobs locally, skipping broker-to-broker
    /// propagation.
    ///
    /// Cheaper than [`Client::ack_jobs`]; copies held by other nodes are
    /// left to garbage collection. Fire-and-forget, like `ack_jobs`.
    pub async fn fast_ack_jobs<J, I>(&self, jobs: J) -> Result<(), Error>
    where
        J: IntoIterator<Item = I>,
        I: Borrow<Job>,
    {
        let ids: Vec<String> = jobs.into_iter().map(|j| j.borrow().id.clone()).collect();
        if ids.is_empty() {
            return Ok(());
        }
        let mut conn = self.pool.acquire().await?;
        conn.send(&commands::fast_ack(ids.iter())).await
    }

    /// Acknowledge a single job locally.
    pub async fn fast_ack_job(&self, job: &Job) -> Result<(), Error> {
        self.fast_ack_jobs([job]).await
    }

    /// Negatively acknowledge numerous jobs, asking the broker to requeue
    /// them for immediate redelivery and bump their nack counters.
    ///
    /// Fire-and-forget, like [`Client::ack_jobs`].
    pub async fn nack_jobs<J, I>(&self, jobs: J) -> Result<(), Error>
    where
        J: IntoIterator<Item = I>,
        I: Borrow<Job>,
    {
        let ids: Vec<String> = jobs.into_iter().map(|j| j.borrow().id.clone()).collect();
        if ids.is_empty() {
            return Ok(());
        }
        let mut conn = self.pool.acquire().await?;
        conn.send(&commands::nack(ids.iter())).await
    }

    /// Negatively acknowledge a single job.
    pub async fn nack_job(&self, job: &Job) -> Result<(), Error> {
        self.nack_jobs([job]).await
    }

    /// Tell the broker this job is still being worked on.
    ///
    /// Returns the window during which the consumer may assume no
    /// redelivery will occur.
    pub async fn report_working(&self, job: &Job) -> Result<Duration, Error> {
        let mut conn = self.pool.acquire().await?;
        match conn.exec(&commands::working(&job.id)).await? {
            Reply::Integer(secs) if secs >= 0 => Ok(Duration::from_secs(secs as u64)),
            _ => Err(Error::UnexpectedReply {
                msg: "WORKING reply is not a non-negative integer",
            }),
        }
    }
}
