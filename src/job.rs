use std::time::Duration;

use crate::resp::Reply;
use crate::Error;

/// One unit of work consumed from a queue.
///
/// A job is a plain value: it carries no handle to the connection it
/// arrived on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Queue this job was consumed from.
    pub queue: String,

    /// Broker-assigned job identifier, unique per cluster.
    pub id: String,

    /// Opaque payload; the broker imposes no structure on it.
    pub body: Vec<u8>,

    /// Negative acknowledgements observed for this job across deliveries.
    ///
    /// Meaningful only when the consuming call set
    /// [`GetOptions::with_counters`]; zero otherwise.
    pub nacks: i64,

    /// Redeliveries beyond the first.
    ///
    /// Meaningful only when the consuming call set
    /// [`GetOptions::with_counters`]; zero otherwise.
    pub additional_deliveries: i64,
}

/// Producer-side options for enqueueing a job.
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Let the broker reply as soon as the job is accepted locally,
    /// without waiting for the requested replication level.
    pub replicate_async: bool,

    /// Defer the first delivery by this long.
    ///
    /// Whole-second resolution; settings below one second are not sent.
    pub delay: Duration,

    /// Interval after which the broker may redeliver an unacknowledged job.
    ///
    /// Whole-second resolution; settings below one second are not sent.
    pub retry: Duration,

    /// Upper bound on the job's lifetime.
    ///
    /// Whole-second resolution; settings below one second are not sent.
    pub ttl: Duration,

    /// Refuse the add if the target queue would grow beyond this length.
    /// Zero means unset.
    pub max_len: u64,

    /// Required replication factor. Zero means the broker default.
    pub replicate: u16,
}

/// Consumer-side options for fetching jobs.
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    /// Maximum jobs to return in one call. Zero means the broker
    /// default of one.
    pub count: usize,

    /// Return immediately with an empty result when no job is available,
    /// instead of blocking.
    pub no_hang: bool,

    /// Maximum time to block waiting for a job.
    ///
    /// Millisecond resolution; settings below one millisecond are not sent.
    pub timeout: Duration,

    /// Request per-delivery counters alongside each job.
    pub with_counters: bool,
}

impl Job {
    /// Decodes one per-job element of a GETJOB reply.
    ///
    /// The element is `[queue, id, body]`, or with counters
    /// `[queue, id, body, "nacks", n, "additional-deliveries", m]` with
    /// the counter integers at positions 4 and 6.
    pub(crate) fn from_reply(reply: Reply, with_counters: bool) -> Result<Job, Error> {
        let fields = match reply {
            Reply::Array(fields) => fields,
            _ => {
                return Err(Error::UnexpectedReply {
                    msg: "job element is not an array",
                })
            }
        };
        let expected = if with_counters { 7 } else { 3 };
        if fields.len() != expected {
            return Err(Error::UnexpectedReply {
                msg: "job element has the wrong number of fields",
            });
        }
        let mut fields = fields.into_iter();
        let queue = bulk_text(fields.next(), "job queue is not a bulk string")?;
        let id = bulk_text(fields.next(), "job id is not a bulk string")?;
        let body = match fields.next() {
            Some(Reply::Bulk(data)) => data,
            _ => {
                return Err(Error::UnexpectedReply {
                    msg: "job body is not a bulk string",
                })
            }
        };
        let mut job = Job {
            queue,
            id,
            body,
            nacks: 0,
            additional_deliveries: 0,
        };
        if with_counters {
            fields.next(); // "nacks" label
            job.nacks = integer(fields.next(), "nacks counter is not an integer")?;
            fields.next(); // "additional-deliveries" label
            job.additional_deliveries =
                integer(fields.next(), "additional-deliveries counter is not an integer")?;
        }
        Ok(job)
    }
}

/// Decodes a full GETJOB reply into jobs.
///
/// A nil reply (no job available under NOHANG, or the timeout expired)
/// decodes to an empty vector with no error.
pub(crate) fn jobs_from_reply(reply: Reply, with_counters: bool) -> Result<Vec<Job>, Error> {
    let rows = match reply {
        Reply::Nil => return Ok(Vec::new()),
        Reply::Array(rows) => rows,
        _ => {
            return Err(Error::UnexpectedReply {
                msg: "GETJOB reply is neither nil nor an array",
            })
        }
    };
    rows.into_iter()
        .map(|row| Job::from_reply(row, with_counters))
        .collect()
}

fn bulk_text(field: Option<Reply>, msg: &'static str) -> Result<String, Error> {
    match field {
        Some(Reply::Bulk(data)) => Ok(String::from_utf8_lossy(&data).into_owned()),
        _ => Err(Error::UnexpectedReply { msg }),
    }
}

fn integer(field: Option<Reply>, msg: &'static str) -> Result<i64, Error> {
    match field {
        Some(Reply::Integer(value)) => Ok(value),
        _ => Err(Error::UnexpectedReply { msg }),
    }
}
