use std::time::Duration;

use crate::job::{AddOptions, GetOptions};

// The broker mixes required positional arguments with optional keyword
// flags, some bare (ASYNC, NOHANG) and some valued (DELAY 30). Argument
// order is significant, so each command gets its own builder instead of a
// generic options-to-args projection.

fn push_uint(args: &mut Vec<Vec<u8>>, value: u64) {
    args.push(value.to_string().into_bytes());
}

pub(crate) fn add_job(
    queue: &str,
    body: &[u8],
    timeout: Duration,
    opts: &AddOptions,
) -> Vec<Vec<u8>> {
    let mut args = vec![
        b"ADDJOB".to_vec(),
        queue.as_bytes().to_vec(),
        body.to_vec(),
    ];
    push_uint(&mut args, timeout.as_millis() as u64);
    if opts.max_len > 0 {
        args.push(b"MAXLEN".to_vec());
        push_uint(&mut args, opts.max_len);
    }
    if opts.replicate > 0 {
        args.push(b"REPLICATE".to_vec());
        push_uint(&mut args, u64::from(opts.replicate));
    }
    if opts.replicate_async {
        args.push(b"ASYNC".to_vec());
    }
    // Valued flags below carry whole seconds; sub-second settings are
    // dropped rather than rounded up.
    if opts.delay >= Duration::from_secs(1) {
        args.push(b"DELAY".to_vec());
        push_uint(&mut args, opts.delay.as_secs());
    }
    if opts.retry >= Duration::from_secs(1) {
        args.push(b"RETRY".to_vec());
        push_uint(&mut args, opts.retry.as_secs());
    }
    if opts.ttl >= Duration::from_secs(1) {
        args.push(b"TTL".to_vec());
        push_uint(&mut args, opts.ttl.as_secs());
    }
    args
}

pub(crate) fn get_job<Q>(opts: &GetOptions, queues: &[Q]) -> Vec<Vec<u8>>
where
    Q: AsRef<str>,
{
    let mut args = vec![b"GETJOB".to_vec()];
    if opts.count > 0 {
        args.push(b"COUNT".to_vec());
        push_uint(&mut args, opts.count as u64);
    }
    if opts.no_hang {
        args.push(b"NOHANG".to_vec());
    }
    if opts.timeout >= Duration::from_millis(1) {
        args.push(b"TIMEOUT".to_vec());
        push_uint(&mut args, opts.timeout.as_millis() as u64);
    }
    if opts.with_counters {
        args.push(b"WITHCOUNTERS".to_vec());
    }
    args.push(b"FROM".to_vec());
    for queue in queues {
        args.push(queue.as_ref().as_bytes().to_vec());
    }
    args
}

fn id_list(verb: &[u8], ids: impl Iterator<Item = impl AsRef<str>>) -> Vec<Vec<u8>> {
    let mut args = vec![verb.to_vec()];
    for id in ids {
        args.push(id.as_ref().as_bytes().to_vec());
    }
    args
}

pub(crate) fn ack_job(ids: impl Iterator<Item = impl AsRef<str>>) -> Vec<Vec<u8>> {
    id_list(b"ACKJOB", ids)
}

pub(crate) fn fast_ack(ids: impl Iterator<Item = impl AsRef<str>>) -> Vec<Vec<u8>> {
    id_list(b"FASTACK", ids)
}

pub(crate) fn nack(ids: impl Iterator<Item = impl AsRef<str>>) -> Vec<Vec<u8>> {
    id_list(b"NACK", ids)
}

pub(crate) fn working(id: &str) -> Vec<Vec<u8>> {
    vec![b"WORKING".to_vec(), id.as_bytes().to_vec()]
}

pub(crate) fn qlen(queue: &str) -> Vec<Vec<u8>> {
    vec![b"QLEN".to_vec(), queue.as_bytes().to_vec()]
}

pub(crate) fn qstat(queue: &str) -> Vec<Vec<u8>> {
    vec![b"QSTAT".to_vec(), queue.as_bytes().to_vec()]
}

pub(crate) fn ping() -> Vec<Vec<u8>> {
    vec![b"PING".to_vec()]
}
