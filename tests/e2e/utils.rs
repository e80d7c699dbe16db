use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

lazy_static::lazy_static! {
    pub(crate) static ref DISQUE_URL: String = {
        let var_name =
            std::env::var("DISQUE_PROVIDER").unwrap_or_else(|_| "DISQUE_URL".to_string());
        std::env::var(var_name).unwrap_or_else(|_| "127.0.0.1:7711".to_string())
    };
}

pub(crate) const JOB_ID: &str = "DI0f0c644fd3ccb51c2cedbd47fcb6f312646c993c05a0SQ";

pub(crate) type Command = Vec<Vec<u8>>;

type Script = Arc<dyn Fn(usize, &Command) -> Vec<u8> + Send + Sync>;

/// In-process broker speaking just enough RESP for the tests: it accepts
/// connections, decodes request frames, records them, and answers with
/// whatever the script returns. An empty script result closes the
/// connection without replying.
pub(crate) struct Broker {
    pub(crate) addr: String,
    commands: Arc<Mutex<Vec<Command>>>,
    connections: Arc<AtomicUsize>,
}

impl Broker {
    pub(crate) async fn spawn<F>(script: F) -> Broker
    where
        F: Fn(usize, &Command) -> Vec<u8> + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr").to_string();
        let commands: Arc<Mutex<Vec<Command>>> = Arc::default();
        let connections = Arc::new(AtomicUsize::new(0));
        let script: Script = Arc::new(script);
        let seen = commands.clone();
        let dials = connections.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                dials.fetch_add(1, Ordering::SeqCst);
                let script = script.clone();
                let seen = seen.clone();
                tokio::spawn(serve(stream, script, seen));
            }
        });
        Broker {
            addr,
            commands,
            connections,
        }
    }

    /// Every command observed so far, across all connections, as text.
    pub(crate) fn commands(&self) -> Vec<Vec<String>> {
        self.commands
            .lock()
            .expect("commands mutex poisoned")
            .iter()
            .map(|cmd| {
                cmd.iter()
                    .map(|arg| String::from_utf8_lossy(arg).into_owned())
                    .collect()
            })
            .collect()
    }

    pub(crate) fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Waits until a command with this verb has been observed.
    ///
    /// Needed for fire-and-forget sends, where the client returns before
    /// the broker has necessarily read the frame.
    pub(crate) async fn wait_for_verb(&self, verb: &str) -> Vec<String> {
        for _ in 0..200 {
            if let Some(cmd) = self.commands().into_iter().find(|cmd| cmd[0] == verb) {
                return cmd;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("broker never saw a {} command", verb);
    }
}

async fn serve(stream: TcpStream, script: Script, seen: Arc<Mutex<Vec<Command>>>) {
    let mut reader = BufReader::new(stream);
    while let Some(command) = read_command(&mut reader).await {
        let response = {
            let mut seen = seen.lock().expect("commands mutex poisoned");
            let index = seen.len();
            seen.push(command.clone());
            script(index, &command)
        };
        if response.is_empty() {
            break;
        }
        if reader.get_mut().write_all(&response).await.is_err() {
            break;
        }
    }
}

async fn read_command(reader: &mut BufReader<TcpStream>) -> Option<Command> {
    let mut line = Vec::new();
    read_line(reader, &mut line).await?;
    if line.first() != Some(&b'*') {
        return None;
    }
    let count: usize = std::str::from_utf8(&line[1..]).ok()?.parse().ok()?;
    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        read_line(reader, &mut line).await?;
        if line.first() != Some(&b'$') {
            return None;
        }
        let len: usize = std::str::from_utf8(&line[1..]).ok()?.parse().ok()?;
        let mut data = vec![0u8; len];
        reader.read_exact(&mut data).await.ok()?;
        let mut crlf = [0u8; 2];
        reader.read_exact(&mut crlf).await.ok()?;
        args.push(data);
    }
    Some(args)
}

async fn read_line(reader: &mut BufReader<TcpStream>, buf: &mut Vec<u8>) -> Option<()> {
    buf.clear();
    let n = reader.read_until(b'\n', buf).await.ok()?;
    if n == 0 {
        return None;
    }
    if buf.len() < 2 || buf[buf.len() - 2] != b'\r' {
        return None;
    }
    buf.truncate(buf.len() - 2);
    Some(())
}

// Reply frame builders for broker scripts.

pub(crate) fn simple(text: &str) -> Vec<u8> {
    format!("+{}\r\n", text).into_bytes()
}

pub(crate) fn error(text: &str) -> Vec<u8> {
    format!("-{}\r\n", text).into_bytes()
}

pub(crate) fn integer(value: i64) -> Vec<u8> {
    format!(":{}\r\n", value).into_bytes()
}

pub(crate) fn bulk(data: &[u8]) -> Vec<u8> {
    let mut frame = format!("${}\r\n", data.len()).into_bytes();
    frame.extend_from_slice(data);
    frame.extend_from_slice(b"\r\n");
    frame
}

pub(crate) fn array(items: &[Vec<u8>]) -> Vec<u8> {
    let mut frame = format!("*{}\r\n", items.len()).into_bytes();
    for item in items {
        frame.extend_from_slice(item);
    }
    frame
}

pub(crate) fn nil_array() -> Vec<u8> {
    b"*-1\r\n".to_vec()
}

/// Wipes all jobs and queues on a live broker. Test-harness only.
pub(crate) async fn flush_all(addr: &str) -> std::io::Result<()> {
    let mut stream = TcpStream::connect(addr).await?;
    stream
        .write_all(b"*2\r\n$5\r\nDEBUG\r\n$8\r\nFLUSHALL\r\n")
        .await?;
    let mut reply = [0u8; 64];
    let _ = stream.read(&mut reply).await?;
    Ok(())
}
