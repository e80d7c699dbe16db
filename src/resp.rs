use std::future::Future;
use std::pin::Pin;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::Error;

/// One RESP reply frame, as sent by the broker.
///
/// Both the null bulk string (`$-1`) and the null array (`*-1`) decode
/// to [`Reply::Nil`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Reply {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Vec<u8>),
    Array(Vec<Reply>),
    Nil,
}

/// Appends one RESP request frame (an array of bulk strings) to `out`.
///
/// Encoding is deterministic: identical `args` produce identical bytes.
pub(crate) fn encode_command(args: &[Vec<u8>], out: &mut Vec<u8>) {
    out.push(b'*');
    out.extend_from_slice(args.len().to_string().as_bytes());
    out.extend_from_slice(b"\r\n");
    for arg in args {
        out.push(b'$');
        out.extend_from_slice(arg.len().to_string().as_bytes());
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(arg);
        out.extend_from_slice(b"\r\n");
    }
}

/// Reads exactly one reply frame from the stream.
///
/// Boxed so that nested arrays (e.g. GETJOB and QSTAT replies) can be
/// read recursively.
pub(crate) fn read_reply<'a, R>(
    reader: &'a mut R,
) -> Pin<Box<dyn Future<Output = Result<Reply, Error>> + Send + 'a>>
where
    R: AsyncBufRead + Unpin + Send,
{
    Box::pin(async move {
        let mut line = Vec::with_capacity(32);
        read_line(reader, &mut line).await?;
        if line.is_empty() {
            return Err(Error::Protocol { msg: "empty reply line" });
        }
        match line[0] {
            b'+' => Ok(Reply::Simple(decode_text(&line[1..]))),
            b'-' => Ok(Reply::Error(decode_text(&line[1..]))),
            b':' => Ok(Reply::Integer(parse_int(&line[1..])?)),
            b'$' => {
                let len = parse_int(&line[1..])?;
                if len < 0 {
                    return Ok(Reply::Nil);
                }
                let mut data = vec![0u8; len as usize];
                reader.read_exact(&mut data).await?;
                let mut crlf = [0u8; 2];
                reader.read_exact(&mut crlf).await?;
                if crlf != *b"\r\n" {
                    return Err(Error::Protocol { msg: "bulk string not CRLF terminated" });
                }
                Ok(Reply::Bulk(data))
            }
            b'*' => {
                let len = parse_int(&line[1..])?;
                if len < 0 {
                    return Ok(Reply::Nil);
                }
                let mut items = Vec::with_capacity(len as usize);
                for _ in 0..len {
                    items.push(read_reply(reader).await?);
                }
                Ok(Reply::Array(items))
            }
            _ => Err(Error::Protocol { msg: "unknown reply type byte" }),
        }
    })
}

async fn read_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> Result<(), Error>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let n = reader.read_until(b'\n', buf).await?;
    if n == 0 {
        return Err(Error::Protocol { msg: "unexpected end of stream" });
    }
    if buf.len() < 2 || buf[buf.len() - 2] != b'\r' {
        return Err(Error::Protocol { msg: "reply line not CRLF terminated" });
    }
    buf.truncate(buf.len() - 2);
    Ok(())
}

fn decode_text(data: &[u8]) -> String {
    String::from_utf8_lossy(data).into_owned()
}

fn parse_int(data: &[u8]) -> Result<i64, Error> {
    std::str::from_utf8(data)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(Error::Protocol { msg: "malformed integer" })
}
