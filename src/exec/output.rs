// src/exec/output.rs

//! Forwarding of child stdout/stderr to the console.

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::types::ProcessRole;

/// Copy `reader` to `writer` line by line, terminating each line with `\n`.
///
/// Bytes that are not valid UTF-8 are replaced, never rejected. Returns the
/// number of lines forwarded.
///
/// The reader is always drained to end of stream, even after a read or write
/// error: closing a child's pipe early would kill it with `SIGPIPE` on its
/// next write. After a write error the remaining lines are discarded; after a
/// read error the rest of the stream goes to a sink.
pub async fn drain_lines<R, W>(reader: R, mut writer: W, stream: &'static str) -> u64
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut forwarded = 0u64;
    let mut writable = true;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                if !writable {
                    continue;
                }
                match write_line(&mut writer, &buf).await {
                    Ok(()) => forwarded += 1,
                    Err(e) => {
                        warn!(stream, error = %e, "failed to write process output; discarding the rest");
                        writable = false;
                    }
                }
            }
            Err(e) => {
                warn!(stream, error = %e, "error reading process output");
                if let Err(e) = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await {
                    debug!(stream, error = %e, "stream unreadable; giving up");
                }
                break;
            }
        }
    }

    forwarded
}

/// Write one raw line (terminator included or not) as lossy UTF-8 plus `\n`.
async fn write_line<W>(writer: &mut W, raw: &[u8]) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);

    let mut line = String::from_utf8_lossy(raw).into_owned();
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    // Keep interleaving with our own log lines sensible.
    writer.flush().await
}

/// Spawn a detached task draining one output stream of a process to stdout.
///
/// The task is not joined by anything; it ends when the stream closes.
pub fn spawn_drain<R>(
    reader: R,
    stream: &'static str,
    role: ProcessRole,
    pid: Option<u32>,
) -> JoinHandle<u64>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let lines = drain_lines(reader, tokio::io::stdout(), stream).await;
        debug!(%role, ?pid, stream, lines, "output stream closed");
        lines
    })
}
