//! JSON-lines transport between the host and a content process.
//!
//! Each stdin line is one [`Envelope`](ciska_message::Envelope). Each stdout
//! line is either a reply (`{"id":..,"payload":..}`) or a host event
//! (`{"channel":..,"payload":..}`).
//!
//! Lines are read as raw bytes. A line that is not UTF-8, or that is longer
//! than [`MAX_LINE_BYTES`], is answered with a `malformedMessage` reply
//! (id 0) and the loop keeps going.

use ciska_common::{Event, Result};
use ciska_message::{ApiError, ApiResponse, FilePicker, Host, Reply, UseCases};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast;

pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Serve envelopes from `reader` until EOF, forwarding host events to
/// `writer` in between.
pub async fn run<U, P, R, W>(host: &Host<U, P>, reader: R, writer: W) -> Result<()>
where
    U: UseCases,
    P: FilePicker,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    run_with_limit(host, reader, writer, MAX_LINE_BYTES).await
}

async fn run_with_limit<U, P, R, W>(
    host: &Host<U, P>,
    mut reader: R,
    mut writer: W,
    max_line: usize,
) -> Result<()>
where
    U: UseCases,
    P: FilePicker,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut events = host.events().subscribe();
    let mut events_open = true;
    let mut handled: u64 = 0;
    let mut buf: Vec<u8> = Vec::new();
    // Set while skipping the tail of an oversized line.
    let mut discarding = false;

    loop {
        // Partial reads stay in `buf` if the event branch wins the race.
        let budget = (max_line + 1).saturating_sub(buf.len()).max(1) as u64;
        let mut limited = (&mut reader).take(budget);
        tokio::select! {
            read = limited.read_until(b'\n', &mut buf) => {
                let eof = read? == 0;
                let complete = buf.last() == Some(&b'\n');

                if discarding {
                    if complete || eof {
                        discarding = false;
                    }
                    buf.clear();
                } else if !complete && !eof && buf.len() > max_line {
                    tracing::warn!(limit = max_line, "line rejected: too long");
                    let reply = reject(format!("line exceeds {max_line} bytes"));
                    write_line(&mut writer, &reply).await?;
                    discarding = true;
                    buf.clear();
                } else if complete || (eof && !buf.is_empty()) {
                    let reply = match std::str::from_utf8(&buf) {
                        Ok(text) if text.trim().is_empty() => None,
                        Ok(text) => Some(host.handle_text(text.trim()).await),
                        Err(e) => {
                            tracing::warn!(
                                body_len = buf.len(),
                                error = %e,
                                "line rejected: not UTF-8"
                            );
                            Some(reject(format!("line is not valid UTF-8: {e}")))
                        }
                    };
                    buf.clear();
                    if let Some(reply) = reply {
                        write_line(&mut writer, &reply).await?;
                        handled += 1;
                    }
                }

                if eof {
                    break;
                }
            }
            event = events.recv(), if events_open => {
                match event {
                    Ok(event) => write_event(&mut writer, &event).await?,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "stdout fell behind host events");
                    }
                    Err(broadcast::error::RecvError::Closed) => events_open = false,
                }
            }
        }
    }

    tracing::info!(handled, "stdin closed");
    Ok(())
}

fn reject(reason: String) -> String {
    Reply {
        id: 0,
        payload: ApiResponse::Error(ApiError::malformed(reason)),
    }
    .to_json()
}

async fn write_event<W: AsyncWrite + Unpin>(writer: &mut W, event: &Event) -> Result<()> {
    let line = serde_json::to_string(event)?;
    write_line(writer, &line).await
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
