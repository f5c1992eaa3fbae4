//! Newline-delimited JSON-RPC over a byte stream (stdin/stdout in production).
//!
//! Each request runs in its own task so a slow Designer call does not hold
//! up `ping` or `tools/list`. Responses are written by this loop alone, one
//! JSON object per line, in completion order.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::dispatch::McpServer;
use crate::types::JsonRpcResponse;

/// Serve MCP over `reader`/`writer` until EOF or `shutdown`.
///
/// After EOF, responses for requests already in flight are still written
/// unless `shutdown` fires first.
pub async fn serve<R, W>(
    reader: R,
    mut writer: W,
    server: McpServer,
    shutdown: CancellationToken,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let (tx, mut rx) = mpsc::unbounded_channel::<JsonRpcResponse>();

    info!("MCP stdio loop started");

    loop {
        tokio::select! {
            () = shutdown.cancelled() => {
                info!("MCP stdio loop cancelled");
                return writer.flush().await;
            }
            Some(response) = rx.recv() => {
                write_response(&mut writer, &response).await?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("MCP input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let server = server.clone();
                let tx = tx.clone();
                drop(tokio::spawn(async move {
                    if let Some(response) = server.handle_line(&line).await {
                        let _ = tx.send(response);
                    }
                }));
            }
        }
    }

    drop(tx);
    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            response = rx.recv() => match response {
                Some(response) => write_response(&mut writer, &response).await?,
                None => break,
            },
        }
    }
    writer.flush().await
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &JsonRpcResponse,
) -> std::io::Result<()> {
    let mut line = match serde_json::to_string(response) {
        Ok(line) => line,
        Err(e) => {
            warn!(error = %e, "failed to serialize MCP response");
            return Ok(());
        }
    };
    if let Some(id) = &response.id {
        debug!(request_id = %id, "writing MCP response");
    }
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await
}
