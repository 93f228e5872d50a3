//! Stdin/stdout JSON bridge.
//!
//! Reads newline-delimited JSON `CommandEnvelope` messages, dispatches each
//! through [`HostHandler`], and writes one `ResponseEnvelope` line per
//! command. Stdout is reserved for the protocol; diagnostics go to stderr.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

use crate::error::{LookbookError, Result};
use crate::host::contract::{CommandEnvelope, CommandName, ResponseEnvelope};
use crate::host::handler::HostHandler;

/// Run the bridge on the process stdin/stdout until EOF or `runtime.stop`.
pub async fn run_stdio_bridge(handler: &HostHandler) -> Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    let writer = BufWriter::new(tokio::io::stdout());
    run_bridge(handler, reader, writer).await
}

/// Run the bridge over any line reader and writer.
///
/// Commands are handled one at a time, in arrival order.
pub async fn run_bridge<R, W>(handler: &HostHandler, mut reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader
            .read_line(&mut line)
            .await
            .map_err(|e| LookbookError::Protocol(format!("failed to read command: {e}")))?;

        if bytes_read == 0 {
            tracing::info!("input closed (EOF); shutting down host bridge");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let envelope: CommandEnvelope = match serde_json::from_str(trimmed) {
            Ok(env) => env,
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse command envelope");
                let response = ResponseEnvelope::error(
                    "parse-error",
                    format!("failed to parse command envelope: {e}"),
                );
                write_response(&mut writer, &response).await?;
                continue;
            }
        };

        let is_stop = envelope.command == CommandName::RuntimeStop;
        let response = handler.handle(&envelope).await;
        write_response(&mut writer, &response).await?;

        if is_stop {
            tracing::info!("runtime.stop received; shutting down host bridge");
            break;
        }
    }

    Ok(())
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &ResponseEnvelope,
) -> Result<()> {
    let json = serde_json::to_string(response)
        .map_err(|e| LookbookError::Protocol(format!("failed to serialize response: {e}")))?;
    writer
        .write_all(json.as_bytes())
        .await
        .map_err(|e| LookbookError::Protocol(format!("failed to write response: {e}")))?;
    writer
        .write_all(b"\n")
        .await
        .map_err(|e| LookbookError::Protocol(format!("failed to write newline: {e}")))?;
    writer
        .flush()
        .await
        .map_err(|e| LookbookError::Protocol(format!("failed to flush output: {e}")))?;
    Ok(())
}
