//! Newline-delimited JSON-RPC framing for MCP mode.

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info};

use super::handler::handle_mcp_request;
use super::protocol::{error_codes, Request, Response};
use crate::AppState;

/// Decode one frame. Unparseable input gets a PARSE_ERROR reply with a null id.
async fn answer(line: &str, state: &AppState) -> Option<Response> {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => handle_mcp_request(request, state.clone()).await,
        Err(e) => {
            error!(error = %e, "JSON parse error");
            Some(Response::error(
                Value::Null,
                error_codes::PARSE_ERROR,
                format!("Parse error: {}", e),
            ))
        }
    }
}

/// Serve requests from `reader` until EOF, writing one response line per
/// request. Notifications produce no output.
pub async fn serve<R, W>(state: AppState, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        debug!("Received: {}", line);

        let Some(response) = answer(line, &state).await else {
            continue;
        };
        let encoded = match serde_json::to_string(&response) {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "failed to encode response");
                continue;
            }
        };
        debug!("Sending: {}", encoded);
        writer.write_all(encoded.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    info!("EOF received, shutting down MCP server");
    Ok(())
}
