// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Socket server and connection handling.

use std::sync::Arc;
use std::time::Duration;

use mplane_core::{Clock, Exception, Message, Registries};
use mplane_engine::Scheduler;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::UnixStream;
use tracing::{debug, error, warn};

use crate::protocol::{self, ProtocolError};

/// Identity of a peer connected over a Unix socket
pub fn peer_identity(stream: &UnixStream) -> Result<String, ServerError> {
    let cred = stream.peer_cred().map_err(ServerError::Credentials)?;
    Ok(format!("uid:{}", cred.uid()))
}

/// Handle a single client connection
///
/// One request and one reply per connection.
pub async fn handle_connection<C: Clock>(
    scheduler: Arc<Scheduler<C>>,
    registries: Registries,
    stream: UnixStream,
    timeout: Duration,
) -> Result<(), ServerError> {
    let identity = peer_identity(&stream)?;
    let (mut reader, mut writer) = stream.into_split();
    serve(&scheduler, &registries, &identity, &mut reader, &mut writer, timeout).await
}

/// Read one request, hand it to the scheduler and write the reply
pub async fn serve<C, R, W>(
    scheduler: &Scheduler<C>,
    registries: &Registries,
    identity: &str,
    reader: &mut R,
    writer: &mut W,
    timeout: Duration,
) -> Result<(), ServerError>
where
    C: Clock,
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let reply = match protocol::read_request(reader, registries, timeout).await {
        Ok(request) => {
            debug!(kind = request.kind(), token = ?request.token(), %identity, "Received request");
            scheduler.receive_message(identity, request)
        }
        Err(ProtocolError::Timeout) => {
            error!("Request read timeout");
            return Err(ServerError::Timeout);
        }
        Err(ProtocolError::ConnectionClosed) => {
            debug!("Client disconnected before sending request");
            return Ok(());
        }
        Err(e @ (ProtocolError::Invalid(_) | ProtocolError::Utf8(_))) => {
            // Malformed requests still get an answer
            warn!(error = %e, %identity, "Rejecting malformed request");
            Message::Exception(Exception::new(None, e.to_string()))
        }
        Err(e) => {
            error!("Failed to read request: {}", e);
            return Err(ServerError::Protocol(e));
        }
    };

    debug!(kind = reply.kind(), token = ?reply.token(), "Sending reply");

    protocol::write_reply(writer, &reply, timeout)
        .await
        .map_err(ServerError::Protocol)?;

    Ok(())
}

/// Server errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Request timeout")]
    Timeout,

    #[error("Failed to read peer credentials: {0}")]
    Credentials(#[source] std::io::Error),
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
