// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Socket framing for wire messages
//!
//! Each frame is a 4-byte big-endian length followed by one JSON wire
//! message.

use std::time::Duration;

use mplane_core::{wire, Message, Registries};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest frame accepted from a peer
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Protocol errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Timed out")]
    Timeout,

    #[error("Message too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("Invalid message: {0}")]
    Invalid(#[from] mplane_core::Error),

    #[error("Failed to encode message: {0}")]
    Encode(#[from] mplane_core::ParseError),

    #[error("Invalid UTF-8 in message")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Encode a message as JSON, without the length prefix
pub fn encode(message: &Message) -> Result<Vec<u8>, ProtocolError> {
    Ok(wire::to_string(message)?.into_bytes())
}

/// Decode a JSON wire message, without the length prefix
pub fn decode(registries: &Registries, bytes: &[u8]) -> Result<Message, ProtocolError> {
    let text = std::str::from_utf8(bytes)?;
    Ok(wire::from_str(registries, text)?)
}

/// Read one length-prefixed frame
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut len_bytes = [0u8; 4];
    match reader.read_exact(&mut len_bytes).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ProtocolError::ConnectionClosed)
        }
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_be_bytes(len_bytes) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::TooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }

    let mut buffer = vec![0u8; len];
    reader.read_exact(&mut buffer).await?;
    Ok(buffer)
}

/// Write one length-prefixed frame
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    data: &[u8],
) -> Result<(), ProtocolError> {
    if data.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::TooLarge {
            size: data.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }
    let len = data.len() as u32;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

/// Read and decode a request within `timeout`
pub async fn read_request<R: AsyncRead + Unpin>(
    reader: &mut R,
    registries: &Registries,
    timeout: Duration,
) -> Result<Message, ProtocolError> {
    let bytes = tokio::time::timeout(timeout, read_message(reader))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    decode(registries, &bytes)
}

/// Encode and write a reply within `timeout`
pub async fn write_reply<W: AsyncWrite + Unpin>(
    writer: &mut W,
    message: &Message,
    timeout: Duration,
) -> Result<(), ProtocolError> {
    let bytes = encode(message)?;
    tokio::time::timeout(timeout, write_message(writer, &bytes))
        .await
        .map_err(|_| ProtocolError::Timeout)?
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
