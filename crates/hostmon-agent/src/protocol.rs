//! The ZBXD wire protocol.
//!
//! A framed message is the 5-byte header `ZBXD\x01`, an 8-byte signed
//! little-endian payload length, then the UTF-8 payload. Requests may also
//! arrive bare: raw key bytes terminated by the end of the stream. Responses
//! are always framed.

use crate::error::ProtocolError;
use std::fmt::Display;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const HEADER: &[u8; HEADER_LENGTH] = b"ZBXD\x01";
pub const HEADER_LENGTH: usize = 5;
const LENGTH_FIELD: usize = 8;

/// Largest request key accepted, in bytes.
pub const MAX_KEY_LENGTH: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, Default)]
pub struct ZbxdProtocol;

impl ZbxdProtocol {
    /// Reads one request key, framed or bare.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if the stream closes early, the frame is
    /// malformed or truncated, the key is too long, or it is not UTF-8.
    pub async fn receive_key<R>(&self, conn: &mut R) -> Result<String, ProtocolError>
    where
        R: AsyncRead + Unpin,
    {
        let mut head = [0u8; HEADER_LENGTH];
        let filled = read_up_to(conn, &mut head).await?;
        if filled == 0 {
            return Err(ProtocolError::EmptyRequest);
        }

        let payload = if &head[..filled] == HEADER.as_slice() {
            read_framed(conn).await?
        } else {
            let mut payload = head[..filled].to_vec();
            let limit = (MAX_KEY_LENGTH + 1 - payload.len()) as u64;
            (&mut *conn).take(limit).read_to_end(&mut payload).await?;
            if payload.len() > MAX_KEY_LENGTH {
                return Err(ProtocolError::KeyTooLong {
                    limit: MAX_KEY_LENGTH,
                });
            }
            payload
        };

        Ok(String::from_utf8(payload)?)
    }

    /// Reads a framed message, as a monitoring server reads a response.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MissingHeader`] if the stream does not start
    /// with the header, or any framing error of [`receive_key`](Self::receive_key).
    pub async fn receive_response<R>(&self, conn: &mut R) -> Result<String, ProtocolError>
    where
        R: AsyncRead + Unpin,
    {
        let mut head = [0u8; HEADER_LENGTH];
        let filled = read_up_to(conn, &mut head).await?;
        if filled < HEADER_LENGTH || head != *HEADER {
            return Err(ProtocolError::MissingHeader);
        }
        Ok(String::from_utf8(read_framed(conn).await?)?)
    }

    /// Writes `value` as a framed response.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Io`] if the connection fails before every
    /// byte is written.
    pub async fn send_response<W, V>(&self, conn: &mut W, value: &V) -> Result<(), ProtocolError>
    where
        W: AsyncWrite + Unpin,
        V: Display + ?Sized,
    {
        let frame = encode(&value.to_string());
        conn.write_all(&frame).await?;
        conn.flush().await?;
        Ok(())
    }
}

/// Frames `payload` as header, length and UTF-8 bytes.
///
/// # Examples
///
/// ```
/// use hostmon_agent::protocol::encode;
///
/// let frame = encode("1");
/// assert_eq!(&frame[..5], b"ZBXD\x01");
/// assert_eq!(&frame[5..13], &1i64.to_le_bytes());
/// assert_eq!(&frame[13..], b"1");
/// ```
pub fn encode(payload: &str) -> Vec<u8> {
    let bytes = payload.as_bytes();
    let mut frame = Vec::with_capacity(HEADER_LENGTH + LENGTH_FIELD + bytes.len());
    frame.extend_from_slice(HEADER);
    frame.extend_from_slice(&(bytes.len() as i64).to_le_bytes());
    frame.extend_from_slice(bytes);
    frame
}

/// Reads the length field and payload of a framed message whose header has
/// already been consumed.
async fn read_framed<R>(conn: &mut R) -> Result<Vec<u8>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut length = [0u8; LENGTH_FIELD];
    if read_up_to(conn, &mut length).await? < LENGTH_FIELD {
        return Err(ProtocolError::TruncatedLength);
    }

    let length = i64::from_le_bytes(length);
    let expected = usize::try_from(length).map_err(|_| ProtocolError::InvalidLength(length))?;
    if expected > MAX_KEY_LENGTH {
        return Err(ProtocolError::KeyTooLong {
            limit: MAX_KEY_LENGTH,
        });
    }

    let mut payload = Vec::with_capacity(expected);
    (&mut *conn).take(expected as u64).read_to_end(&mut payload).await?;
    if payload.len() < expected {
        return Err(ProtocolError::TruncatedPayload {
            expected,
            received: payload.len(),
        });
    }
    Ok(payload)
}

/// Fills `buf` until it is full or the stream ends; returns the byte count.
async fn read_up_to<R>(conn: &mut R, buf: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = conn.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
