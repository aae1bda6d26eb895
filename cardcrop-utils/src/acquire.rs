//! Length-prefixed image requests to the wrist camera module.
//!
//! The camera answers a single trigger byte with a little-endian `u32` payload
//! length followed by that many JPEG bytes. There is no acknowledgement, retry
//! or checksum: a transfer either completes or stops at the first read that
//! times out, and the caller is told how much arrived.

use std::io::{self, Read, Write};

use log::{debug, warn};
use thiserror::Error;

/// Byte that asks the camera for a frame.
pub const DEFAULT_TRIGGER: u8 = b'R';
/// Largest single read issued while receiving the payload.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

const HEADER_LEN: usize = 4;

/// Per-request framing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionConfig {
    pub trigger: u8,
    /// Upper bound for each payload read (clamped to at least one byte).
    pub chunk_size: usize,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            trigger: DEFAULT_TRIGGER,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Conditions a request can end in besides a complete payload.
#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("timed out waiting for the image length header")]
    Timeout,
    #[error("incomplete length header: received {received} of 4 bytes")]
    MissingHeader { received: usize },
    #[error("short read: expected {expected} bytes, received {}", .partial.len())]
    ShortRead { expected: usize, partial: Vec<u8> },
    #[error("serial I/O failed: {0}")]
    Io(#[from] io::Error),
}

impl AcquireError {
    /// Bytes that did arrive before a short read, if any.
    pub fn into_partial(self) -> Option<Vec<u8>> {
        match self {
            AcquireError::ShortRead { partial, .. } => Some(partial),
            _ => None,
        }
    }
}

/// Request one image over `port` and return its payload.
///
/// Every read is bounded by the transport's own timeout, so the call completes
/// in bounded time. A transport timeout (or end of stream) before the length
/// header is complete yields [`AcquireError::Timeout`] or
/// [`AcquireError::MissingHeader`]; one during the payload yields
/// [`AcquireError::ShortRead`] carrying the partial data.
///
/// # Arguments
///
/// * `port` - Open link to the camera. Its read timeout bounds every wait.
/// * `config` - Trigger byte and read chunk size.
pub fn request_image<T>(port: &mut T, config: &AcquisitionConfig) -> Result<Vec<u8>, AcquireError>
where
    T: Read + Write + ?Sized,
{
    port.write_all(&[config.trigger])?;
    port.flush()?;

    let mut header = [0u8; HEADER_LEN];
    let received = read_until_stalled(port, &mut header)?;
    if received < HEADER_LEN {
        return Err(if received == 0 {
            AcquireError::Timeout
        } else {
            AcquireError::MissingHeader { received }
        });
    }
    let expected = u32::from_le_bytes(header) as usize;
    debug!("camera announced {expected} byte payload");

    let mut chunk = vec![0u8; config.chunk_size.max(1)];
    // The header is untrusted; grow towards `expected` instead of reserving it.
    let mut payload = Vec::with_capacity(expected.min(chunk.len()));
    while payload.len() < expected {
        let want = (expected - payload.len()).min(chunk.len());
        let read = read_until_stalled(port, &mut chunk[..want])?;
        if read == 0 {
            break;
        }
        payload.extend_from_slice(&chunk[..read]);
    }

    if payload.len() < expected {
        warn!(
            "expected {expected} bytes from camera, got {} before the link stalled",
            payload.len()
        );
        return Err(AcquireError::ShortRead {
            expected,
            partial: payload,
        });
    }
    Ok(payload)
}

/// Fill as much of `buf` as the transport delivers before it stalls.
///
/// Stalling means end of stream or a read timeout; both simply end the fill.
fn read_until_stalled<T: Read + ?Sized>(port: &mut T, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match port.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) if is_timeout(&err) => break,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

fn is_timeout(err: &io::Error) -> bool {
    matches!(err.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
}
