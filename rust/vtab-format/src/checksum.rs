//! Sealed messages: a finished buffer framed as `u32 len | payload | u32 checksum`
//! for storage or transfer.

use std::io::Write;

use vtab_bytes::ReadLe;
use vtab_common::{Result, error::ErrorKind, verify_arg};

/// Size of the payload length prefix.
pub const MESSAGE_LEN_SIZE: usize = 4;

/// Size of the checksum suffix.
pub const CHECKSUM_SIZE: usize = 4;

/// Checksum of a buffer: xxh3-64 folded to 32 bits.
pub fn compute(buf: &[u8]) -> u32 {
    let h = xxhash_rust::xxh3::xxh3_64(buf);
    (h as u32) ^ ((h >> 32) as u32)
}

/// Frames `payload` into a newly allocated sealed message.
pub fn seal(payload: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(MESSAGE_LEN_SIZE + payload.len() + CHECKSUM_SIZE);
    message.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    message.extend_from_slice(payload);
    message.extend_from_slice(&compute(payload).to_le_bytes());
    message
}

/// Writes a sealed message for `payload` into `writer`.
pub fn write_sealed<W: Write>(payload: &[u8], writer: &mut W) -> std::io::Result<()> {
    writer.write_all(&(payload.len() as u32).to_le_bytes())?;
    writer.write_all(payload)?;
    writer.write_all(&compute(payload).to_le_bytes())
}

/// Validates a sealed message and returns its payload.
///
/// # Arguments
///
/// * `message` - A complete sealed message: `u32` payload length, payload,
///   `u32` checksum. Trailing bytes after the checksum are ignored.
///
/// # Returns
///
/// The payload slice, borrowed from `message`.
///
/// # Errors
///
/// * `InvalidArgument` if the message is too short for its declared length.
/// * `ChecksumMismatch` if the stored checksum does not match the payload.
pub fn open(message: &[u8]) -> Result<&[u8]> {
    verify_arg!(message, message.len() >= MESSAGE_LEN_SIZE + CHECKSUM_SIZE);
    let size = message.read_u32(0)? as usize;
    verify_arg!(
        size,
        size <= message.len() - MESSAGE_LEN_SIZE - CHECKSUM_SIZE
    );
    let payload = &message[MESSAGE_LEN_SIZE..MESSAGE_LEN_SIZE + size];
    let checksum = message.read_u32(MESSAGE_LEN_SIZE + size)?;
    if compute(payload) != checksum {
        return Err(ErrorKind::ChecksumMismatch {
            element: "message".to_string(),
        }
        .into());
    }
    Ok(payload)
}
