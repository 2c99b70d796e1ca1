//! Length-delimited frame I/O over byte streams
//!
//! On the wire each frame is a 4-byte LE length prefix followed by the
//! serialized frame (header + payload). TCP gives us a byte stream; the
//! prefix restores message boundaries.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use vectra_core::{VectraError, VectraResult};
use vectra_wire::{Frame, MAX_FRAME_SIZE};

/// Write one frame, length-prefixed.
pub async fn write_frame<W>(writer: &mut W, frame: &Frame) -> VectraResult<()>
where
    W: AsyncWrite + Unpin,
{
    let bytes = frame.serialize()?;
    let len = bytes.len() as u32;

    writer
        .write_all(&len.to_le_bytes())
        .await
        .map_err(|e| VectraError::TransportError(e.to_string()))?;
    writer
        .write_all(&bytes)
        .await
        .map_err(|e| VectraError::TransportError(e.to_string()))?;
    writer
        .flush()
        .await
        .map_err(|e| VectraError::TransportError(e.to_string()))?;
    Ok(())
}

/// Read one frame. Returns `Ok(None)` on clean EOF before a length prefix
/// (the peer closed the connection between requests).
pub async fn read_frame<R>(reader: &mut R) -> VectraResult<Option<Frame>>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(VectraError::TransportError(e.to_string())),
    }

    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_FRAME_SIZE {
        return Err(VectraError::InvalidWireFormat(format!(
            "Frame length {} exceeds maximum {}",
            len, MAX_FRAME_SIZE
        )));
    }

    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .await
        .map_err(|e| VectraError::TransportError(e.to_string()))?;

    Frame::parse(&buf).map(Some)
}
