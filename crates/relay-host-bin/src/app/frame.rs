//! Native messaging framing: a u32 length in native (little-endian) byte
//! order followed by that many bytes of UTF-8 JSON.

use anyhow::{bail, Context};
use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest frame accepted from the browser.
pub const MAX_INBOUND_FRAME: usize = 64 * 1024 * 1024;

/// Largest frame the browser accepts from a host.
pub const MAX_OUTBOUND_FRAME: usize = 1024 * 1024;

/// Read one frame. Returns `None` on a clean EOF before the length prefix.
pub async fn read_frame<R>(reader: &mut R) -> anyhow::Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e).context("reading frame length"),
    }

    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_INBOUND_FRAME {
        bail!("inbound frame of {} bytes exceeds limit", len);
    }

    let mut payload = vec![0u8; len];
    reader
        .read_exact(&mut payload)
        .await
        .context("reading frame payload")?;
    Ok(Some(payload))
}

/// Write one frame and flush.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    if payload.len() > MAX_OUTBOUND_FRAME {
        bail!("outbound frame of {} bytes exceeds limit", payload.len());
    }

    let len = u32::try_from(payload.len()).context("frame length")?;
    writer.write_all(&len.to_le_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read and decode one JSON frame.
pub async fn read_json<R, T>(reader: &mut R) -> anyhow::Result<Option<serde_json::Result<T>>>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    Ok(read_frame(reader)
        .await?
        .map(|payload| serde_json::from_slice(&payload)))
}

/// Encode and write one JSON frame.
pub async fn write_json<W, T>(writer: &mut W, value: &T) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let payload = serde_json::to_vec(value).context("encoding frame")?;
    write_frame(writer, &payload).await
}
