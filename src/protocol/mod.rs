/*
   Every message is framed as a 4 byte big-endian length followed by the
   MessagePack encoding of the message.

   0                                            15                                              31
   0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5  6  7  8  9  0  1
  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
  |                                         length (32)                                         |
  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
  |                                       msgpack body(n)                                       |
  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
*/

use bytes::{BufMut, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};

pub mod message;
mod status;

pub use message::*;
pub use status::{DialStatus, ResponseStatus};

pub const HEAD_LEN: usize = 4;

/// Write one framed message. Bodies longer than `max_size` are refused
/// before anything reaches the stream.
pub async fn write_msg<W, T>(write: &mut W, msg: &T, max_size: usize) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
    T: Serialize,
{
    let body = rmp_serde::to_vec(msg)?;
    let max = max_size.min(u32::MAX as usize);
    if body.len() > max {
        return Err(Error::MessageTooLarge {
            len: body.len(),
            max,
        });
    }
    let mut buf = BytesMut::with_capacity(HEAD_LEN + body.len());
    buf.put_u32(body.len() as u32);
    buf.put_slice(&body);
    write.write_all(&buf).await?;
    write.flush().await?;
    Ok(())
}

/// Read one framed message, refusing bodies longer than `max_size`.
pub async fn read_msg<R, T>(read: &mut R, max_size: usize) -> Result<T>
where
    R: AsyncRead + Unpin + ?Sized,
    T: DeserializeOwned,
{
    let mut head = [0; HEAD_LEN];
    read.read_exact(&mut head).await?;
    let len = u32::from_be_bytes(head) as usize;
    if len > max_size {
        return Err(Error::MessageTooLarge { len, max: max_size });
    }
    let mut buf = BytesMut::zeroed(len);
    read.read_exact(&mut buf).await?;
    Ok(rmp_serde::from_slice(&buf)?)
}
