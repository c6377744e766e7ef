//! Newline-delimited JSON framing for the server side of the stdio transport
//!
//! The server reads frames from its own stdin and writes frames to its own
//! stdout. Frames are raw bytes split on `\n` by
//! [`tokio_util::codec::AnyDelimiterCodec`]; decoding them as UTF-8 JSON is
//! left to the session, so a bad frame is a per-request error rather than a
//! stream error. Frames above the size limit are reported and skipped.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{AnyDelimiterCodec, FramedRead, FramedWrite};

/// Largest accepted frame, in bytes (excluding the delimiter).
pub const MAX_FRAME_BYTES: usize = 8 * 1024 * 1024;

const DELIMITER: &[u8] = b"\n";

/// Inbound frame stream.
pub type FrameReader<R> = FramedRead<R, AnyDelimiterCodec>;

/// Outbound frame sink.
pub type FrameWriter<W> = FramedWrite<W, AnyDelimiterCodec>;

/// Wrap a reader/writer pair in newline-delimited framing, capped at
/// [`MAX_FRAME_BYTES`].
///
/// # Examples
///
/// ```
/// use mailchimp_mcp::mcp::transport::lines::framed;
///
/// let (reader, writer) = tokio::io::duplex(64);
/// let (_frames_in, _frames_out) = framed(reader, writer);
/// ```
pub fn framed<R, W>(reader: R, writer: W) -> (FrameReader<R>, FrameWriter<W>)
where
    R: AsyncRead,
    W: AsyncWrite,
{
    framed_with_limit(reader, writer, MAX_FRAME_BYTES)
}

/// Like [`framed`], with an explicit inbound frame limit in bytes.
pub fn framed_with_limit<R, W>(
    reader: R,
    writer: W,
    max_frame_bytes: usize,
) -> (FrameReader<R>, FrameWriter<W>)
where
    R: AsyncRead,
    W: AsyncWrite,
{
    (
        FramedRead::new(
            reader,
            AnyDelimiterCodec::new_with_max_length(
                DELIMITER.to_vec(),
                DELIMITER.to_vec(),
                max_frame_bytes,
            ),
        ),
        FramedWrite::new(
            writer,
            AnyDelimiterCodec::new(DELIMITER.to_vec(), DELIMITER.to_vec()),
        ),
    )
}
