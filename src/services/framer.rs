//! Newline framing for the upstream model's chunked response body.
//!
//! Chunks arrive with arbitrary boundaries, possibly splitting a line (or a
//! multi-byte UTF-8 character) in two. Bytes are buffered and only complete
//! lines are decoded, so the output does not depend on where chunks end.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, LinesCodec, LinesCodecError};

/// Longest line accepted before the stream is considered corrupt.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Splits one byte stream into newline-delimited lines. One instance per stream.
#[derive(Debug)]
pub struct LineFramer {
    codec: LinesCodec,
    buffer: BytesMut,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineFramer {
    pub fn new() -> Self {
        Self {
            codec: LinesCodec::new_with_max_length(MAX_LINE_BYTES),
            buffer: BytesMut::new(),
        }
    }

    /// Append a chunk and iterate over every line it completed, in arrival order.
    pub fn push(&mut self, chunk: &[u8]) -> Lines<'_> {
        self.buffer.extend_from_slice(chunk);
        Lines {
            framer: self,
            eof: false,
        }
    }

    /// End of stream: drain what is left, including an unterminated last line.
    pub fn finish(&mut self) -> Lines<'_> {
        Lines {
            framer: self,
            eof: true,
        }
    }
}

/// Lines completed by the most recent [`LineFramer::push`] or [`LineFramer::finish`].
pub struct Lines<'a> {
    framer: &'a mut LineFramer,
    eof: bool,
}

impl Iterator for Lines<'_> {
    type Item = Result<String, FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        let LineFramer { codec, buffer } = &mut *self.framer;
        let decoded = if self.eof {
            codec.decode_eof(buffer)
        } else {
            codec.decode(buffer)
        };
        decoded.map_err(FrameError::from).transpose()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("Upstream line is not valid UTF-8: {0}")]
    InvalidUtf8(std::io::Error),

    #[error("Upstream line exceeded 1 MiB")]
    LineTooLong,
}

impl From<LinesCodecError> for FrameError {
    fn from(err: LinesCodecError) -> Self {
        match err {
            LinesCodecError::MaxLineLengthExceeded => FrameError::LineTooLong,
            LinesCodecError::Io(e) => FrameError::InvalidUtf8(e),
        }
    }
}
