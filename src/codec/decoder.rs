use super::{FRAME_PLAIN, FRAME_WRAPPED};
use crate::capture::Caller;
use crate::chain::{Cause, Context, PlainError, WrappedError};
use crate::errors::{WrapError, WrapResult};

/// One decoded frame, before the chain is re-linked
#[derive(Debug, PartialEq)]
pub(crate) enum Frame {
    Wrapped {
        context: Context,
        caller: Option<Caller>,
    },
    Plain(String),
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn take(&mut self, len: usize, field: &str) -> WrapResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.buf.len())
            .ok_or_else(|| {
                WrapError::decoding(format!(
                    "{} needs {} bytes at offset {}, only {} remain",
                    field,
                    len,
                    self.pos,
                    self.buf.len() - self.pos
                ))
            })?;
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_u8(&mut self, field: &str) -> WrapResult<u8> {
        Ok(self.take(1, field)?[0])
    }

    fn read_u64(&mut self, field: &str) -> WrapResult<u64> {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(self.take(8, field)?);
        Ok(u64::from_le_bytes(raw))
    }

    fn read_string(&mut self, field: &str) -> WrapResult<String> {
        let len = self.read_u64(field)?;
        let len = usize::try_from(len)
            .map_err(|_| WrapError::decoding(format!("{} length {} is too large", field, len)))?;
        let bytes = self.take(len, field)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| WrapError::decoding(format!("{} is not valid UTF-8: {}", field, e)))
    }
}

/// Parse frames front to back
///
/// Parsing is a loop over the buffer rather than recursion, so corrupt input
/// cannot drive the stack depth. A plain-error frame must be the last one.
pub(crate) fn read_frames(payload: &[u8]) -> WrapResult<Vec<Frame>> {
    let mut reader = Reader::new(payload);
    let mut frames = Vec::new();

    while !reader.is_at_end() {
        let offset = reader.pos;
        match reader.read_u8("frame delimiter")? {
            FRAME_WRAPPED => {
                let context = Context::from_wire(&reader.read_string("context")?);
                let file = reader.read_string("caller file")?;
                let function = reader.read_string("caller function")?;
                let line = reader.read_u64("caller line")?;
                let line = u32::try_from(line)
                    .map_err(|_| WrapError::decoding(format!("caller line {} out of range", line)))?;
                frames.push(Frame::Wrapped {
                    context,
                    caller: Caller::from_wire(file, function, line),
                });
            }
            FRAME_PLAIN => {
                frames.push(Frame::Plain(reader.read_string("message")?));
                if !reader.is_at_end() {
                    return Err(WrapError::decoding(format!(
                        "{} trailing bytes after plain-error frame",
                        payload.len() - reader.pos
                    )));
                }
            }
            other => {
                return Err(WrapError::decoding(format!(
                    "unknown frame delimiter {:#04x} at offset {}",
                    other, offset
                )));
            }
        }
    }

    Ok(frames)
}

/// Re-link decoded frames inner to outer and return the head
pub(crate) fn link_frames(frames: Vec<Frame>) -> WrapResult<WrappedError> {
    let mut cause: Option<Cause> = None;
    let mut head = None;

    for frame in frames.into_iter().rev() {
        if let Some(link) = head.take() {
            cause = Some(Cause::from(link));
        }
        match frame {
            Frame::Wrapped { context, caller } => {
                head = Some(WrappedError::from_parts(context, cause.take(), caller));
            }
            Frame::Plain(message) => {
                cause = Some(PlainError::new(message).into());
            }
        }
    }

    head.ok_or_else(|| WrapError::decoding("buffer holds no chain-link frame"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_bytes(delimiter: u8, fields: &[&str], line: Option<u64>) -> Vec<u8> {
        let mut out = vec![delimiter];
        for field in fields {
            out.extend_from_slice(&(field.len() as u64).to_le_bytes());
            out.extend_from_slice(field.as_bytes());
        }
        if let Some(line) = line {
            out.extend_from_slice(&line.to_le_bytes());
        }
        out
    }

    #[test]
    fn test_read_wrapped_then_plain() {
        let mut payload = frame_bytes(FRAME_WRAPPED, &["\"ctx\"", "main.rs", "main"], Some(7));
        payload.extend(frame_bytes(FRAME_PLAIN, &["eof"], None));

        let frames = read_frames(&payload).unwrap();
        assert_eq!(frames.len(), 2);
        match &frames[0] {
            Frame::Wrapped { context, caller } => {
                assert_eq!(context.as_str(), Some("ctx"));
                assert_eq!(caller.as_ref().unwrap().line(), 7);
            }
            other => panic!("unexpected frame {:?}", other),
        }
        assert_eq!(frames[1], Frame::Plain("eof".to_string()));
    }

    #[test]
    fn test_overlong_length_is_decoding_error() {
        let mut payload = vec![FRAME_PLAIN];
        payload.extend_from_slice(&u64::MAX.to_le_bytes());
        payload.extend_from_slice(b"abc");

        let err = read_frames(&payload).unwrap_err();
        assert!(matches!(err, WrapError::Decoding { .. }));
    }

    #[test]
    fn test_unknown_delimiter_is_decoding_error() {
        let err = read_frames(&[0x42]).unwrap_err();
        assert!(err.to_string().contains("0x42"));
    }

    #[test]
    fn test_bytes_after_plain_frame_are_rejected() {
        let mut payload = frame_bytes(FRAME_PLAIN, &["eof"], None);
        payload.push(FRAME_PLAIN);

        assert!(matches!(
            read_frames(&payload),
            Err(WrapError::Decoding { .. })
        ));
    }

    #[test]
    fn test_link_frames_rejects_plain_head() {
        let frames = vec![Frame::Plain("eof".to_string())];
        assert!(link_frames(frames).is_err());
        assert!(link_frames(Vec::new()).is_err());
    }

    #[test]
    fn test_link_frames_preserves_order() {
        let frames = vec![
            Frame::Wrapped {
                context: Context::from("outer"),
                caller: None,
            },
            Frame::Wrapped {
                context: Context::from("inner"),
                caller: None,
            },
            Frame::Plain("eof".to_string()),
        ];

        let head = link_frames(frames).unwrap();
        assert_eq!(head.rendered_message(), "outer: inner: eof");
        assert_eq!(head.depth(), 2);
    }
}
