use super::{FRAME_PLAIN, FRAME_WRAPPED};
use crate::capture::{UNKNOWN_FILE, UNKNOWN_FUNCTION, UNKNOWN_LINE};
use crate::chain::Link;

/// Serialize every link from `head` inward, one frame per link
///
/// Returns the frame bytes and the number of frames written.
pub(crate) fn write_frames(head: Link<'_>) -> (Vec<u8>, usize) {
    let mut out = Vec::new();
    let mut frames = 0usize;

    head.walk(|link| {
        match link {
            Link::Wrapped(w) => {
                out.push(FRAME_WRAPPED);
                write_str(&mut out, &w.context().to_wire());
                match w.caller() {
                    Some(caller) => {
                        write_str(&mut out, caller.file());
                        write_str(&mut out, caller.function());
                        write_u64(&mut out, u64::from(caller.line()));
                    }
                    None => {
                        write_str(&mut out, UNKNOWN_FILE);
                        write_str(&mut out, UNKNOWN_FUNCTION);
                        write_u64(&mut out, u64::from(UNKNOWN_LINE));
                    }
                }
            }
            Link::Plain(err) => {
                out.push(FRAME_PLAIN);
                write_str(&mut out, &err.to_string());
            }
        }
        frames += 1;
        true
    });

    (out, frames)
}

fn write_u64(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn write_str(out: &mut Vec<u8>, value: &str) {
    write_u64(out, value.len() as u64);
    out.extend_from_slice(value.as_bytes());
}
