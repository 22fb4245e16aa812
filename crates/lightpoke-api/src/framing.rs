//! Newline framing for the streamed response body.

use bytes::BytesMut;
use tracing::debug;

/// Assembles `\n`-terminated lines from arbitrary body chunks.
///
/// Holds at most one partial line. A line that grows past `max_line`
/// bytes is discarded up to and including its terminator.
#[derive(Debug)]
pub struct LineFramer {
    buf: BytesMut,
    max_line: usize,
    discarding: bool,
}

impl LineFramer {
    pub fn new(max_line: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(max_line.min(4096)),
            max_line,
            discarding: false,
        }
    }

    /// Feed a chunk and return every line it completed, without the
    /// terminator (a trailing `\r` is stripped as well).
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut rest = chunk;

        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            let (head, tail) = rest.split_at(pos);
            rest = tail.get(1..).unwrap_or_default();

            if self.discarding {
                self.discarding = false;
                self.buf.clear();
                continue;
            }
            if self.buf.len() + head.len() > self.max_line {
                debug!(max = self.max_line, "dropping over-long stream line");
                self.buf.clear();
                continue;
            }

            self.buf.extend_from_slice(head);
            let raw = self.buf.split();
            lines.push(decode(&raw));
        }

        if !self.discarding {
            if self.buf.len() + rest.len() > self.max_line {
                debug!(max = self.max_line, "dropping over-long stream line");
                self.buf.clear();
                self.discarding = true;
            } else {
                self.buf.extend_from_slice(rest);
            }
        }

        lines
    }

    /// Bytes of the current partial line.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

fn decode(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_complete_lines() {
        let mut framer = LineFramer::new(64);
        let lines = framer.push(b"data: a\n\ndata: b\n");
        assert_eq!(lines, vec!["data: a", "", "data: b"]);
        assert_eq!(framer.pending(), 0);
    }

    #[test]
    fn joins_lines_across_chunks() {
        let mut framer = LineFramer::new(64);
        assert!(framer.push(b"data: {\"ty").is_empty());
        assert!(framer.push(b"pe\":\"poke\"").is_empty());
        let lines = framer.push(b"}\r\nda");
        assert_eq!(lines, vec![r#"data: {"type":"poke"}"#]);
        assert_eq!(framer.pending(), 2);
    }

    #[test]
    fn strips_carriage_return() {
        let mut framer = LineFramer::new(64);
        assert_eq!(framer.push(b"x\r\n"), vec!["x"]);
    }

    #[test]
    fn drops_over_long_line_in_one_chunk() {
        let mut framer = LineFramer::new(8);
        let lines = framer.push(b"0123456789abc\nok\n");
        assert_eq!(lines, vec!["ok"]);
    }

    #[test]
    fn drops_over_long_line_across_chunks() {
        let mut framer = LineFramer::new(8);
        assert!(framer.push(b"012345").is_empty());
        assert!(framer.push(b"6789").is_empty());
        assert!(framer.push(b"more junk").is_empty());
        let lines = framer.push(b"tail\nnext\n");
        assert_eq!(lines, vec!["next"]);
    }
}
