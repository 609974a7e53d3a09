/// Append-only console output, split into display lines.
#[derive(Debug, Default)]
pub struct Transcript {
    lines: Vec<String>,
    // Tail of a UTF-8 sequence cut by a chunk boundary.
    carry: Vec<u8>,
    bytes: u64,
}

impl Transcript {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Bytes accepted so far, including any pending partial character.
    pub fn byte_len(&self) -> u64 {
        self.bytes
    }

    /// Appends a chunk: its first line continues the current last line
    /// (unless `fresh_line` is set), every further line starts a new one.
    pub fn push_chunk(&mut self, chunk: &[u8], fresh_line: bool) {
        self.bytes += chunk.len() as u64;
        let text = self.decode(chunk);

        if fresh_line && self.lines.last().is_some_and(|l| !l.is_empty()) {
            self.end_line();
        }
        for (i, piece) in text.split('\n').enumerate() {
            if i > 0 || self.lines.is_empty() {
                self.end_line();
            }
            if let Some(last) = self.lines.last_mut() {
                last.push_str(piece);
            }
        }
    }

    fn end_line(&mut self) {
        if let Some(last) = self.lines.last_mut()
            && last.ends_with('\r')
        {
            last.pop();
        }
        self.lines.push(String::new());
    }

    fn decode(&mut self, chunk: &[u8]) -> String {
        let mut buf = std::mem::take(&mut self.carry);
        buf.extend_from_slice(chunk);

        let mut out = String::with_capacity(buf.len());
        let mut rest = buf.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, tail) = rest.split_at(err.valid_up_to());
                    // valid_up_to() guarantees this prefix is UTF-8.
                    out.push_str(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &tail[bad..];
                        }
                        None => {
                            self.carry = tail.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_piece_continues_last_line() {
        let mut t = Transcript::default();
        t.push_chunk(b"hel", false);
        t.push_chunk(b"lo\nwor", false);
        t.push_chunk(b"ld\n", false);
        assert_eq!(t.lines(), ["hello", "world", ""]);
    }

    #[test]
    fn crlf_is_not_displayed() {
        let mut t = Transcript::default();
        t.push_chunk(b"[Server] Done (1.2s)\r", false);
        t.push_chunk(b"\nnext", false);
        assert_eq!(t.lines(), ["[Server] Done (1.2s)", "next"]);
    }

    #[test]
    fn split_multibyte_character_is_reassembled() {
        let bytes = "olá\n".as_bytes();
        let (a, b) = bytes.split_at(3);
        let mut t = Transcript::default();
        t.push_chunk(a, false);
        t.push_chunk(b, false);
        assert_eq!(t.lines(), ["olá", ""]);
        assert_eq!(t.byte_len(), bytes.len() as u64);
    }

    #[test]
    fn invalid_bytes_become_replacement() {
        let mut t = Transcript::default();
        t.push_chunk(&[b'a', 0xff, b'b'], false);
        assert_eq!(t.lines(), ["a\u{fffd}b"]);
    }

    #[test]
    fn fresh_line_does_not_stack_empty_lines() {
        let mut t = Transcript::default();
        t.push_chunk(b"one\n", false);
        t.push_chunk(b"two", true);
        assert_eq!(t.lines(), ["one", "two"]);
    }
}
