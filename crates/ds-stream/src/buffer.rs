//! Reassembles records from chunks that do not respect line boundaries
//!
//! The buffer works on raw bytes. `\n` and `"` are single bytes that never occur
//! inside a multi-byte UTF-8 sequence, so splitting on them is safe even when a
//! chunk ends in the middle of a character; decoding happens per complete line.

/// Accumulator for the trailing fragment of the input seen so far.
///
/// Invariant: between calls to [`LineBuffer::push`] the buffer holds at most one
/// partial record, and the quote state reflects every byte of that fragment.
#[derive(Debug)]
pub struct LineBuffer {
    pending: Vec<u8>,
    /// Number of bytes at the front of `pending` already scanned
    scanned: usize,
    in_quotes: bool,
    /// Only whitespace seen since the start of the current field
    field_start: bool,
    /// Previous byte closed a quoted section, so `"` here is an escaped quote
    just_closed: bool,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            scanned: 0,
            in_quotes: false,
            field_start: true,
            just_closed: false,
        }
    }
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every record it completed.
    ///
    /// A `\n` ends a record only outside double quotes, so a quoted field may
    /// span lines and chunks. A quote opens a quoted section only at the start
    /// of a field (after optional whitespace); a stray `"` inside an unquoted
    /// field cannot hold the rest of the input open. A trailing `\r` is removed
    /// from each record.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut line_start = 0;

        for idx in self.scanned..self.pending.len() {
            let byte = self.pending[idx];

            if self.in_quotes {
                if byte == b'"' {
                    self.in_quotes = false;
                    self.just_closed = true;
                }
                continue;
            }

            match byte {
                b'"' if self.field_start || self.just_closed => {
                    self.in_quotes = true;
                    self.field_start = false;
                }
                b'\n' => {
                    lines.push(strip_cr(&self.pending[line_start..idx]).to_vec());
                    line_start = idx + 1;
                    self.field_start = true;
                }
                b',' => self.field_start = true,
                b' ' | b'\t' | b'\r' => {}
                _ => self.field_start = false,
            }
            self.just_closed = false;
        }

        self.pending.drain(..line_start);
        self.scanned = self.pending.len();
        lines
    }

    /// The not-yet-terminated fragment
    pub fn leftover(&self) -> &[u8] {
        &self.pending
    }

    /// Whether the fragment ends inside an open quote
    pub fn in_quotes(&self) -> bool {
        self.in_quotes
    }

    /// Consume the buffer at end of input, returning the final fragment if any
    pub fn finish(self) -> Option<Vec<u8>> {
        let line = strip_cr(&self.pending);
        if line.is_empty() {
            None
        } else {
            Some(line.to_vec())
        }
    }
}

fn strip_cr(line: &[u8]) -> &[u8] {
    match line.last() {
        Some(b'\r') => &line[..line.len() - 1],
        _ => line,
    }
}
