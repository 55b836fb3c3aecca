/// A cursor for character-by-character inline parsing over a rewritable
/// buffer.
///
/// Attribute references replace the unread part of the buffer, so the
/// cursor owns its content. After a rewrite the byte that preceded the
/// reference is kept as look-behind.
#[derive(Debug, Clone)]
pub struct Cursor {
    s: String,
    /// Current byte index into the buffer.
    pub i: usize,
    /// Look-behind byte to report at index 0 after a rewrite.
    before: Option<u8>,
}

impl Cursor {
    pub fn new(s: impl Into<String>) -> Self {
        Self {
            s: s.into(),
            i: 0,
            before: None,
        }
    }

    /// Returns true if at end of buffer.
    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    /// Peeks at the current byte without advancing.
    pub fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    /// Peeks `n` bytes ahead of the current position.
    pub fn peek_at(&self, n: usize) -> Option<u8> {
        self.s.as_bytes().get(self.i + n).copied()
    }

    /// The byte before the current position.
    pub fn prev(&self) -> Option<u8> {
        match self.i {
            0 => self.before,
            i => self.s.as_bytes().get(i - 1).copied(),
        }
    }

    /// Checks if the remaining input starts with `pat`.
    pub fn starts_with(&self, pat: &str) -> bool {
        self.rest().starts_with(pat)
    }

    /// The unread part of the buffer.
    pub fn rest(&self) -> &str {
        self.s.get(self.i..).unwrap_or("")
    }

    /// Advances over one full character, returning it.
    pub fn bump_char(&mut self) -> Option<char> {
        let c = self.rest().chars().next()?;
        self.i += c.len_utf8();
        Some(c)
    }

    /// Advances by `n` bytes. Callers only skip over ASCII markers.
    pub fn bump_n(&mut self, n: usize) {
        self.i = (self.i + n).min(self.s.len());
    }

    /// Replaces everything from the current position on with `head`
    /// followed by the input after `skip` more bytes, and restarts at 0.
    pub fn rewrite(&mut self, head: &str, skip: usize) {
        let tail = self.s.get(self.i + skip..).unwrap_or("");
        let mut next = String::with_capacity(head.len() + tail.len());
        next.push_str(head);
        next.push_str(tail);
        self.before = self.prev();
        self.s = next;
        self.i = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_basics() {
        let mut cur = Cursor::new("hello");
        assert!(!cur.eof());
        assert_eq!(cur.peek(), Some(b'h'));
        assert_eq!(cur.prev(), None);
        assert_eq!(cur.bump_char(), Some('h'));
        assert_eq!(cur.prev(), Some(b'h'));
        assert_eq!(cur.peek_at(1), Some(b'l'));
    }

    #[test]
    fn bump_char_steps_over_multibyte() {
        let mut cur = Cursor::new("é!");
        assert_eq!(cur.bump_char(), Some('é'));
        assert_eq!(cur.peek(), Some(b'!'));
    }

    #[test]
    fn bump_n_clamps_at_end() {
        let mut cur = Cursor::new("hi");
        cur.bump_n(10);
        assert!(cur.eof());
        assert_eq!(cur.peek(), None);
        assert_eq!(cur.rest(), "");
    }

    #[test]
    fn rewrite_keeps_look_behind() {
        let mut cur = Cursor::new("a{x} b");
        cur.bump_n(1);
        cur.rewrite("VALUE", 3);
        assert_eq!(cur.rest(), "VALUE b");
        assert_eq!(cur.prev(), Some(b'a'));
        assert!(cur.starts_with("VAL"));
    }

    #[test]
    fn bump_at_eof_returns_none() {
        let mut cur = Cursor::new("x");
        assert_eq!(cur.bump_char(), Some('x'));
        assert_eq!(cur.bump_char(), None);
        assert_eq!(cur.bump_char(), None);
    }
}
