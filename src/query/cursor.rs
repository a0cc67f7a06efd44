use super::error::{ParseErr, Result};

/// A byte-offset cursor over SQL source text. All lookahead is
/// non-consuming; consuming methods are bounds-checked and never step
/// past the end of input.
pub struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(src: &'a str) -> Self {
        Cursor { src, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Moves the cursor back to a previously saved position. Used by the
    /// backtracking combinator in the parser.
    pub fn rewind(&mut self, pos: usize) {
        debug_assert!(pos <= self.pos);
        self.pos = pos;
    }

    pub fn finished(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    /// Current character without consuming it.
    pub fn curr(&self) -> Result<char> {
        self.rest()
            .chars()
            .next()
            .ok_or(ParseErr::UnexpectedEof(self.pos))
    }

    /// The next `n` bytes without consuming them.
    pub fn peek(&self, n: usize) -> Result<&'a str> {
        self.rest().get(..n).ok_or(ParseErr::UnexpectedEof(self.pos))
    }

    /// Consumes and returns the current character.
    pub fn walk(&mut self) -> Result<char> {
        let ch = self.curr()?;
        self.pos += ch.len_utf8();
        Ok(ch)
    }

    /// Advances by `n` bytes. Fails if that would step past the end of
    /// input or split a character.
    pub fn advance(&mut self, n: usize) -> Result<()> {
        self.peek(n)?;
        self.pos += n;
        Ok(())
    }

    pub fn skip_ws(&mut self) {
        while let Ok(ch) = self.curr()
            && ch.is_whitespace()
        {
            self.pos += ch.len_utf8();
        }
    }

    /// Matches a keyword literal, case-insensitively, consuming it on
    /// success. The cursor does not move on failure.
    pub fn keyword(&mut self, kw: &'static str) -> Result<()> {
        match self.rest().get(..kw.len()) {
            Some(s) if s.eq_ignore_ascii_case(kw) => {
                self.pos += kw.len();
                Ok(())
            }
            _ => Err(ParseErr::Expected {
                expected: kw,
                at: self.pos,
            }),
        }
    }

    /// Like `keyword`, but reports a miss as `false` instead of an error.
    pub fn try_keyword(&mut self, kw: &'static str) -> bool {
        self.keyword(kw).is_ok()
    }

    /// An identifier: an alphabetic character followed by alphanumerics
    /// or underscores. Case is preserved.
    pub fn ident(&mut self) -> Result<&'a str> {
        match self.curr() {
            Ok(ch) if ch.is_alphabetic() => {}
            _ => return Err(ParseErr::InvalidIdent(self.pos)),
        }
        Ok(self.take_while(|ch| ch.is_alphanumeric() || ch == '_'))
    }

    /// Consumes characters while `pred` holds and returns the consumed
    /// slice, which may be empty.
    pub fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Ok(ch) = self.curr()
            && pred(ch)
        {
            self.pos += ch.len_utf8();
        }
        &self.src[start..self.pos]
    }

    /// Asserts the statement ends here: end of input, or a single `;`
    /// followed only by whitespace.
    pub fn end(&mut self) -> Result<()> {
        self.skip_ws();
        if self.finished() {
            return Ok(());
        }
        if self.curr()? == ';' {
            self.walk()?;
            self.skip_ws();
            if self.finished() {
                return Ok(());
            }
        }
        Err(ParseErr::TrailingInput(self.pos))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_walk_and_peek() {
        let mut cur = Cursor::new("ab");
        assert_eq!(cur.peek(2).unwrap(), "ab");
        assert_eq!(cur.walk().unwrap(), 'a');
        assert_eq!(cur.walk().unwrap(), 'b');
        assert!(matches!(cur.walk(), Err(ParseErr::UnexpectedEof(2))));
        assert!(cur.finished());
    }

    #[test]
    fn test_peek_past_end() {
        let cur = Cursor::new("a");
        assert!(matches!(cur.peek(2), Err(ParseErr::UnexpectedEof(0))));
    }

    #[test]
    fn test_keyword_case_insensitive() {
        let mut cur = Cursor::new("SeLeCt 1");
        assert!(cur.keyword("select").is_ok());
        assert_eq!(cur.pos(), 6);
    }

    #[test]
    fn test_keyword_miss_does_not_consume() {
        let mut cur = Cursor::new("delete");
        assert!(cur.keyword("select").is_err());
        assert_eq!(cur.pos(), 0);
        assert!(!cur.try_keyword("select"));
        assert_eq!(cur.pos(), 0);
        assert!(cur.try_keyword("delete"));
        assert_eq!(cur.pos(), 6);
    }

    #[test]
    fn test_ident_rules() {
        let mut cur = Cursor::new("my_table2 ");
        assert_eq!(cur.ident().unwrap(), "my_table2");

        let mut cur = Cursor::new("2bad");
        assert!(matches!(cur.ident(), Err(ParseErr::InvalidIdent(0))));

        let mut cur = Cursor::new("_bad");
        assert!(cur.ident().is_err());
    }

    #[test]
    fn test_ident_preserves_case() {
        let mut cur = Cursor::new("Users");
        assert_eq!(cur.ident().unwrap(), "Users");
    }

    #[test]
    fn test_skip_ws() {
        let mut cur = Cursor::new("  \t\n x");
        cur.skip_ws();
        assert_eq!(cur.curr().unwrap(), 'x');
        cur.skip_ws(); // no-op when there is nothing to skip
        assert_eq!(cur.curr().unwrap(), 'x');
    }

    #[test]
    fn test_end() {
        assert!(Cursor::new("").end().is_ok());
        assert!(Cursor::new("  ").end().is_ok());
        assert!(Cursor::new(";").end().is_ok());
        assert!(Cursor::new(" ; ").end().is_ok());
        assert!(matches!(
            Cursor::new("; x").end(),
            Err(ParseErr::TrailingInput(2))
        ));
        assert!(matches!(
            Cursor::new("x").end(),
            Err(ParseErr::TrailingInput(0))
        ));
    }

    #[test]
    fn test_take_while() {
        let mut cur = Cursor::new("123abc");
        assert_eq!(cur.take_while(|c| c.is_ascii_digit()), "123");
        assert_eq!(cur.take_while(|c| c.is_ascii_digit()), "");
        assert_eq!(cur.curr().unwrap(), 'a');
    }

    #[test]
    fn test_advance_bounds_checked() {
        let mut cur = Cursor::new("abc");
        assert!(cur.advance(2).is_ok());
        assert!(cur.advance(2).is_err());
        assert_eq!(cur.pos(), 2);
    }
}
