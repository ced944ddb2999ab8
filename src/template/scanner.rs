//! Cursor over template source used by the parser.
//!
//! Every "padded" operation treats any whitespace directly in front of the
//! literal as part of the match, which is how whitespace inside tag
//! delimiters (`{{ name }}`) is absorbed.

pub(crate) struct Scanner<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn eos(&self) -> bool {
        self.pos >= self.source.len()
    }

    #[inline]
    fn tail(&self) -> &'a str {
        &self.source[self.pos..]
    }

    /// Consumes `literal` if the remaining input starts with it.
    pub fn scan(&mut self, literal: &str) -> bool {
        if !literal.is_empty() && self.tail().starts_with(literal) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    /// Consumes optional whitespace followed by `literal`.
    ///
    /// Nothing is consumed when `literal` does not follow the whitespace.
    pub fn scan_padded(&mut self, literal: &str) -> bool {
        let tail = self.tail();
        let skipped = tail.len() - tail.trim_start().len();
        if tail[skipped..].starts_with(literal) {
            self.pos += skipped + literal.len();
            true
        } else {
            false
        }
    }

    /// Consumes leading whitespace.
    pub fn skip_whitespace(&mut self) {
        let tail = self.tail();
        self.pos += tail.len() - tail.trim_start().len();
    }

    /// Consumes a single tag-type sigil, if present.
    pub fn scan_sigil(&mut self) -> Option<char> {
        let c = self.tail().chars().next()?;
        if matches!(c, '#' | '^' | '/' | '>' | '{' | '&' | '=' | '!') {
            self.pos += c.len_utf8();
            Some(c)
        } else {
            None
        }
    }

    /// Returns everything up to the next occurrence of `literal`, leaving the
    /// cursor on it. Consumes the rest of the input when `literal` is absent.
    pub fn scan_until(&mut self, literal: &str) -> &'a str {
        let tail = self.tail();
        let end = tail.find(literal).unwrap_or(tail.len());
        self.pos += end;
        &tail[..end]
    }

    /// Like [`scan_until`](Self::scan_until) but stops in front of the
    /// whitespace run that precedes `literal`.
    pub fn scan_until_padded(&mut self, literal: &str) -> &'a str {
        let tail = self.tail();
        match tail.find(literal) {
            Some(end) => {
                let value = tail[..end].trim_end();
                self.pos += value.len();
                value
            }
            None => {
                self.pos = self.source.len();
                tail
            }
        }
    }
}
