/// The quoting context a literal is written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delimiter {
    /// Unquoted text. Special characters are escaped with a backslash.
    Empty,
    /// `'foo'`
    SingleQuote,
    /// `"foo"`
    DoubleQuote,
    /// Unquoted text in a line where nothing can be escaped.
    Plain,
}

impl Delimiter {
    /// The character which closes the context, if any.
    pub fn closing(self) -> Option<char> {
        match self {
            Delimiter::Empty | Delimiter::Plain => None,
            Delimiter::SingleQuote => Some('\''),
            Delimiter::DoubleQuote => Some('"'),
        }
    }

    /// Appends `value` to `out` so that it is read back as `value` in this
    /// context.
    pub fn escape(self, value: &str, out: &mut String) {
        for c in value.chars() {
            match self {
                Delimiter::Empty => {
                    if is_separator(c) || matches!(c, '\'' | '"' | '\\' | '|') {
                        out.push('\\');
                    }
                    out.push(c);
                }
                Delimiter::DoubleQuote => {
                    if matches!(c, '"' | '\\') {
                        out.push('\\');
                    }
                    out.push(c);
                }
                // Nothing can be escaped within single quotes: close the
                // quote, add an escaped one, and reopen it.
                Delimiter::SingleQuote if c == '\'' => out.push_str("'\\''"),
                Delimiter::SingleQuote | Delimiter::Plain => out.push(c),
            }
        }
    }
}

/// How literals are written in a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quoting {
    /// Quotes and backslashes are ordinary characters.
    Plain,
    /// `'...'`, `"..."` and backslash escapes.
    Shell,
}

impl Quoting {
    /// The context of unquoted text.
    pub fn delimiter(self) -> Delimiter {
        match self {
            Quoting::Plain => Delimiter::Plain,
            Quoting::Shell => Delimiter::Empty,
        }
    }
}

impl Default for Quoting {
    fn default() -> Quoting {
        Quoting::Shell
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiteralKind {
    Word,
    /// `-f` (or a bare `-`).
    ShortOption,
    /// `--force` (or a bare `--`).
    LongOption,
}

/// A word of the input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Literal {
    pub kind: LiteralKind,
    /// The byte offset in the input.
    pub offset: usize,
    /// The text as written, including quotes and backslashes.
    pub raw: String,
    /// The decoded text.
    pub value: String,
}

impl Literal {
    pub fn word(offset: usize, raw: &str, value: &str) -> Literal {
        Literal {
            kind: LiteralKind::Word,
            offset,
            raw: raw.to_owned(),
            value: value.to_owned(),
        }
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.raw.len()
    }

    #[inline]
    pub fn is_option(&self) -> bool {
        self.kind != LiteralKind::Word
    }

    /// The option name without its leading dashes. It equals `value` for
    /// words.
    pub fn name(&self) -> &str {
        match self.kind {
            LiteralKind::Word => &self.value,
            LiteralKind::ShortOption => &self.raw[1..],
            LiteralKind::LongOption => &self.raw[2..],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// Whitespaces between literals.
    Separator { offset: usize, raw: String },
    Literal(Literal),
    /// `|`
    Pipe { offset: usize },
    /// The end of the input.
    End { offset: usize },
}

impl Token {
    pub fn offset(&self) -> usize {
        match self {
            Token::Separator { offset, .. } | Token::Pipe { offset } | Token::End { offset } => {
                *offset
            }
            Token::Literal(literal) => literal.offset,
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            Token::Separator { raw, .. } => raw,
            Token::Literal(literal) => &literal.raw,
            Token::Pipe { .. } => "|",
            Token::End { .. } => "",
        }
    }
}

pub(crate) fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn is_option_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        None => true,
        Some(c) if c.is_ascii_alphabetic() => chars.all(|c| c.is_ascii_alphabetic() || c == '-'),
        Some(_) => false,
    }
}

fn classify(raw: &str) -> LiteralKind {
    if let Some(name) = raw.strip_prefix("--") {
        if is_option_name(name) {
            return LiteralKind::LongOption;
        }
    } else if let Some(name) = raw.strip_prefix('-') {
        if is_option_name(name) {
            return LiteralKind::ShortOption;
        }
    }

    LiteralKind::Word
}

#[derive(Clone)]
struct InputReader<'a> {
    input: &'a str,
    offset: usize,
}

impl<'a> InputReader<'a> {
    pub fn new(input: &'a str) -> InputReader<'a> {
        InputReader { input, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the next character without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.input[self.offset..].chars().next()
    }

    /// Consumes a character from the input.
    pub fn consume(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += c.len_utf8();
        Some(c)
    }

    /// Pushes back the character returned by the last `consume`.
    pub fn unconsume(&mut self, c: char) {
        self.offset -= c.len_utf8();
    }

    /// The text between `start` and the current offset.
    pub fn since(&self, start: usize) -> &'a str {
        &self.input[start..self.offset]
    }
}

/// Splits a line into tokens.
///
/// The tokenizer never fails: an unterminated quote extends the literal to
/// the end of the input and is reported by `ending_delimiter`. Concatenating
/// the `raw` text of every token gives back the input.
#[derive(Clone)]
pub struct Tokenizer<'a> {
    input: InputReader<'a>,
    quoting: Quoting,
    delimiter: Delimiter,
    halted: bool,
}

impl<'a> Tokenizer<'a> {
    /// A tokenizer for shell-style quoting.
    pub fn new(input: &'a str) -> Tokenizer<'a> {
        Tokenizer::with_quoting(input, Quoting::Shell)
    }

    pub fn with_quoting(input: &'a str, quoting: Quoting) -> Tokenizer<'a> {
        Tokenizer {
            input: InputReader::new(input),
            quoting,
            delimiter: quoting.delimiter(),
            halted: false,
        }
    }

    #[inline]
    pub fn quoting(&self) -> Quoting {
        self.quoting
    }

    /// Rewinds to the beginning of the input.
    pub fn restart(&mut self) {
        *self = Tokenizer::with_quoting(self.input.input, self.quoting);
    }

    /// The quoting context at the end of the input, i.e. the context where
    /// the text typed next would go.
    pub fn ending_delimiter(&self) -> Delimiter {
        let mut tokenizer = self.clone();
        while tokenizer.next().is_some() {}
        tokenizer.delimiter
    }

    fn next_token(&mut self) -> Option<Token> {
        if self.halted {
            return None;
        }

        let start = self.input.offset();
        let token = match self.input.peek() {
            None => {
                self.halted = true;
                Token::End { offset: start }
            }
            Some(c) if is_separator(c) => {
                while let Some(c) = self.input.consume() {
                    if !is_separator(c) {
                        self.input.unconsume(c);
                        break;
                    }
                }

                self.delimiter = self.quoting.delimiter();
                Token::Separator {
                    offset: start,
                    raw: self.input.since(start).to_owned(),
                }
            }
            Some('|') => {
                self.input.consume();
                self.delimiter = self.quoting.delimiter();
                Token::Pipe { offset: start }
            }
            Some(_) if self.quoting == Quoting::Plain => Token::Literal(self.visit_plain_literal()),
            Some(_) => Token::Literal(self.visit_literal()),
        };

        Some(token)
    }

    fn visit_plain_literal(&mut self) -> Literal {
        let start = self.input.offset();
        while let Some(c) = self.input.consume() {
            if is_separator(c) || c == '|' {
                self.input.unconsume(c);
                break;
            }
        }

        let raw = self.input.since(start);
        Literal {
            kind: classify(raw),
            offset: start,
            raw: raw.to_owned(),
            value: raw.to_owned(),
        }
    }

    fn visit_literal(&mut self) -> Literal {
        let start = self.input.offset();
        let mut value = String::new();
        let mut quote = Delimiter::Empty;
        while let Some(c) = self.input.consume() {
            match (quote, c) {
                (Delimiter::Empty, c) if is_separator(c) || c == '|' => {
                    self.input.unconsume(c);
                    break;
                }
                (Delimiter::Empty, '\'') => quote = Delimiter::SingleQuote,
                (Delimiter::Empty, '"') => quote = Delimiter::DoubleQuote,
                (Delimiter::SingleQuote, '\'') | (Delimiter::DoubleQuote, '"') => {
                    quote = Delimiter::Empty;
                }
                (Delimiter::SingleQuote, c) => value.push(c),
                // Escaped character.
                (_, '\\') => {
                    let c = self.input.consume().unwrap_or('\\' /* backslash at EOF */);
                    value.push(c);
                }
                (_, c) => value.push(c),
            }
        }

        self.delimiter = quote;
        let raw = self.input.since(start);
        Literal {
            kind: classify(raw),
            offset: start,
            raw: raw.to_owned(),
            value,
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn input_reader() {
        let mut input = InputReader::new("aéc");
        assert_eq!(input.consume(), Some('a'));
        assert_eq!(input.peek(), Some('é'));
        assert_eq!(input.consume(), Some('é'));
        assert_eq!(input.offset(), 3);
        input.unconsume('é');
        assert_eq!(input.consume(), Some('é'));
        assert_eq!(input.consume(), Some('c'));
        assert_eq!(input.consume(), None);
        assert_eq!(input.since(1), "éc");
    }

    #[test]
    fn classification() {
        assert_eq!(classify("-f"), LiteralKind::ShortOption);
        assert_eq!(classify("-"), LiteralKind::ShortOption);
        assert_eq!(classify("--force"), LiteralKind::LongOption);
        assert_eq!(classify("--dry-run"), LiteralKind::LongOption);
        assert_eq!(classify("--"), LiteralKind::LongOption);
        assert_eq!(classify("-1"), LiteralKind::Word);
        assert_eq!(classify("-f=1"), LiteralKind::Word);
        assert_eq!(classify("'-f'"), LiteralKind::Word);
        assert_eq!(classify("a-b"), LiteralKind::Word);
    }

    #[test]
    fn escape() {
        let mut out = String::new();
        Delimiter::Empty.escape("a b'c", &mut out);
        assert_eq!(out, "a\\ b\\'c");

        let mut out = String::new();
        Delimiter::DoubleQuote.escape("say \"hi\"", &mut out);
        assert_eq!(out, "say \\\"hi\\\"");

        let mut out = String::new();
        Delimiter::SingleQuote.escape("it's", &mut out);
        assert_eq!(out, "it'\\''s");
    }
}
