//! Query Lexer Module
//!
//! Turns an expression string into a token stream. Every token carries the
//! byte offset it started at so parse errors can point back into the source.
//!
//! Three literal forms exist and they are easy to confuse in datasets whose
//! field names contain slashes: `"part/name"` is a quoted identifier (field
//! access), `'part/name'` is a raw string, and `` `part/name` `` is a JSON
//! literal with a legacy fallback that reads an unparsable body as a string.

use serde_json::Value;

use super::QueryError;

// == Tokens ==
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Identifier(String),
    QuotedIdentifier(String),
    RawString(String),
    Literal(Value),
    Number(i64),
    Dot,
    Star,
    Comma,
    Colon,
    At,
    Ampersand,
    And,
    Pipe,
    Or,
    Not,
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Lbracket,
    Rbracket,
    Lbrace,
    Rbrace,
    Lparen,
    Rparen,
    /// `[?`, with no whitespace between the characters
    Filter,
    /// `[]`, with no whitespace between the characters
    Flatten,
    Eof,
}

/// A token plus the byte offset of its first character.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SpannedToken {
    pub token: Token,
    pub offset: usize,
}

/// Tokenizes an expression. The returned stream always ends with [`Token::Eof`].
pub(crate) fn tokenize(input: &str) -> Result<Vec<SpannedToken>, QueryError> {
    Lexer::new(input).run()
}

// == Lexer ==
struct Lexer<'a> {
    input: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
    tokens: Vec<SpannedToken>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Lexer {
            input,
            chars: input.char_indices().collect(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<SpannedToken>, QueryError> {
        while let Some((offset, c)) = self.current() {
            match c {
                ' ' | '\t' | '\n' | '\r' => self.pos += 1,
                'a'..='z' | 'A'..='Z' | '_' => self.identifier(offset),
                '0'..='9' | '-' => self.number(offset)?,
                '"' => self.quoted_identifier(offset)?,
                '\'' => self.raw_string(offset)?,
                '`' => self.literal(offset)?,
                '.' => self.single(Token::Dot, offset),
                '*' => self.single(Token::Star, offset),
                ',' => self.single(Token::Comma, offset),
                ':' => self.single(Token::Colon, offset),
                '@' => self.single(Token::At, offset),
                '(' => self.single(Token::Lparen, offset),
                ')' => self.single(Token::Rparen, offset),
                '{' => self.single(Token::Lbrace, offset),
                '}' => self.single(Token::Rbrace, offset),
                ']' => self.single(Token::Rbracket, offset),
                // The two-character forms only count when the second
                // character is immediately adjacent
                '[' => match self.peek_char(1) {
                    Some('?') => self.double(Token::Filter, offset),
                    Some(']') => self.double(Token::Flatten, offset),
                    _ => self.single(Token::Lbracket, offset),
                },
                '|' => self.one_or_two('|', Token::Pipe, Token::Or, offset),
                '&' => self.one_or_two('&', Token::Ampersand, Token::And, offset),
                '!' => self.one_or_two('=', Token::Not, Token::Ne, offset),
                '<' => self.one_or_two('=', Token::Lt, Token::Lte, offset),
                '>' => self.one_or_two('=', Token::Gt, Token::Gte, offset),
                '=' => {
                    if self.peek_char(1) == Some('=') {
                        self.double(Token::Eq, offset);
                    } else {
                        return Err(QueryError::syntax(
                            offset,
                            "unexpected character '=', did you mean '=='?",
                        ));
                    }
                }
                other => {
                    return Err(QueryError::syntax(
                        offset,
                        format!("unexpected character '{}'", other),
                    ));
                }
            }
        }

        self.tokens.push(SpannedToken {
            token: Token::Eof,
            offset: self.input.len(),
        });
        Ok(self.tokens)
    }

    fn current(&self) -> Option<(usize, char)> {
        self.chars.get(self.pos).copied()
    }

    fn peek_char(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).map(|(_, c)| *c)
    }

    fn push(&mut self, token: Token, offset: usize) {
        self.tokens.push(SpannedToken { token, offset });
    }

    fn single(&mut self, token: Token, offset: usize) {
        self.push(token, offset);
        self.pos += 1;
    }

    fn double(&mut self, token: Token, offset: usize) {
        self.push(token, offset);
        self.pos += 2;
    }

    fn one_or_two(&mut self, follow: char, single: Token, double: Token, offset: usize) {
        if self.peek_char(1) == Some(follow) {
            self.double(double, offset);
        } else {
            self.single(single, offset);
        }
    }

    fn identifier(&mut self, offset: usize) {
        let mut end = self.pos;
        while matches!(
            self.chars.get(end),
            Some((_, c)) if c.is_ascii_alphanumeric() || *c == '_'
        ) {
            end += 1;
        }

        let name: String = self.chars[self.pos..end].iter().map(|(_, c)| *c).collect();
        self.push(Token::Identifier(name), offset);
        self.pos = end;
    }

    fn number(&mut self, offset: usize) -> Result<(), QueryError> {
        let mut end = self.pos;
        if matches!(self.chars.get(end), Some((_, '-'))) {
            end += 1;
        }
        let digits_start = end;
        while matches!(self.chars.get(end), Some((_, c)) if c.is_ascii_digit()) {
            end += 1;
        }
        if end == digits_start {
            return Err(QueryError::syntax(offset, "expected digits after '-'"));
        }

        let text: String = self.chars[self.pos..end].iter().map(|(_, c)| *c).collect();
        let value = text
            .parse::<i64>()
            .map_err(|_| QueryError::syntax(offset, format!("invalid number '{}'", text)))?;
        self.push(Token::Number(value), offset);
        self.pos = end;
        Ok(())
    }

    /// Scans from the opening delimiter at `self.pos` to the matching
    /// unescaped closing delimiter, returning its index into `chars`.
    fn closing_delimiter(&self, offset: usize, delimiter: char) -> Result<usize, QueryError> {
        let mut index = self.pos + 1;
        while let Some((_, c)) = self.chars.get(index) {
            if *c == '\\' {
                index += 2;
                continue;
            }
            if *c == delimiter {
                return Ok(index);
            }
            index += 1;
        }
        Err(QueryError::syntax(
            offset,
            format!("unclosed delimiter '{}'", delimiter),
        ))
    }

    /// Quoted identifiers are full JSON strings, so escapes like `\"` and
    /// `é` resolve the same way they would in a JSON document.
    fn quoted_identifier(&mut self, offset: usize) -> Result<(), QueryError> {
        let end = self.closing_delimiter(offset, '"')?;
        let span = &self.input[offset..self.chars[end].0 + 1];
        let name = serde_json::from_str::<String>(span)
            .map_err(|_| QueryError::syntax(offset, format!("invalid quoted identifier {}", span)))?;

        self.push(Token::QuotedIdentifier(name), offset);
        self.pos = end + 1;
        Ok(())
    }

    /// Raw strings pass their bytes through untouched except for `\'`; every
    /// other backslash stays literal.
    fn raw_string(&mut self, offset: usize) -> Result<(), QueryError> {
        let end = self.closing_delimiter(offset, '\'')?;
        let inner = &self.input[self.chars[self.pos].0 + 1..self.chars[end].0];
        let text = inner.replace("\\'", "'");

        self.push(Token::RawString(text), offset);
        self.pos = end + 1;
        Ok(())
    }

    /// Backtick literals hold a JSON document. A body that fails to parse is
    /// retried as a bare string, so `` `foo` `` means `"foo"`.
    fn literal(&mut self, offset: usize) -> Result<(), QueryError> {
        let end = self.closing_delimiter(offset, '`')?;
        let inner = self.input[self.chars[self.pos].0 + 1..self.chars[end].0].replace("\\`", "`");

        let value = match serde_json::from_str::<Value>(&inner) {
            Ok(value) => value,
            Err(_) => serde_json::from_str::<Value>(&format!("\"{}\"", inner)).map_err(|_| {
                QueryError::syntax(offset, format!("invalid literal `{}`", inner))
            })?,
        };

        self.push(Token::Literal(value), offset);
        self.pos = end + 1;
        Ok(())
    }
}
