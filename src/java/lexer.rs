//! Tokenizer for Java source.
//!
//! Produces the token stream the declaration parser needs. Ordinary
//! comments are dropped; a `/** ... */` doc comment is attached to the token
//! that follows it.

use std::iter::Peekable;
use std::str::CharIndices;

/// Token category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword.
    Ident,
    /// Integer literal, raw text.
    Int,
    /// Floating-point literal, raw text.
    Float,
    /// String or text block literal, decoded.
    Str,
    /// Character literal, decoded.
    Char,
    /// Operator or separator.
    Punct,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte offset of the first character.
    pub offset: usize,
    /// Byte length in the source.
    pub len: usize,
    /// 1-based line number.
    pub line: u32,
    /// Raw body of the doc comment directly preceding this token.
    pub doc: Option<String>,
}

impl Token {
    pub fn is_punct(&self, p: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == p
    }

    pub fn is_ident(&self, name: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == name
    }
}

/// A tokenizing failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub offset: usize,
    pub len: usize,
}

/// Multi-character punctuators. `>` is always a single token so nested
/// generic argument lists close one level at a time.
const MULTI_PUNCT: &[&str] = &["...", "::", "->", "==", "!=", "<=", "&&", "||", "++", "--"];

/// Tokenize `source`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: u32,
    pending_doc: Option<String>,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Lexer {
            source,
            chars: source.char_indices().peekable(),
            line: 1,
            pending_doc: None,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        while let Some(&(offset, c)) = self.chars.peek() {
            match c {
                '\n' => {
                    self.line += 1;
                    self.chars.next();
                }
                c if c.is_whitespace() => {
                    self.chars.next();
                }
                '/' if self.starts_with(offset, "//") => self.skip_line(),
                '/' if self.starts_with(offset, "/*") => self.block_comment(offset)?,
                '"' if self.starts_with(offset, "\"\"\"") => self.text_block(offset)?,
                '"' => self.string(offset)?,
                '\'' => self.char_literal(offset)?,
                c if c.is_ascii_digit() => self.number(offset),
                '.' if self.next_is_digit(offset) => self.number(offset),
                c if is_ident_start(c) => self.ident(offset),
                _ => self.punct(offset),
            }
        }

        let end = self.source.len();
        self.push(TokenKind::Eof, String::new(), end, 0, self.line);
        Ok(self.tokens)
    }

    fn starts_with(&self, offset: usize, s: &str) -> bool {
        self.source[offset..].starts_with(s)
    }

    fn next_is_digit(&self, offset: usize) -> bool {
        self.source[offset + 1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
    }

    fn push(&mut self, kind: TokenKind, text: String, offset: usize, len: usize, line: u32) {
        let doc = self.pending_doc.take();
        self.tokens.push(Token {
            kind,
            text,
            offset,
            len,
            line,
            doc,
        });
    }

    fn skip_line(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if c == '\n' {
                break;
            }
            self.chars.next();
        }
    }

    fn block_comment(&mut self, start: usize) -> Result<(), LexError> {
        let is_doc = self.starts_with(start, "/**") && !self.starts_with(start, "/**/");
        self.chars.next();
        self.chars.next();

        let body_start = start + 2;
        loop {
            match self.chars.next() {
                Some((i, '*')) if self.starts_with(i, "*/") => {
                    self.chars.next();
                    if is_doc {
                        self.pending_doc = Some(self.source[body_start + 1..i].to_string());
                    }
                    return Ok(());
                }
                Some((_, '\n')) => self.line += 1,
                Some(_) => {}
                None => {
                    return Err(LexError {
                        message: "unterminated comment".into(),
                        offset: start,
                        len: 2,
                    })
                }
            }
        }
    }

    fn string(&mut self, start: usize) -> Result<(), LexError> {
        let line = self.line;
        self.chars.next();
        let mut value = String::new();

        loop {
            match self.chars.next() {
                Some((end, '"')) => {
                    self.push(TokenKind::Str, value, start, end + 1 - start, line);
                    return Ok(());
                }
                Some((i, '\\')) => value.push(self.escape(i)?),
                Some((_, '\n')) | None => {
                    return Err(LexError {
                        message: "unterminated string literal".into(),
                        offset: start,
                        len: 1,
                    })
                }
                Some((_, c)) => value.push(c),
            }
        }
    }

    fn text_block(&mut self, start: usize) -> Result<(), LexError> {
        let line = self.line;
        for _ in 0..3 {
            self.chars.next();
        }

        let mut raw = String::new();
        loop {
            match self.chars.next() {
                Some((i, '"')) if self.starts_with(i, "\"\"\"") => {
                    self.chars.next();
                    self.chars.next();
                    let value = strip_text_block(&raw);
                    self.push(TokenKind::Str, value, start, i + 3 - start, line);
                    return Ok(());
                }
                Some((i, '\\')) => raw.push(self.escape(i)?),
                Some((_, '\n')) => {
                    self.line += 1;
                    raw.push('\n');
                }
                Some((_, c)) => raw.push(c),
                None => {
                    return Err(LexError {
                        message: "unterminated text block".into(),
                        offset: start,
                        len: 3,
                    })
                }
            }
        }
    }

    fn char_literal(&mut self, start: usize) -> Result<(), LexError> {
        let line = self.line;
        self.chars.next();

        let value = match self.chars.next() {
            Some((i, '\\')) => self.escape(i)?,
            Some((_, c)) if c != '\'' && c != '\n' => c,
            _ => {
                return Err(LexError {
                    message: "malformed character literal".into(),
                    offset: start,
                    len: 1,
                })
            }
        };

        match self.chars.next() {
            Some((end, '\'')) => {
                self.push(TokenKind::Char, value.to_string(), start, end + 1 - start, line);
                Ok(())
            }
            _ => Err(LexError {
                message: "unterminated character literal".into(),
                offset: start,
                len: 1,
            }),
        }
    }

    /// Decode the escape sequence whose backslash is at `at`.
    fn escape(&mut self, at: usize) -> Result<char, LexError> {
        let bad = |message: &str| LexError {
            message: message.to_string(),
            offset: at,
            len: 2,
        };

        let (_, c) = self.chars.next().ok_or_else(|| bad("unterminated escape"))?;
        let decoded = match c {
            'b' => '\u{8}',
            't' => '\t',
            'n' => '\n',
            'f' => '\u{c}',
            'r' => '\r',
            's' => ' ',
            '"' => '"',
            '\'' => '\'',
            '\\' => '\\',
            '\n' => {
                // Line continuation inside text blocks
                self.line += 1;
                return Ok('\u{0}');
            }
            'u' => {
                while self.chars.peek().map(|&(_, c)| c) == Some('u') {
                    self.chars.next();
                }
                let mut code = String::new();
                for _ in 0..4 {
                    let (_, h) = self.chars.next().ok_or_else(|| bad("short unicode escape"))?;
                    code.push(h);
                }
                u32::from_str_radix(&code, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| bad("invalid unicode escape"))?
            }
            '0'..='7' => {
                let mut value = c.to_digit(8).unwrap_or(0);
                let max_digits = if c <= '3' { 2 } else { 1 };
                for _ in 0..max_digits {
                    match self.chars.peek().and_then(|&(_, d)| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            self.chars.next();
                        }
                        None => break,
                    }
                }
                char::from_u32(value).ok_or_else(|| bad("invalid octal escape"))?
            }
            _ => return Err(bad("invalid escape sequence")),
        };
        Ok(decoded)
    }

    fn number(&mut self, start: usize) {
        let line = self.line;
        let is_hex = self.starts_with(start, "0x") || self.starts_with(start, "0X");
        let mut end = start;
        let mut prev = '\0';

        while let Some(&(i, c)) = self.chars.peek() {
            let exponent_sign = (c == '+' || c == '-')
                && ((!is_hex && matches!(prev, 'e' | 'E')) || (is_hex && matches!(prev, 'p' | 'P')));
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || exponent_sign {
                // `1.` followed by a method name is not part of the literal
                if c == '.'
                    && !self.next_is_digit(i)
                    && self.source[i + 1..].starts_with(|n: char| n.is_alphabetic())
                {
                    break;
                }
                end = i + c.len_utf8();
                prev = c;
                self.chars.next();
            } else {
                break;
            }
        }

        let text = self.source[start..end].to_string();
        let kind = if is_float_literal(&text) {
            TokenKind::Float
        } else {
            TokenKind::Int
        };
        self.push(kind, text, start, end - start, line);
    }

    fn ident(&mut self, start: usize) {
        let line = self.line;
        let mut end = start;
        while let Some(&(i, c)) = self.chars.peek() {
            if is_ident_part(c) {
                end = i + c.len_utf8();
                self.chars.next();
            } else {
                break;
            }
        }
        let text = self.source[start..end].to_string();
        self.push(TokenKind::Ident, text, start, end - start, line);
    }

    fn punct(&mut self, start: usize) {
        let line = self.line;
        for p in MULTI_PUNCT {
            if self.starts_with(start, p) {
                for _ in 0..p.len() {
                    self.chars.next();
                }
                self.push(TokenKind::Punct, (*p).to_string(), start, p.len(), line);
                return;
            }
        }

        if let Some((_, c)) = self.chars.next() {
            self.push(TokenKind::Punct, c.to_string(), start, c.len_utf8(), line);
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn is_float_literal(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    if lower.starts_with("0x") {
        return lower.contains('p');
    }
    lower.contains('.')
        || lower.contains('e')
        || lower.ends_with('f')
        || lower.ends_with('d')
}

/// Remove the incidental indentation of a text block body.
fn strip_text_block(raw: &str) -> String {
    let raw = raw.replace('\u{0}', "");
    // Content starts after the line terminator following the opening delimiter
    let body = match raw.find('\n') {
        Some(i) => &raw[i + 1..],
        None => raw.as_str(),
    };

    let lines: Vec<&str> = body.split('\n').collect();
    let indent = lines
        .iter()
        .enumerate()
        .filter(|(i, l)| !l.trim().is_empty() || *i == lines.len() - 1)
        .map(|(_, l)| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let stripped: Vec<&str> = lines
        .iter()
        .map(|l| if l.len() >= indent { l[indent..].trim_end() } else { l.trim() })
        .collect();
    stripped.join("\n")
}
