// SPDX-License-Identifier: Apache-2.0

//! The STEP lexer (§4.B): turns a byte stream into a sequence of tokens,
//! skipping whitespace and block comments outside of string literals, and
//! re-reading a literal's text on demand from its recorded offset.

use std::io;

use crate::core::stream::ByteStream;
use crate::core::token::{LiteralKind, Operator, Token};

#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum LexError {
    /// unexpected end of file while scanning a literal starting at offset {0}.
    UnterminatedLiteral(u64),

    /// unterminated block comment starting at offset {0}.
    UnterminatedComment(u64),

    #[display(inner)]
    #[from]
    Io(IoErrorDisplay),
}

/// `io::Error` isn't `Clone`/`Eq`, which the rest of this crate's error
/// enums rely on for testability; we keep only its rendered message.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct IoErrorDisplay(pub String);

impl std::fmt::Display for IoErrorDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

impl From<io::Error> for IoErrorDisplay {
    fn from(err: io::Error) -> Self { IoErrorDisplay(err.to_string()) }
}

impl From<io::Error> for LexError {
    fn from(err: io::Error) -> Self { LexError::Io(IoErrorDisplay::from(err)) }
}

fn is_ws(b: u8) -> bool { matches!(b, b' ' | b'\r' | b'\n' | b'\t') }

fn is_delimiter(b: u8) -> bool { Operator::from_byte(b).is_some() || is_ws(b) || b == b'\'' }

pub struct Lexer<R> {
    stream: ByteStream<R>,
}

impl<R: crate::core::stream::RandomAccessRead> Lexer<R> {
    pub fn new(stream: ByteStream<R>) -> Self { Lexer { stream } }

    pub fn tell(&self) -> u64 { self.stream.tell() }

    pub fn seek(&mut self, offset: u64) -> Result<(), LexError> {
        self.stream.seek(offset)?;
        Ok(())
    }

    pub fn is_eof(&self) -> bool { self.stream.is_eof() }

    /// Skip whitespace and `/* ... */` comments. Returns once the cursor
    /// sits on meaningful content or at EOF.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.stream.peek()? {
                Some(b) if is_ws(b) => {
                    self.stream.advance()?;
                }
                Some(b'/') => {
                    let start = self.stream.tell();
                    // Lookahead without consuming unless it really is a comment.
                    self.stream.advance()?;
                    match self.stream.peek()? {
                        Some(b'*') => {
                            self.stream.advance()?;
                            self.skip_comment_body(start)?;
                        }
                        _ => {
                            // Not a comment; STEP has no bare '/' operator, so this
                            // is malformed input, but we leave recovery to the
                            // caller that asked for a token and got garbage.
                            self.stream.seek(start)?;
                            return Ok(());
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn skip_comment_body(&mut self, start: u64) -> Result<(), LexError> {
        loop {
            match self.stream.peek()? {
                None => return Err(LexError::UnterminatedComment(start)),
                Some(b'*') => {
                    self.stream.advance()?;
                    if self.stream.peek()? == Some(b'/') {
                        self.stream.advance()?;
                        return Ok(());
                    }
                }
                Some(_) => {
                    self.stream.advance()?;
                }
            }
        }
    }

    /// Produce the next token, or `None` at end of file.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_trivia()?;
        let Some(b) = self.stream.peek()? else { return Ok(None) };

        if let Some(op) = Operator::from_byte(b) {
            self.stream.advance()?;
            return Ok(Some(Token::op(op)));
        }

        let offset = self.stream.tell();
        self.scan_literal_extent(offset)?;
        Ok(Some(Token::literal(offset)))
    }

    /// Advance the stream cursor past the literal starting at `offset`,
    /// without building its text. Used both while lexing forward and while
    /// balancing parentheses during the initial entity scan (§4.D).
    fn scan_literal_extent(&mut self, offset: u64) -> Result<(), LexError> {
        match self.stream.peek()? {
            Some(b'\'') => self.scan_string(offset),
            Some(b'.') => self.scan_enum(offset),
            Some(b'#') => {
                self.stream.advance()?;
                self.scan_run_io()?;
                Ok(())
            }
            _ => {
                self.scan_run_io()?;
                Ok(())
            }
        }
    }

    fn scan_string(&mut self, offset: u64) -> Result<(), LexError> {
        self.stream.advance()?; // opening quote
        loop {
            match self.stream.peek()? {
                None => return Err(LexError::UnterminatedLiteral(offset)),
                Some(b'\'') => {
                    self.stream.advance()?;
                    if self.stream.peek()? == Some(b'\'') {
                        self.stream.advance()?; // doubled quote: literal '
                        continue;
                    }
                    return Ok(());
                }
                Some(_) => {
                    self.stream.advance()?;
                }
            }
        }
    }

    fn scan_enum(&mut self, offset: u64) -> Result<(), LexError> {
        self.stream.advance()?; // opening dot
        loop {
            match self.stream.peek()? {
                None => return Err(LexError::UnterminatedLiteral(offset)),
                Some(b'.') => {
                    self.stream.advance()?;
                    return Ok(());
                }
                Some(_) => {
                    self.stream.advance()?;
                }
            }
        }
    }

    /// Consume a maximal run of non-delimiter bytes (identifiers, numbers,
    /// and datatype keywords all fall out of this one rule).
    fn scan_run_io(&mut self) -> Result<(), LexError> {
        loop {
            match self.stream.peek()? {
                Some(b) if !is_delimiter(b) => {
                    self.stream.advance()?;
                }
                _ => return Ok(()),
            }
        }
    }

    /// Re-read the literal starting at `offset`, classifying it and
    /// stripping surrounding punctuation for strings and enumerations.
    /// Leaves the stream's forward cursor where it was before the call.
    pub fn token_text(&mut self, offset: u64) -> Result<(LiteralKind, String), LexError> {
        let saved = self.stream.tell();
        self.stream.seek(offset)?;
        let first = self.stream.peek()?;
        let (kind, text) = match first {
            Some(b'\'') => {
                self.stream.advance()?;
                let mut s = String::new();
                loop {
                    match self.stream.peek()? {
                        None => return Err(LexError::UnterminatedLiteral(offset)),
                        Some(b'\'') => {
                            self.stream.advance()?;
                            if self.stream.peek()? == Some(b'\'') {
                                s.push('\'');
                                self.stream.advance()?;
                                continue;
                            }
                            break;
                        }
                        Some(b) => {
                            s.push(b as char);
                            self.stream.advance()?;
                        }
                    }
                }
                (LiteralKind::String, s)
            }
            Some(b'.') => {
                self.stream.advance()?;
                let mut s = String::new();
                loop {
                    match self.stream.peek()? {
                        None => return Err(LexError::UnterminatedLiteral(offset)),
                        Some(b'.') => {
                            self.stream.advance()?;
                            break;
                        }
                        Some(b) => {
                            s.push(b as char);
                            self.stream.advance()?;
                        }
                    }
                }
                let kind = if s == "T" || s == "F" { LiteralKind::Boolean } else { LiteralKind::Enumeration };
                (kind, s)
            }
            _ => {
                let mut s = String::new();
                loop {
                    match self.stream.peek()? {
                        Some(b) if !is_delimiter(b) => {
                            s.push(b as char);
                            self.stream.advance()?;
                        }
                        _ => break,
                    }
                }
                let kind = classify_bare(&s);
                (kind, s)
            }
        };
        self.stream.seek(saved)?;
        Ok((kind, text))
    }
}

fn classify_bare(s: &str) -> LiteralKind {
    if s.starts_with('#') {
        return LiteralKind::Identifier;
    }
    let digits_only = |body: &str| !body.is_empty() && body.chars().all(|c| c.is_ascii_digit());
    let body = s.strip_prefix('-').unwrap_or(s);
    if digits_only(body) {
        return LiteralKind::Integer;
    }
    if let Some((mantissa, _)) = split_exponent(body) {
        if looks_real(mantissa) {
            return LiteralKind::Real;
        }
    }
    if looks_real(body) {
        return LiteralKind::Real;
    }
    LiteralKind::Keyword
}

fn split_exponent(s: &str) -> Option<(&str, &str)> {
    s.find(['e', 'E']).map(|idx| (&s[..idx], &s[idx + 1..]))
}

fn looks_real(mantissa: &str) -> bool {
    let Some((int_part, frac_part)) = mantissa.split_once('.') else { return false };
    !int_part.is_empty()
        && int_part.chars().all(|c| c.is_ascii_digit())
        && frac_part.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::stream::ByteStream;

    fn lexer(src: &str) -> Lexer<std::io::Cursor<Vec<u8>>> {
        Lexer::new(ByteStream::from_bytes(src.as_bytes().to_vec()).unwrap())
    }

    #[test]
    fn operators_are_single_char_tokens() {
        let mut lx = lexer("(),;$*=");
        let ops = [
            Operator::LParen,
            Operator::RParen,
            Operator::Comma,
            Operator::Semi,
            Operator::Dollar,
            Operator::Star,
            Operator::Eq,
        ];
        for op in ops {
            let tok = lx.next_token().unwrap().unwrap();
            assert_eq!(tok.as_operator(), Some(op));
        }
        assert!(lx.next_token().unwrap().is_none());
    }

    #[test]
    fn string_with_doubled_quote_escape() {
        let mut lx = lexer("'it''s fine'");
        let tok = lx.next_token().unwrap().unwrap();
        let offset = tok.as_offset().unwrap();
        let (kind, text) = lx.token_text(offset).unwrap();
        assert_eq!(kind, LiteralKind::String);
        assert_eq!(text, "it's fine");
    }

    #[test]
    fn enum_and_boolean_literals() {
        let mut lx = lexer(".METRE. .T. .F.");
        for (expected_kind, expected_text) in
            [(LiteralKind::Enumeration, "METRE"), (LiteralKind::Boolean, "T"), (LiteralKind::Boolean, "F")]
        {
            let tok = lx.next_token().unwrap().unwrap();
            let (kind, text) = lx.token_text(tok.as_offset().unwrap()).unwrap();
            assert_eq!(kind, expected_kind);
            assert_eq!(text, expected_text);
        }
    }

    #[test]
    fn numbers_and_identifiers() {
        let mut lx = lexer("#42 -1.5 3 1.0E-3 IFCWALL");
        let expectations = [
            (LiteralKind::Identifier, "#42"),
            (LiteralKind::Real, "-1.5"),
            (LiteralKind::Integer, "3"),
            (LiteralKind::Real, "1.0E-3"),
            (LiteralKind::Keyword, "IFCWALL"),
        ];
        for (expected_kind, expected_text) in expectations {
            let tok = lx.next_token().unwrap().unwrap();
            let (kind, text) = lx.token_text(tok.as_offset().unwrap()).unwrap();
            assert_eq!(kind, expected_kind);
            assert_eq!(text, expected_text);
        }
    }

    #[test]
    fn block_comments_are_skipped() {
        let mut lx = lexer("& /* a comment */ &");
        let first = lx.next_token().unwrap().unwrap();
        assert_eq!(first.as_operator(), None); // '&' isn't a STEP operator; literal run
        let second = lx.next_token().unwrap().unwrap();
        assert_eq!(second.as_operator(), None);
    }

    #[test]
    fn token_text_does_not_move_forward_cursor() {
        let mut lx = lexer("#1 #2");
        let first = lx.next_token().unwrap().unwrap();
        let before = lx.tell();
        let _ = lx.token_text(first.as_offset().unwrap()).unwrap();
        assert_eq!(lx.tell(), before);
    }
}
