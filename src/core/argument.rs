// SPDX-License-Identifier: Apache-2.0

//! The lazy argument tree (§4.C): a scalar token, a nested list, or an
//! inline entity, built on demand by pumping the lexer until the matching
//! closing parenthesis. Casts are applied on demand against the raw token,
//! re-reading its text from the file rather than keeping an owned copy.

use crate::core::lexer::{LexError, Lexer};
use crate::core::stream::RandomAccessRead;
use crate::core::token::{LiteralKind, Operator, Token, TokenKind};

/// An inline, anonymous instance used when a typed SELECT wraps a scalar,
/// e.g. `IFCTEXT('foo')` or `IFCPARAMETERVALUE(0.)`.
#[derive(Clone, Debug, PartialEq)]
pub struct InlineEntity {
    pub keyword: String,
    pub value: Box<Argument>,
}

/// One node of the per-instance argument tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Argument {
    Scalar(Token),
    List(Vec<Argument>),
    Inline(InlineEntity),
}

/// A handle usable from generated accessors to reach the `i`-th top-level
/// argument of an instance without re-deriving slice indexing logic at every
/// call site.
pub type ArgumentRef<'a> = &'a Argument;

#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum CastError {
    /// argument is null ($).
    Null,

    /// argument is the inherited marker (*), not a concrete value.
    Inherited,

    /// expected a list argument, found a scalar or inline entity.
    NotAList,

    /// expected a scalar argument, found a list.
    NotAScalar,

    /// "{0}" is not a valid integer.
    NotAnInteger(String),

    /// "{0}" is not a valid real number.
    NotAReal(String),

    /// "{0}" is not a valid boolean (.T./.F.).
    NotABoolean(String),

    /// "{0}" is not a valid enumeration (.NAME.).
    NotAnEnum(String),

    /// "{0}" is not an entity reference (#n).
    NotAReference(String),

    /// unexpected operator token in argument position.
    UnexpectedOperator,

    /// unterminated argument list.
    Unterminated,

    #[display(inner)]
    #[from]
    Lex(LexError),
}

impl Argument {
    pub fn is_null(&self) -> bool {
        matches!(self, Argument::Scalar(tok) if tok.is_operator(Operator::Dollar))
    }

    pub fn is_inherited(&self) -> bool {
        matches!(self, Argument::Scalar(tok) if tok.is_operator(Operator::Star))
    }

    pub fn as_list(&self) -> Result<&[Argument], CastError> {
        match self {
            Argument::List(items) => Ok(items),
            _ => Err(CastError::NotAList),
        }
    }

    fn scalar_token(&self) -> Result<Token, CastError> {
        match self {
            Argument::Scalar(tok) => Ok(*tok),
            Argument::List(_) => Err(CastError::NotAScalar),
            Argument::Inline(_) => Err(CastError::NotAScalar),
        }
    }

    fn literal_text<R: RandomAccessRead>(
        &self,
        lexer: &mut Lexer<R>,
    ) -> Result<(LiteralKind, String), CastError> {
        let tok = self.scalar_token()?;
        if tok.is_operator(Operator::Dollar) {
            return Err(CastError::Null);
        }
        if tok.is_operator(Operator::Star) {
            return Err(CastError::Inherited);
        }
        let offset = match tok.kind() {
            TokenKind::Literal(offset) => offset,
            TokenKind::Op(_) => return Err(CastError::UnexpectedOperator),
        };
        Ok(lexer.token_text(offset)?)
    }

    pub fn as_int<R: RandomAccessRead>(&self, lexer: &mut Lexer<R>) -> Result<i64, CastError> {
        let (_, text) = self.literal_text(lexer)?;
        text.parse::<i64>().map_err(|_| CastError::NotAnInteger(text))
    }

    pub fn as_real<R: RandomAccessRead>(&self, lexer: &mut Lexer<R>) -> Result<f64, CastError> {
        let (_, text) = self.literal_text(lexer)?;
        text.parse::<f64>().map_err(|_| CastError::NotAReal(text))
    }

    pub fn as_bool<R: RandomAccessRead>(&self, lexer: &mut Lexer<R>) -> Result<bool, CastError> {
        let (kind, text) = self.literal_text(lexer)?;
        if kind != LiteralKind::Boolean {
            return Err(CastError::NotABoolean(text));
        }
        match text.as_str() {
            "T" => Ok(true),
            "F" => Ok(false),
            _ => Err(CastError::NotABoolean(text)),
        }
    }

    pub fn as_string<R: RandomAccessRead>(&self, lexer: &mut Lexer<R>) -> Result<String, CastError> {
        let (_, text) = self.literal_text(lexer)?;
        Ok(text)
    }

    pub fn as_enum<R: RandomAccessRead>(&self, lexer: &mut Lexer<R>) -> Result<String, CastError> {
        let (kind, text) = self.literal_text(lexer)?;
        if kind != LiteralKind::Enumeration {
            return Err(CastError::NotAnEnum(text));
        }
        Ok(text)
    }

    /// The referenced instance id, for a `#n` argument.
    pub fn as_reference<R: RandomAccessRead>(&self, lexer: &mut Lexer<R>) -> Result<u64, CastError> {
        let (kind, text) = self.literal_text(lexer)?;
        if kind != LiteralKind::Identifier || !text.starts_with('#') {
            return Err(CastError::NotAReference(text));
        }
        text[1..].parse::<u64>().map_err(|_| CastError::NotAReference(text))
    }
}

/// Parse a parenthesized argument list, with the cursor positioned right
/// after the opening `(`. Every `#n` reference encountered is appended to
/// `refs_out` so the caller can update the inverse index.
pub fn parse_arguments<R: RandomAccessRead>(
    lexer: &mut Lexer<R>,
    refs_out: &mut Vec<u64>,
) -> Result<Vec<Argument>, CastError> {
    let mut args = Vec::new();
    loop {
        let tok = lexer.next_token()?.ok_or(CastError::Unterminated)?;
        if tok.is_operator(Operator::RParen) {
            break;
        }
        let arg = parse_one_argument(lexer, tok, refs_out)?;
        args.push(arg);
        match lexer.next_token()?.ok_or(CastError::Unterminated)? {
            t if t.is_operator(Operator::Comma) => continue,
            t if t.is_operator(Operator::RParen) => break,
            _ => return Err(CastError::Unterminated),
        }
    }
    Ok(args)
}

fn parse_one_argument<R: RandomAccessRead>(
    lexer: &mut Lexer<R>,
    tok: Token,
    refs_out: &mut Vec<u64>,
) -> Result<Argument, CastError> {
    match tok.kind() {
        TokenKind::Op(Operator::Dollar) | TokenKind::Op(Operator::Star) => Ok(Argument::Scalar(tok)),
        TokenKind::Op(Operator::LParen) => {
            let items = parse_arguments(lexer, refs_out)?;
            Ok(Argument::List(items))
        }
        TokenKind::Op(_) => Err(CastError::UnexpectedOperator),
        TokenKind::Literal(offset) => {
            let (kind, text) = lexer.token_text(offset)?;
            if kind == LiteralKind::Identifier {
                if let Ok(id) = text[1..].parse::<u64>() {
                    refs_out.push(id);
                }
            }
            if kind != LiteralKind::Keyword {
                return Ok(Argument::Scalar(tok));
            }
            // A keyword immediately followed by '(' is an inline entity
            // (SELECT wrapping, e.g. IFCTEXT('foo')).
            let save = lexer.tell();
            match lexer.next_token()? {
                Some(next) if next.is_operator(Operator::LParen) => {
                    let inner = parse_arguments(lexer, refs_out)?;
                    let value = if inner.len() == 1 {
                        inner.into_iter().next().unwrap()
                    } else {
                        Argument::List(inner)
                    };
                    Ok(Argument::Inline(InlineEntity { keyword: text, value: Box::new(value) }))
                }
                _ => {
                    lexer.seek(save)?;
                    Ok(Argument::Scalar(tok))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::stream::ByteStream;
    use std::io::Cursor;

    fn parse(src: &str) -> (Vec<Argument>, Lexer<Cursor<Vec<u8>>>, Vec<u64>) {
        let mut lexer = Lexer::new(ByteStream::from_bytes(src.as_bytes().to_vec()).unwrap());
        // caller passes the body without the enclosing parens; simulate having
        // just consumed the opening '('.
        let mut refs = Vec::new();
        let args = parse_arguments(&mut lexer, &mut refs).unwrap();
        (args, lexer, refs)
    }

    #[test]
    fn direction_vector_of_reals() {
        let (args, mut lexer, _) = parse("(1.,0.,0.));");
        assert_eq!(args.len(), 1);
        let list = args[0].as_list().unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].as_real(&mut lexer).unwrap(), 1.0);
        assert_eq!(list[1].as_real(&mut lexer).unwrap(), 0.0);
    }

    #[test]
    fn null_and_reference_and_reflist() {
        let (args, mut lexer, refs) = parse("#1,#2,$);");
        assert_eq!(args[0].as_reference(&mut lexer).unwrap(), 1);
        assert_eq!(args[1].as_reference(&mut lexer).unwrap(), 2);
        assert!(args[2].is_null());
        assert_eq!(refs, vec![1, 2]);
    }

    #[test]
    fn inline_typed_value() {
        let (args, mut lexer, _) = parse("IFCTEXT('foo'));");
        match &args[0] {
            Argument::Inline(inline) => {
                assert_eq!(inline.keyword, "IFCTEXT");
                assert_eq!(inline.value.as_string(&mut lexer).unwrap(), "foo");
            }
            other => panic!("expected inline entity, got {other:?}"),
        }
    }

    #[test]
    fn inherited_marker_is_distinct_from_null() {
        let (args, _lexer, _) = parse("*,$);");
        assert!(args[0].is_inherited());
        assert!(!args[0].is_null());
        assert!(args[1].is_null());
        assert!(!args[1].is_inherited());
    }
}
