// SPDX-License-Identifier: Apache-2.0

//! Byte-level STEP parsing primitives: the windowed file reader, the lexer,
//! the compact token representation, and the lazily-resolved argument tree.
//!
//! Nothing in this module knows about IFC; it only understands the STEP
//! physical-file grammar (ISO 10303-21). The [`crate::schema`] and
//! [`crate::persistence`] modules build the typed, indexed graph on top.

mod argument;
mod lexer;
mod stream;
mod token;

pub use argument::{parse_arguments, Argument, ArgumentRef, CastError, InlineEntity};
pub use lexer::{LexError, Lexer};
pub use stream::{ByteStream, RandomAccessRead};
pub use token::{LiteralKind, Operator, Token, TokenKind};
