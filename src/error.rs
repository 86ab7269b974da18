// SPDX-License-Identifier: Apache-2.0

//! Crate-wide error aggregate.
//!
//! Each subsystem defines its own error enum (`core::LexError`,
//! `core::CastError`, `persistence::StoreError`, `geom::CursorError`) and
//! this module only wires them together with `#[from]`, the same way the
//! teacher keeps per-component error types instead of a single flat enum.

use crate::core::{CastError, LexError};
use crate::geom::CursorError;
use crate::persistence::StoreError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum Error {
    /// malformed STEP file: {0}
    #[from]
    Lex(LexError),

    /// entity store error: {0}
    #[from]
    Store(StoreError),

    /// attribute cast error: {0}
    #[from]
    Cast(CastError),

    /// geometry iteration error: {0}
    #[from]
    Cursor(CursorError),

    /// failed to open {path}: {source}
    Open { path: String, source: String },
}
