// SPDX-License-Identifier: Apache-2.0

//! One free function per attribute shape the entity façades need. Kept
//! separate from [`crate::core::Argument`]'s own casts because these know
//! about [`InstanceId`] and null-tolerant optionality, which are schema-
//! level, not grammar-level, concerns.

use crate::core::{Argument, CastError, Lexer, RandomAccessRead};
use crate::persistence::InstanceId;

pub fn int<R: RandomAccessRead>(a: &Argument, l: &mut Lexer<R>) -> Result<i64, CastError> { a.as_int(l) }

pub fn real<R: RandomAccessRead>(a: &Argument, l: &mut Lexer<R>) -> Result<f64, CastError> { a.as_real(l) }

pub fn boolean<R: RandomAccessRead>(a: &Argument, l: &mut Lexer<R>) -> Result<bool, CastError> { a.as_bool(l) }

pub fn string<R: RandomAccessRead>(a: &Argument, l: &mut Lexer<R>) -> Result<String, CastError> {
    a.as_string(l)
}

pub fn opt_string<R: RandomAccessRead>(
    a: &Argument,
    l: &mut Lexer<R>,
) -> Result<Option<String>, CastError> {
    if a.is_null() {
        Ok(None)
    } else {
        Ok(Some(a.as_string(l)?))
    }
}

pub fn enum_str<R: RandomAccessRead>(a: &Argument, l: &mut Lexer<R>) -> Result<String, CastError> {
    a.as_enum(l)
}

pub fn opt_enum_str<R: RandomAccessRead>(
    a: &Argument,
    l: &mut Lexer<R>,
) -> Result<Option<String>, CastError> {
    if a.is_null() {
        Ok(None)
    } else {
        Ok(Some(a.as_enum(l)?))
    }
}

pub fn req_ref<R: RandomAccessRead>(a: &Argument, l: &mut Lexer<R>) -> Result<InstanceId, CastError> {
    Ok(InstanceId(a.as_reference(l)?))
}

pub fn opt_ref<R: RandomAccessRead>(
    a: &Argument,
    l: &mut Lexer<R>,
) -> Result<Option<InstanceId>, CastError> {
    if a.is_null() {
        Ok(None)
    } else {
        Ok(Some(InstanceId(a.as_reference(l)?)))
    }
}

pub fn ref_list<R: RandomAccessRead>(
    a: &Argument,
    l: &mut Lexer<R>,
) -> Result<Vec<InstanceId>, CastError> {
    a.as_list()?.iter().map(|item| req_ref(item, l)).collect()
}

pub fn real_list<R: RandomAccessRead>(a: &Argument, l: &mut Lexer<R>) -> Result<Vec<f64>, CastError> {
    a.as_list()?.iter().map(|item| item.as_real(l)).collect()
}

/// Passes the argument through unchanged, for callers that need to inspect
/// its shape themselves (typed `SELECT` values, measure-with-unit pairs).
pub fn raw<R: RandomAccessRead>(a: &Argument, _l: &mut Lexer<R>) -> Result<Argument, CastError> {
    Ok(a.clone())
}
