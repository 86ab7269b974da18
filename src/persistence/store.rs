// SPDX-License-Identifier: Apache-2.0

//! The entity store (§4.D): scans a STEP physical file once at open time,
//! recording every `#n=TYPE(...)` instance's id, type, and argument-list
//! offset, and building the inverse (referrer) index from the `#m`
//! references it encounters along the way. Argument trees themselves stay
//! unparsed until first requested, then cached on the `Instance`.

use std::cell::RefCell;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use std::rc::Rc;

use crate::core::{parse_arguments, Argument, ByteStream, CastError, LexError, Lexer, Operator, RandomAccessRead, TokenKind};

use super::index::Indices;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Debug)]
pub struct InstanceId(pub u64);

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "#{}", self.0) }
}

#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum StoreError {
    /// no instance with id #{0}.
    UnknownId(u64),

    /// duplicate instance id #{0}: first seen at offset {1}, redefined at offset {2}.
    DuplicateId(u64, u64, u64),

    /// instance #{0} was accessed while its own arguments were being materialized.
    Cycle(u64),

    /// expected `{0}` while scanning the instance body for #{1}.
    UnexpectedToken(char, u64),

    /// unexpected end of file while scanning the instance body for #{0}.
    Truncated(u64),

    #[display(inner)]
    #[from]
    Lex(LexError),

    #[display(inner)]
    #[from]
    Cast(CastError),
}

/// A single `#n=TYPE(...)` record. Its argument list is parsed lazily and
/// cached the first time it's requested.
pub struct Instance {
    pub id: InstanceId,
    pub type_name: String,
    body_offset: u64,
    args: RefCell<Option<Rc<Vec<Argument>>>>,
    materializing: RefCell<bool>,
}

impl Instance {
    pub fn body_offset(&self) -> u64 { self.body_offset }
}

pub struct EntityStore<R> {
    lexer: RefCell<Lexer<R>>,
    indices: Indices,
}

impl EntityStore<File> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let stream = ByteStream::open(path).map_err(LexError::from)?;
        Self::from_stream(stream)
    }
}

impl EntityStore<Cursor<Vec<u8>>> {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, StoreError> {
        let stream = ByteStream::from_bytes(bytes).map_err(LexError::from)?;
        Self::from_stream(stream)
    }
}

impl<R: RandomAccessRead> EntityStore<R> {
    fn from_stream(stream: ByteStream<R>) -> Result<Self, StoreError> {
        let mut store = EntityStore { lexer: RefCell::new(Lexer::new(stream)), indices: Indices::default() };
        store.scan()?;
        Ok(store)
    }

    /// Single forward pass over the whole file. Anything that isn't an
    /// `#id=` instance header (the `HEADER` section's entities, `DATA;`,
    /// `ENDSEC;`, and so on) is simply skipped.
    fn scan(&mut self) -> Result<(), StoreError> {
        loop {
            let mut lexer = self.lexer.borrow_mut();
            let Some(tok) = lexer.next_token()? else { break };
            let TokenKind::Literal(offset) = tok.kind() else { continue };
            let (kind, text) = lexer.token_text(offset)?;
            if kind != crate::core::LiteralKind::Identifier {
                continue;
            }
            let save = lexer.tell();
            let Some(next) = lexer.next_token()? else { break };
            if !next.is_operator(Operator::Eq) {
                lexer.seek(save)?;
                continue;
            }
            let id: u64 = text[1..].parse().map_err(|_| StoreError::UnknownId(0))?;
            drop(lexer);
            self.scan_instance(id)?;
        }
        Ok(())
    }

    fn scan_instance(&mut self, id: u64) -> Result<(), StoreError> {
        let mut lexer = self.lexer.borrow_mut();
        let type_tok = lexer.next_token()?.ok_or(StoreError::Truncated(id))?;
        let type_offset = type_tok.as_offset().ok_or(StoreError::UnexpectedToken('(', id))?;
        let (_, type_name) = lexer.token_text(type_offset)?;

        let open = lexer.next_token()?.ok_or(StoreError::Truncated(id))?;
        if !open.is_operator(Operator::LParen) {
            return Err(StoreError::UnexpectedToken('(', id));
        }
        let body_offset = lexer.tell();

        let mut refs = Vec::new();
        let mut first_string = None;
        let mut depth: i32 = 1;
        let mut arg_index = 0usize;
        let mut at_arg_start = true;
        loop {
            let tok = lexer.next_token()?.ok_or(StoreError::Truncated(id))?;
            match tok.as_operator() {
                Some(Operator::LParen) => {
                    depth += 1;
                    at_arg_start = false;
                }
                Some(Operator::RParen) => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    at_arg_start = false;
                }
                Some(Operator::Comma) => {
                    if depth == 1 {
                        arg_index += 1;
                        at_arg_start = true;
                    }
                }
                _ => {
                    if let TokenKind::Literal(lit_offset) = tok.kind() {
                        let (lit_kind, lit_text) = lexer.token_text(lit_offset)?;
                        if lit_kind == crate::core::LiteralKind::Identifier {
                            if let Ok(referenced) = lit_text[1..].parse::<u64>() {
                                refs.push(referenced);
                            }
                        }
                        if depth == 1 && at_arg_start && arg_index == 0 && lit_kind == crate::core::LiteralKind::String {
                            first_string = Some(lit_text);
                        }
                    }
                    at_arg_start = false;
                }
            }
        }
        // consume the trailing ';'
        let _ = lexer.next_token()?;
        drop(lexer);

        let instance = Instance {
            id: InstanceId(id),
            type_name,
            body_offset,
            args: RefCell::new(None),
            materializing: RefCell::new(false),
        };
        if let Some(guid) = first_string.filter(|s| looks_like_ifc_guid(s)) {
            self.indices.note_guid(guid, instance.id);
        }
        if self.indices.by_id.contains_key(&InstanceId(id)) {
            let first_offset = self.indices.by_id[&InstanceId(id)].body_offset;
            log::warn!("duplicate instance id #{id} at offset {body_offset}, first seen at {first_offset}");
            return Err(StoreError::DuplicateId(id, first_offset, body_offset));
        }
        self.indices.insert(instance, &refs);
        Ok(())
    }

    pub fn by_id(&self, id: InstanceId) -> Option<&Instance> { self.indices.by_id.get(&id) }

    pub fn by_type(&self, type_name: &str) -> &[InstanceId] {
        self.indices.by_type.get(type_name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn referrers(&self, id: InstanceId) -> &[InstanceId] {
        self.indices.referrers.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn by_guid(&self, guid: &str) -> Option<InstanceId> { self.indices.by_guid.get(guid).copied() }

    pub fn len(&self) -> usize { self.indices.by_id.len() }

    pub fn is_empty(&self) -> bool { self.indices.by_id.is_empty() }

    pub fn ids(&self) -> impl Iterator<Item = InstanceId> + '_ { self.indices.by_id.keys().copied() }

    /// Materialize (and cache) the argument list of instance `id`.
    pub fn arguments(&self, id: InstanceId) -> Result<Rc<Vec<Argument>>, StoreError> {
        let instance = self.by_id(id).ok_or(StoreError::UnknownId(id.0))?;
        if let Some(cached) = instance.args.borrow().as_ref() {
            return Ok(cached.clone());
        }
        if *instance.materializing.borrow() {
            return Err(StoreError::Cycle(id.0));
        }
        *instance.materializing.borrow_mut() = true;
        let mut lexer = self.lexer.borrow_mut();
        lexer.seek(instance.body_offset())?;
        let mut refs = Vec::new();
        let parsed = parse_arguments(&mut lexer, &mut refs)?;
        drop(lexer);
        *instance.materializing.borrow_mut() = false;
        let parsed = Rc::new(parsed);
        *instance.args.borrow_mut() = Some(parsed.clone());
        Ok(parsed)
    }

    /// Convenience accessor for a single top-level argument.
    pub fn argument(&self, id: InstanceId, index: usize) -> Result<Argument, StoreError> {
        let args = self.arguments(id)?;
        args.get(index).cloned().ok_or(StoreError::UnknownId(id.0))
    }

    pub fn lexer_mut(&self) -> std::cell::RefMut<'_, Lexer<R>> { self.lexer.borrow_mut() }
}

/// IFC `GlobalId` attributes are 22-character strings drawn from a base64
/// variant alphabet (ISO/TS 10303-26).
fn looks_like_ifc_guid(s: &str) -> bool {
    const ALPHABET: &[u8] =
        b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz_$";
    s.len() == 22 && s.bytes().all(|b| ALPHABET.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        br#"ISO-10303-21;
HEADER;
FILE_DESCRIPTION((''),'2;1');
ENDSEC;
DATA;
#1=IFCCARTESIANPOINT((0.,0.,0.));
#2=IFCDIRECTION((0.,0.,1.));
#3=IFCAXIS2PLACEMENT3D(#1,#2,$);
#4=IFCWALL('2O2Fr$t4X7Zf8NOew3FNr2',$,$,$,$,#3,$,$,$);
ENDSEC;
END-ISO-10303-21;
"#
        .to_vec()
    }

    #[test]
    fn scans_all_instances_and_types() {
        let store = EntityStore::from_bytes(sample()).unwrap();
        assert_eq!(store.len(), 4);
        assert_eq!(store.by_type("IFCWALL"), &[InstanceId(4)]);
        assert!(store.by_type("IFCSLAB").is_empty());
    }

    #[test]
    fn inverse_index_is_symmetric() {
        let store = EntityStore::from_bytes(sample()).unwrap();
        assert_eq!(store.referrers(InstanceId(1)), &[InstanceId(3)]);
        assert_eq!(store.referrers(InstanceId(3)), &[InstanceId(4)]);
        assert!(store.referrers(InstanceId(4)).is_empty());
    }

    #[test]
    fn guid_index_finds_the_wall() {
        let store = EntityStore::from_bytes(sample()).unwrap();
        assert_eq!(store.by_guid("2O2Fr$t4X7Zf8NOew3FNr2"), Some(InstanceId(4)));
    }

    #[test]
    fn arguments_materialize_lazily_and_cache() {
        let store = EntityStore::from_bytes(sample()).unwrap();
        let args = store.arguments(InstanceId(2)).unwrap();
        assert_eq!(args.len(), 1);
        let again = store.arguments(InstanceId(2)).unwrap();
        assert!(Rc::ptr_eq(&args, &again));
    }
}
