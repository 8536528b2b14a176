//! Binary archiving of expression trees.
//!
//! An archive holds three tables: interned strings (*atoms*), named
//! root expressions, and nodes. Each node is a property bag; a
//! property is `(name-atom, type, value)` with the type in the low 3
//! bits. Node-valued properties reference the node table by index, so
//! shared subtrees stay shared on disk — while archiving, nodes are
//! de-duplicated by canonical pointer identity.
//!
//! Wire format: the magic `GARC`, a varint version, then the three
//! tables. Every unsigned integer is 7-bit-per-byte little-endian
//! (values below 0x80 encode themselves; larger values set the high
//! bit and continue). Strings are zero-terminated.

mod node;
mod wire;

use std::cell::RefCell;
use std::io::{Read, Write};

use rustc_hash::FxHashMap;
use thiserror::Error;

use sym_core::{Ex, KernelError};

pub use node::PropType;

/// Current writer version and the number of prior versions the reader
/// still accepts.
pub const ARCHIVE_VERSION: u32 = 2;
pub const ARCHIVE_AGE: u32 = 1;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("not an expression archive (signature not found)")]
    BadSignature,

    #[error(
        "archive version {0} cannot be read (supported: {min} through {max})",
        min = ARCHIVE_VERSION - ARCHIVE_AGE,
        max = ARCHIVE_VERSION
    )]
    UnsupportedVersion(u32),

    #[error("truncated archive stream")]
    Truncated,

    #[error("atom id {0} out of range")]
    BadAtomId(u32),

    #[error("node id {0} out of range")]
    BadNodeId(u32),

    #[error("expression `{0}` not found in archive")]
    NotFound(String),

    #[error("archived node of unknown class `{0}`")]
    UnknownClass(String),

    #[error("malformed archive node: {0}")]
    Malformed(String),

    #[error(transparent)]
    Kernel(#[from] KernelError),
}

pub type Result<T> = std::result::Result<T, ArchiveError>;

#[derive(Clone, Copy, Debug)]
struct ArchivedEx {
    name: u32,
    root: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Property {
    pub(crate) name: u32,
    pub(crate) ty: PropType,
    pub(crate) value: u32,
}

/// One archived node: its property bag plus a cached handle (the
/// original expression while writing, the reconstructed one after the
/// first unarchive).
#[derive(Debug, Default)]
pub(crate) struct ArchiveNode {
    props: Vec<Property>,
    cached: RefCell<Option<Ex>>,
}

/// A de-duplicating binary archive of expression trees.
#[derive(Debug, Default)]
pub struct Archive {
    atoms: Vec<String>,
    atom_ids: FxHashMap<String, u32>,
    exprs: Vec<ArchivedEx>,
    nodes: Vec<ArchiveNode>,
    node_ids: FxHashMap<*const (), u32>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of archived root expressions.
    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    /// Archive `e` under `name`. The whole tree is stored, shared
    /// nodes once.
    pub fn archive_ex(&mut self, e: &Ex, name: &str) -> Result<()> {
        let root = self.add_node(e)?;
        let name = self.atomize(name);
        self.exprs.push(ArchivedEx { name, root });
        Ok(())
    }

    /// Reconstruct the expression stored under `name`.
    ///
    /// Symbols are re-bound to the entries of `sym_table` by name;
    /// names not present get fresh symbols (with fresh serials).
    pub fn unarchive_ex(&self, sym_table: &[Ex], name: &str) -> Result<Ex> {
        let id = self
            .atom_ids
            .get(name)
            .copied()
            .ok_or_else(|| ArchiveError::NotFound(name.to_string()))?;
        let entry = self
            .exprs
            .iter()
            .find(|a| a.name == id)
            .ok_or_else(|| ArchiveError::NotFound(name.to_string()))?;
        self.unarchive_node(entry.root, sym_table)
    }

    /// Reconstruct the `index`-th archived expression and report its
    /// name.
    pub fn unarchive_index(&self, sym_table: &[Ex], index: usize) -> Result<(String, Ex)> {
        let entry = self.exprs.get(index).copied().ok_or(ArchiveError::BadNodeId(
            index as u32,
        ))?;
        let name = self.unatomize(entry.name)?.to_string();
        let e = self.unarchive_node(entry.root, sym_table)?;
        Ok((name, e))
    }

    /// Drop the cached reconstructed expressions, forcing the next
    /// unarchive to rebuild from properties.
    pub fn forget(&mut self) {
        for n in &self.nodes {
            *n.cached.borrow_mut() = None;
        }
        self.node_ids.clear();
    }

    // --- interning ------------------------------------------------------

    pub(crate) fn atomize(&mut self, s: &str) -> u32 {
        if let Some(&id) = self.atom_ids.get(s) {
            return id;
        }
        let id = self.atoms.len() as u32;
        self.atoms.push(s.to_string());
        self.atom_ids.insert(s.to_string(), id);
        id
    }

    pub(crate) fn unatomize(&self, id: u32) -> Result<&str> {
        self.atoms
            .get(id as usize)
            .map(String::as_str)
            .ok_or(ArchiveError::BadAtomId(id))
    }

    /// Archive a node if its pointer has not been seen, and return its
    /// id. This keeps the on-disk representation a DAG.
    pub(crate) fn add_node(&mut self, e: &Ex) -> Result<u32> {
        if let Some(&id) = self.node_ids.get(&e.node_ptr()) {
            return Ok(id);
        }
        // Children archive first, so a parent's id is always larger
        // than its children's.
        let props = node::archive_props(self, e)?;
        let id = self.nodes.len() as u32;
        self.nodes.push(ArchiveNode {
            props,
            cached: RefCell::new(Some(e.clone())),
        });
        self.node_ids.insert(e.node_ptr(), id);
        Ok(id)
    }

    pub(crate) fn unarchive_node(&self, id: u32, sym_table: &[Ex]) -> Result<Ex> {
        let n = self
            .nodes
            .get(id as usize)
            .ok_or(ArchiveError::BadNodeId(id))?;
        if let Some(e) = n.cached.borrow().as_ref() {
            return Ok(e.clone());
        }
        let e = node::unarchive_props(self, &n.props, sym_table)?;
        *n.cached.borrow_mut() = Some(e.clone());
        Ok(e)
    }

    // --- wire format ----------------------------------------------------

    /// Write the archive in the binary wire format.
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(b"GARC")?;
        wire::write_unsigned(w, ARCHIVE_VERSION)?;

        wire::write_unsigned(w, self.atoms.len() as u32)?;
        for atom in &self.atoms {
            w.write_all(atom.as_bytes())?;
            w.write_all(&[0])?;
        }

        wire::write_unsigned(w, self.exprs.len() as u32)?;
        for ex in &self.exprs {
            wire::write_unsigned(w, ex.name)?;
            wire::write_unsigned(w, ex.root)?;
        }

        wire::write_unsigned(w, self.nodes.len() as u32)?;
        for node in &self.nodes {
            wire::write_unsigned(w, node.props.len() as u32)?;
            for p in &node.props {
                wire::write_unsigned(w, (p.name << 3) | p.ty as u32)?;
                wire::write_unsigned(w, p.value)?;
            }
        }
        Ok(())
    }

    /// Read an archive from the binary wire format.
    pub fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic).map_err(eof_as_truncated)?;
        if &magic != b"GARC" {
            return Err(ArchiveError::BadSignature);
        }
        let version = wire::read_unsigned(r)?;
        if version > ARCHIVE_VERSION || version < ARCHIVE_VERSION - ARCHIVE_AGE {
            return Err(ArchiveError::UnsupportedVersion(version));
        }

        let mut ar = Archive::new();
        let num_atoms = wire::read_unsigned(r)?;
        for _ in 0..num_atoms {
            let s = wire::read_string(r)?;
            ar.atom_ids.insert(s.clone(), ar.atoms.len() as u32);
            ar.atoms.push(s);
        }

        let num_exprs = wire::read_unsigned(r)?;
        for _ in 0..num_exprs {
            let name = wire::read_unsigned(r)?;
            let root = wire::read_unsigned(r)?;
            ar.exprs.push(ArchivedEx { name, root });
        }

        let num_nodes = wire::read_unsigned(r)?;
        for _ in 0..num_nodes {
            let num_props = wire::read_unsigned(r)?;
            let mut props = Vec::with_capacity(num_props as usize);
            for _ in 0..num_props {
                let name_type = wire::read_unsigned(r)?;
                let ty = PropType::from_bits(name_type & 7).ok_or_else(|| {
                    ArchiveError::Malformed(format!("property type {}", name_type & 7))
                })?;
                let value = wire::read_unsigned(r)?;
                props.push(Property {
                    name: name_type >> 3,
                    ty,
                    value,
                });
            }
            ar.nodes.push(ArchiveNode {
                props,
                cached: RefCell::new(None),
            });
        }
        Ok(ar)
    }
}

fn eof_as_truncated(e: std::io::Error) -> ArchiveError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        ArchiveError::Truncated
    } else {
        ArchiveError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(e: &Ex, syms: &[Ex]) -> Ex {
        let mut ar = Archive::new();
        ar.archive_ex(e, "test").unwrap();
        let mut buf = Vec::new();
        ar.write_to(&mut buf).unwrap();
        let back = Archive::read_from(&mut buf.as_slice()).unwrap();
        back.unarchive_ex(syms, "test").unwrap()
    }

    #[test]
    fn round_trips_structure() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        let e = (&x + &y).pow(2) * Ex::from(3) + x.pow(-1)
            + Ex::func("sin", vec![y.clone()]).unwrap();
        let back = round_trip(&e, &[x.clone(), y.clone()]);
        assert_eq!(back, e);
    }

    #[test]
    fn symbol_identity_follows_the_table() {
        let x = Ex::symbol("x");
        let e = x.pow(2) + &x;
        // With the table: identical symbol, structurally equal result.
        let back = round_trip(&e, &[x.clone()]);
        assert_eq!(back, e);
        // Without: a fresh symbol of the same name, NOT equal.
        let fresh = round_trip(&e, &[]);
        assert_ne!(fresh, e);
        assert_eq!(fresh.to_string(), e.to_string());
    }

    #[test]
    fn shared_subtrees_are_stored_once() {
        let x = Ex::symbol("x");
        let s = Ex::func("sin", vec![x.clone()]).unwrap();
        // `s` appears twice but shares one node.
        let e = &s * &s + &s;
        let mut ar = Archive::new();
        ar.archive_ex(&e, "e").unwrap();
        let sin_nodes = ar
            .nodes
            .iter()
            .filter(|n| {
                n.props.iter().any(|p| {
                    p.ty == PropType::String
                        && ar.unatomize(p.value).is_ok_and(|s| s == "sin")
                })
            })
            .count();
        assert_eq!(sin_nodes, 1);
    }

    #[test]
    fn bad_signature_and_truncation() {
        let err = Archive::read_from(&mut &b"NOPE"[..]).unwrap_err();
        assert!(matches!(err, ArchiveError::BadSignature));
        let err = Archive::read_from(&mut &b"GA"[..]).unwrap_err();
        assert!(matches!(err, ArchiveError::Truncated));
        let mut ar = Archive::new();
        ar.archive_ex(&Ex::from(5), "n").unwrap();
        let mut buf = Vec::new();
        ar.write_to(&mut buf).unwrap();
        let cut = &buf[..buf.len() - 1];
        assert!(Archive::read_from(&mut &cut[..]).is_err());
    }

    #[test]
    fn version_window_is_enforced() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"GARC");
        wire::write_unsigned(&mut buf, ARCHIVE_VERSION + 1).unwrap();
        assert!(matches!(
            Archive::read_from(&mut buf.as_slice()),
            Err(ArchiveError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn second_write_pass_is_byte_identical() {
        let x = Ex::symbol("x");
        let e = Ex::func("sin", vec![x.clone()]).unwrap().pow(2)
            + Ex::func("cos", vec![x.clone()]).unwrap().pow(2);
        let mut ar1 = Archive::new();
        ar1.archive_ex(&e, "trig").unwrap();
        let mut bytes1 = Vec::new();
        ar1.write_to(&mut bytes1).unwrap();

        let read = Archive::read_from(&mut bytes1.as_slice()).unwrap();
        let back = read.unarchive_ex(&[x.clone()], "trig").unwrap();
        assert_eq!(back, e);

        let mut ar2 = Archive::new();
        ar2.archive_ex(&back, "trig").unwrap();
        let mut bytes2 = Vec::new();
        ar2.write_to(&mut bytes2).unwrap();
        assert_eq!(bytes1, bytes2);
    }
}
