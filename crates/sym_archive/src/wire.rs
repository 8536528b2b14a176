//! The compressed wire encoding.
//!
//! Unsigned quantities are written 7 bits per byte, least significant
//! first; every byte except the last has its high bit set. Values up
//! to 0x7f therefore encode themselves in one byte. Strings are
//! zero-terminated.

use std::io::{Read, Write};

use crate::{ArchiveError, Result};

pub(crate) fn write_unsigned<W: Write>(w: &mut W, mut val: u32) -> Result<()> {
    while val >= 0x80 {
        w.write_all(&[(val & 0x7f) as u8 | 0x80])?;
        val >>= 7;
    }
    w.write_all(&[val as u8])?;
    Ok(())
}

pub(crate) fn read_unsigned<R: Read>(r: &mut R) -> Result<u32> {
    let mut ret: u32 = 0;
    let mut shift = 0u32;
    loop {
        let b = read_byte(r)?;
        if shift >= 32 {
            return Err(ArchiveError::Malformed("oversized varint".into()));
        }
        ret |= u32::from(b & 0x7f) << shift;
        shift += 7;
        if b & 0x80 == 0 {
            return Ok(ret);
        }
    }
}

pub(crate) fn read_string<R: Read>(r: &mut R) -> Result<String> {
    let mut bytes = Vec::new();
    loop {
        let b = read_byte(r)?;
        if b == 0 {
            break;
        }
        bytes.push(b);
    }
    String::from_utf8(bytes).map_err(|_| ArchiveError::Malformed("non-UTF-8 atom".into()))
}

fn read_byte<R: Read>(r: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    match r.read_exact(&mut buf) {
        Ok(()) => Ok(buf[0]),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(ArchiveError::Truncated),
        Err(e) => Err(ArchiveError::Io(e)),
    }
}
