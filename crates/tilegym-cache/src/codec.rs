//! Binary encode/decode for slot files.
//!
//! All integers are little-endian:
//!
//! ```text
//! [MAGIC "TGMP"] [VERSION u8] [width u32] [height u32] [age u32] [tries u32]
//! [cell u8] * (width * height)
//! ```
//!
//! The counters sit at a fixed offset so they can be rewritten in place
//! without touching the cells.

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom, Write};

use tilegym_core::{TileGrid, TileId};

/// Magic bytes at the start of every slot file.
pub const MAGIC: [u8; 4] = *b"TGMP";

/// Current slot file format version.
pub const FORMAT_VERSION: u8 = 1;

/// Byte offset of the `age` counter; `tries` follows it.
pub const COUNTERS_OFFSET: u64 = 13;

/// A decoded slot file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotRecord {
    /// The stored level.
    pub grid: TileGrid,
    /// Times the slot has been beaten.
    pub age: u32,
    /// Failed attempts at beating the slot.
    pub tries: u32,
}

/// Decoding failure, before the store attaches a path.
#[derive(Debug)]
pub(crate) enum DecodeError {
    Io(io::Error),
    Malformed(String),
}

impl From<io::Error> for DecodeError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "{e}"),
            Self::Malformed(detail) => f.write_str(detail),
        }
    }
}

// ── Primitives ──────────────────────────────────────────────────

fn write_u32_le(w: &mut dyn Write, v: u32) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

fn read_u32_le(r: &mut dyn Read) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn extent_u32(v: usize) -> io::Result<u32> {
    u32::try_from(v).map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "grid too large"))
}

// ── Records ─────────────────────────────────────────────────────

/// Write a full slot record.
pub fn encode(w: &mut dyn Write, grid: &TileGrid, age: u32, tries: u32) -> io::Result<()> {
    w.write_all(&MAGIC)?;
    w.write_all(&[FORMAT_VERSION])?;
    write_u32_le(w, extent_u32(grid.width())?)?;
    write_u32_le(w, extent_u32(grid.height())?)?;
    write_u32_le(w, age)?;
    write_u32_le(w, tries)?;
    let cells: Vec<u8> = grid.cells().iter().map(|t| t.0).collect();
    w.write_all(&cells)
}

/// Overwrite the counters of an encoded record in place.
pub fn write_counters<W: Write + Seek>(w: &mut W, age: u32, tries: u32) -> io::Result<()> {
    w.seek(SeekFrom::Start(COUNTERS_OFFSET))?;
    write_u32_le(w, age)?;
    write_u32_le(w, tries)?;
    w.flush()
}

pub(crate) fn decode(r: &mut dyn Read) -> Result<SlotRecord, DecodeError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(DecodeError::Malformed(format!("bad magic {magic:?}")));
    }
    let mut version = [0u8; 1];
    r.read_exact(&mut version)?;
    if version[0] != FORMAT_VERSION {
        return Err(DecodeError::Malformed(format!(
            "unsupported format version {}",
            version[0]
        )));
    }
    let width = read_u32_le(r)? as usize;
    let height = read_u32_le(r)? as usize;
    let age = read_u32_le(r)?;
    let tries = read_u32_le(r)?;

    let n = width
        .checked_mul(height)
        .ok_or_else(|| DecodeError::Malformed(format!("extent {width}x{height} overflows")))?;
    let mut cells = Vec::new();
    r.take(n as u64).read_to_end(&mut cells)?;
    if cells.len() != n {
        return Err(DecodeError::Malformed(format!(
            "expected {n} cells, found {}",
            cells.len()
        )));
    }
    let grid = TileGrid::from_cells(width, height, cells.into_iter().map(TileId).collect())
        .map_err(|e| DecodeError::Malformed(e.to_string()))?;
    Ok(SlotRecord { grid, age, tries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tilegym_core::Pos;

    fn sample() -> TileGrid {
        let mut g = TileGrid::filled(3, 2, TileId(0)).unwrap();
        g.set(Pos::new(2, 1), TileId(4)).unwrap();
        g
    }

    #[test]
    fn header_layout() {
        let mut buf = Vec::new();
        encode(&mut buf, &sample(), 7, 9).unwrap();
        assert_eq!(&buf[..4], b"TGMP");
        assert_eq!(buf[4], FORMAT_VERSION);
        assert_eq!(&buf[5..9], &3u32.to_le_bytes());
        assert_eq!(&buf[13..17], &7u32.to_le_bytes());
        assert_eq!(&buf[17..21], &9u32.to_le_bytes());
        assert_eq!(buf.len(), 21 + 6);
        assert_eq!(buf[26], 4);
    }

    #[test]
    fn counters_patch_in_place() {
        let mut cur = Cursor::new(Vec::new());
        encode(&mut cur, &sample(), 1, 2).unwrap();
        write_counters(&mut cur, 3, 14).unwrap();
        let rec = decode(&mut Cursor::new(cur.into_inner())).unwrap();
        assert_eq!((rec.age, rec.tries), (3, 14));
        assert_eq!(rec.grid, sample());
    }

    #[test]
    fn rejects_bad_magic_and_version() {
        let mut buf = Vec::new();
        encode(&mut buf, &sample(), 0, 0).unwrap();
        let mut bad = buf.clone();
        bad[0] = b'X';
        assert!(matches!(decode(&mut bad.as_slice()), Err(DecodeError::Malformed(_))));
        buf[4] = 99;
        assert!(matches!(decode(&mut buf.as_slice()), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn rejects_truncated_cells() {
        let mut buf = Vec::new();
        encode(&mut buf, &sample(), 0, 0).unwrap();
        buf.truncate(buf.len() - 1);
        assert!(matches!(decode(&mut buf.as_slice()), Err(DecodeError::Malformed(_))));
        assert!(matches!(decode(&mut &buf[..10]), Err(DecodeError::Io(_))));
    }
}
