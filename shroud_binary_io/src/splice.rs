/*! Cursor addressed codec over an owned byte buffer.

`Splice` is what onion skins are written into and read from. Writes and reads
go through [`ToBytes`] and [`FromBytes`] so a field always consumes exactly the
number of bytes it was written with. Every operation records an
`(offset, label)` annotation which makes a dump of the buffer readable.
*/

use std::fmt;
use std::ops::Range;

use rand::{thread_rng, RngCore};
use thiserror::Error;

use super::{FromBytes, ToBytes};

/// Error that can happen when accessing `Splice`.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum SpliceError {
    /// Requested range lies outside of the buffer.
    #[error("Range {start}..{end} is out of bounds of buffer with length {len}")]
    OutOfBounds {
        /// Start of the requested range.
        start: usize,
        /// End of the requested range.
        end: usize,
        /// Length of the buffer.
        len: usize,
    },
    /// Field can't be parsed at the cursor.
    #[error("Failed to read {label} at offset {offset}")]
    Deserialize {
        /// Label of the field.
        label: &'static str,
        /// Cursor position.
        offset: usize,
    },
    /// Field doesn't fit into the buffer at the cursor.
    #[error("Failed to write {label} at offset {offset}")]
    Serialize {
        /// Label of the field.
        label: &'static str,
        /// Cursor position.
        offset: usize,
    },
}

/// Owned byte buffer with a read/write cursor and field annotations.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Splice {
    buf: Vec<u8>,
    cursor: usize,
    annotations: Vec<(usize, &'static str)>,
}

impl Splice {
    /// Allocate zero-filled buffer of size `len` with cursor at the start.
    pub fn new(len: usize) -> Splice {
        Splice {
            buf: vec![0; len],
            cursor: 0,
            annotations: Vec::new(),
        }
    }

    /// Wrap existing buffer for reading.
    pub fn load(buf: Vec<u8>) -> Splice {
        Splice {
            buf,
            cursor: 0,
            annotations: Vec::new(),
        }
    }

    /// Length of the whole buffer.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if the buffer has zero length.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Current cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor to `cursor`.
    pub fn set_cursor(&mut self, cursor: usize) -> Result<&mut Self, SpliceError> {
        self.check_range(cursor, cursor)?;
        self.cursor = cursor;
        Ok(self)
    }

    /// Number of bytes between the cursor and the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.cursor
    }

    /// Move the cursor forward by `len` bytes without touching them.
    pub fn advance(&mut self, len: usize, label: &'static str) -> Result<&mut Self, SpliceError> {
        let end = self.end_of(self.cursor, len)?;
        self.annotations.push((self.cursor, label));
        self.cursor = end;
        Ok(self)
    }

    /// Write `value` at the cursor and advance the cursor by its encoded width.
    pub fn write<T: ToBytes>(&mut self, label: &'static str, value: &T) -> Result<&mut Self, SpliceError> {
        let offset = self.cursor;
        let (_, end) = value.to_bytes((&mut self.buf[..], offset))
            .map_err(|_| SpliceError::Serialize { label, offset })?;
        self.annotations.push((offset, label));
        self.cursor = end;
        Ok(self)
    }

    /// Copy raw `bytes` to the cursor without length prefix.
    pub fn write_slice(&mut self, label: &'static str, bytes: &[u8]) -> Result<&mut Self, SpliceError> {
        let offset = self.cursor;
        let end = self.end_of(offset, bytes.len())?;
        self.buf[offset..end].copy_from_slice(bytes);
        self.annotations.push((offset, label));
        self.cursor = end;
        Ok(self)
    }

    /// Read a value at the cursor and advance the cursor by its encoded width.
    pub fn read<T: FromBytes>(&mut self, label: &'static str) -> Result<T, SpliceError> {
        let offset = self.cursor;
        let input = &self.buf[offset..];
        let (rest, value) = T::from_bytes(input)
            .map_err(|_| SpliceError::Deserialize { label, offset })?;
        let consumed = input.len() - rest.len();
        self.annotations.push((offset, label));
        self.cursor += consumed;
        Ok(value)
    }

    /// Read `len` raw bytes at the cursor.
    pub fn read_slice(&mut self, label: &'static str, len: usize) -> Result<Vec<u8>, SpliceError> {
        let offset = self.cursor;
        let bytes = self.range(offset, self.end_of(offset, len)?)?.to_vec();
        self.annotations.push((offset, label));
        self.cursor += len;
        Ok(bytes)
    }

    /// Parse a value at the cursor without advancing.
    pub fn peek<T: FromBytes>(&self) -> Result<T, SpliceError> {
        T::from_bytes(&self.buf[self.cursor..])
            .map(|(_, value)| value)
            .map_err(|_| SpliceError::Deserialize { label: "peek", offset: self.cursor })
    }

    /// Bytes of the `[start, end)` range.
    pub fn range(&self, start: usize, end: usize) -> Result<&[u8], SpliceError> {
        self.check_range(start, end)?;
        Ok(&self.buf[start..end])
    }

    /// Mutable bytes of the `[start, end)` range.
    pub fn range_mut(&mut self, start: usize, end: usize) -> Result<&mut [u8], SpliceError> {
        self.check_range(start, end)?;
        Ok(&mut self.buf[start..end])
    }

    /// Copy bytes of `src` range to the position starting at `dest`.
    /// Ranges may overlap.
    pub fn copy_within(&mut self, src: Range<usize>, dest: usize) -> Result<(), SpliceError> {
        self.check_range(src.start, src.end)?;
        self.end_of(dest, src.len())?;
        self.buf.copy_within(src, dest);
        Ok(())
    }

    /// Overwrite `[start, end)` with cryptographically random bytes.
    pub fn noise(&mut self, start: usize, end: usize) -> Result<(), SpliceError> {
        let range = self.range_mut(start, end)?;
        thread_rng().fill_bytes(range);
        Ok(())
    }

    /// Overwrite `len` bytes at the cursor with random bytes and advance.
    pub fn pad_noise(&mut self, len: usize, label: &'static str) -> Result<&mut Self, SpliceError> {
        let offset = self.cursor;
        let end = self.end_of(offset, len)?;
        self.noise(offset, end)?;
        self.annotations.push((offset, label));
        self.cursor = end;
        Ok(self)
    }

    /// Recorded `(offset, label)` pairs in the order operations happened.
    pub fn annotations(&self) -> &[(usize, &'static str)] {
        &self.annotations
    }

    /// The whole buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Unwrap the buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// End of the `len` bytes at `start` if they lie inside the buffer.
    fn end_of(&self, start: usize, len: usize) -> Result<usize, SpliceError> {
        let end = start.checked_add(len)
            .ok_or(SpliceError::OutOfBounds { start, end: usize::MAX, len: self.buf.len() })?;
        self.check_range(start, end)?;
        Ok(end)
    }

    fn check_range(&self, start: usize, end: usize) -> Result<(), SpliceError> {
        if start > end || end > self.buf.len() {
            Err(SpliceError::OutOfBounds { start, end, len: self.buf.len() })
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for Splice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Splice")
            .field("len", &self.buf.len())
            .field("cursor", &self.cursor)
            .field("annotations", &self.annotations)
            .finish()
    }
}

/// Hex dump where every annotated field is printed on its own line.
impl fmt::Display for Splice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut annotations = self.annotations.clone();
        annotations.sort_by_key(|&(offset, _)| offset);
        let mut prev = 0;
        for (i, &(offset, label)) in annotations.iter().enumerate() {
            if offset > prev {
                write_hex_line(f, prev, "", &self.buf[prev..offset])?;
            }
            let end = annotations.get(i + 1)
                .map_or(self.buf.len(), |&(next, _)| next)
                .max(offset);
            write_hex_line(f, offset, label, &self.buf[offset..end])?;
            prev = end;
        }
        if prev < self.buf.len() {
            write_hex_line(f, prev, "", &self.buf[prev..])?;
        }
        Ok(())
    }
}

fn write_hex_line(f: &mut fmt::Formatter, offset: usize, label: &str, bytes: &[u8]) -> fmt::Result {
    write!(f, "{:>6} {:<12} ", offset, label)?;
    for byte in bytes {
        write!(f, "{:02x}", byte)?;
    }
    writeln!(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    #[test]
    fn new_is_zero_filled() {
        let splice = Splice::new(16);
        assert_eq!(splice.len(), 16);
        assert_eq!(splice.cursor(), 0);
        assert_eq!(splice.as_bytes(), &[0; 16]);
    }

    #[test]
    fn write_read_advance_by_width() {
        let addr: SocketAddr = "1.2.3.4:5678".parse().unwrap();
        let mut splice = Splice::new(2 + 4 + 8 + crate::SIZE_ADDRESS + 4 + 3);
        splice.write("seq", &7u16).unwrap()
            .write("length", &1024u32).unwrap()
            .write("id", &[9u8; 8]).unwrap()
            .write("address", &addr).unwrap()
            .write("blob", &vec![1u8, 2, 3]).unwrap();
        assert_eq!(splice.remaining(), 0);
        assert_eq!(splice.annotations().len(), 5);

        splice.set_cursor(0).unwrap();
        assert_eq!(splice.read::<u16>("seq").unwrap(), 7);
        assert_eq!(splice.cursor(), 2);
        assert_eq!(splice.read::<u32>("length").unwrap(), 1024);
        assert_eq!(splice.cursor(), 6);
        assert_eq!(splice.read::<[u8; 8]>("id").unwrap(), [9; 8]);
        assert_eq!(splice.read::<SocketAddr>("address").unwrap(), addr);
        assert_eq!(splice.read::<Vec<u8>>("blob").unwrap(), vec![1, 2, 3]);
        assert_eq!(splice.remaining(), 0);
    }

    #[test]
    fn write_out_of_bounds() {
        let mut splice = Splice::new(3);
        assert_eq!(
            splice.write("length", &1u32).err(),
            Some(SpliceError::Serialize { label: "length", offset: 0 })
        );
        assert_eq!(splice.cursor(), 0);
    }

    #[test]
    fn read_out_of_bounds() {
        let mut splice = Splice::load(vec![1, 2, 3]);
        splice.set_cursor(2).unwrap();
        assert_eq!(
            splice.read::<u16>("seq").err(),
            Some(SpliceError::Deserialize { label: "seq", offset: 2 })
        );
    }

    #[test]
    fn set_cursor_out_of_bounds() {
        let mut splice = Splice::new(4);
        assert!(splice.set_cursor(4).is_ok());
        assert_eq!(
            splice.set_cursor(5).err(),
            Some(SpliceError::OutOfBounds { start: 5, end: 5, len: 4 })
        );
    }

    #[test]
    fn huge_length_out_of_bounds() {
        let mut splice = Splice::new(4);
        splice.set_cursor(1).unwrap();
        let error = Some(SpliceError::OutOfBounds { start: 1, end: usize::MAX, len: 4 });
        assert_eq!(splice.advance(usize::MAX, "skip").err(), error);
        assert_eq!(splice.read_slice("data", usize::MAX).err(), error);
        assert_eq!(splice.pad_noise(usize::MAX, "padding").err(), error);
        assert_eq!(splice.copy_within(0..2, usize::MAX).err(), Some(SpliceError::OutOfBounds {
            start: usize::MAX,
            end: usize::MAX,
            len: 4,
        }));
        assert_eq!(splice.cursor(), 1);
    }

    #[test]
    fn peek_does_not_advance() {
        let splice = Splice::load(vec![0, 42]);
        assert_eq!(splice.peek::<u16>().unwrap(), 42);
        assert_eq!(splice.cursor(), 0);
        assert!(splice.annotations().is_empty());
    }

    #[test]
    fn range_and_copy_within() {
        let mut splice = Splice::load((0..8).collect());
        assert_eq!(splice.range(2, 4).unwrap(), &[2, 3]);
        splice.copy_within(4..8, 0).unwrap();
        assert_eq!(splice.as_bytes(), &[4, 5, 6, 7, 4, 5, 6, 7]);
        assert!(splice.range(6, 9).is_err());
        assert!(splice.copy_within(4..8, 6).is_err());
    }

    #[test]
    fn pad_noise_overwrites_and_advances() {
        let mut splice = Splice::new(64);
        splice.advance(16, "skip").unwrap();
        splice.pad_noise(48, "noise").unwrap();
        assert_eq!(splice.cursor(), 64);
        assert_eq!(splice.range(0, 16).unwrap(), &[0; 16]);
        // 48 random bytes being all zero is practically impossible
        assert_ne!(splice.range(16, 64).unwrap(), &[0; 48][..]);
    }

    #[test]
    fn display_contains_labels() {
        let mut splice = Splice::new(6);
        splice.write("seq", &0xabcdu16).unwrap()
            .write("length", &1u32).unwrap();
        let dump = splice.to_string();
        assert!(dump.contains("seq"));
        assert!(dump.contains("abcd"));
        assert!(dump.contains("00000001"));
    }
}
