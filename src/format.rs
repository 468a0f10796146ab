//! The file-of-elements wire format shared by the input file, the output
//! file, and every run file: an 8-byte little-endian count header followed
//! by that many little-endian `u64` elements, no padding, no checksum.
//!
//! The payload is a flat, homogeneous array of one scalar type, so this
//! module converts with plain `to_le_bytes`/`from_le_bytes` rather than a
//! derived wire struct -- `zerocopy`, used elsewhere in this family of
//! crates for mapping multi-field on-disk records, has no leverage over a
//! single repeated `u64`.

use std::io::{Read, Seek, SeekFrom, Write};

use crate::error::ExtSortError;

pub const HEADER_BYTES: usize = 8;
pub const ELEMENT_BYTES: usize = 8;

/// Read the 8-byte count header from the current file position.
/// Leaves the file positioned just after the header.
pub fn read_header<R: Read>(r: &mut R) -> Result<u64, ExtSortError> {
    let mut buf = [0u8; HEADER_BYTES];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Write the 8-byte count header at the current file position.
pub fn write_header<W: Write>(w: &mut W, count: u64) -> Result<(), ExtSortError> {
    w.write_all(&count.to_le_bytes())?;
    Ok(())
}

/// Rewrite the 8-byte count header at offset 0. Callers that rely on this
/// always do so before any payload I/O for the file in question, so there
/// is no seek position to restore afterward.
pub fn overwrite_header_at_start<F: Write + Seek>(f: &mut F, count: u64) -> Result<(), ExtSortError> {
    f.seek(SeekFrom::Start(0))?;
    write_header(f, count)
}

/// Confirm `f` (positioned anywhere) actually holds at least
/// `HEADER_BYTES + declared * ELEMENT_BYTES` bytes, i.e. that the header's
/// declared count isn't a lie the rest of the engine would short-read on.
/// `label` is used only for the error message.
pub fn validate_declared_length<F: Seek>(
    f: &mut F,
    label: &std::path::Path,
    declared: u64,
) -> Result<(), ExtSortError> {
    let actual_len = f.seek(SeekFrom::End(0))?;
    let expected_len = HEADER_BYTES as u64 + declared * ELEMENT_BYTES as u64;
    if actual_len < expected_len {
        return Err(ExtSortError::InvalidHeader {
            path: label.to_path_buf(),
            declared,
        });
    }
    f.seek(SeekFrom::Start(0))?;
    Ok(())
}

/// Read up to `dest.len()` elements from `r` into `dest`, returning the
/// number of elements actually read. A clean EOF before any bytes of an
/// element arrive ends the read; a partial element at EOF is an error.
pub fn read_elements<R: Read>(r: &mut R, dest: &mut [u64]) -> Result<usize, ExtSortError> {
    let mut raw = [0u8; ELEMENT_BYTES];
    let mut count = 0usize;
    for slot in dest.iter_mut() {
        let mut have = 0usize;
        while have < ELEMENT_BYTES {
            match r.read(&mut raw[have..]) {
                Ok(0) => break,
                Ok(n) => have += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ExtSortError::Io(e)),
            }
        }
        if have == 0 {
            break;
        }
        if have != ELEMENT_BYTES {
            return Err(ExtSortError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "partial element at end of file",
            )));
        }
        *slot = u64::from_le_bytes(raw);
        count += 1;
    }
    Ok(count)
}

/// Write `elements` to `w` in file-of-elements byte order.
pub fn write_elements<W: Write>(w: &mut W, elements: &[u64]) -> Result<(), ExtSortError> {
    const STRIDE: usize = 4096;
    let mut scratch = [0u8; STRIDE * ELEMENT_BYTES];
    for chunk in elements.chunks(STRIDE) {
        for (slot, &v) in scratch.chunks_exact_mut(ELEMENT_BYTES).zip(chunk) {
            slot.copy_from_slice(&v.to_le_bytes());
        }
        w.write_all(&scratch[..chunk.len() * ELEMENT_BYTES])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn header_round_trips() {
        let mut buf = Vec::new();
        write_header(&mut buf, 42).unwrap();
        let mut cur = Cursor::new(buf);
        assert_eq!(read_header(&mut cur).unwrap(), 42);
    }

    #[test]
    fn elements_round_trip_through_chunk_boundaries() {
        let values: Vec<u64> = (0..10_000).collect();
        let mut buf = Vec::new();
        write_elements(&mut buf, &values).unwrap();
        assert_eq!(buf.len(), values.len() * ELEMENT_BYTES);

        let mut cur = Cursor::new(buf);
        let mut dest = vec![0u64; values.len()];
        let n = read_elements(&mut cur, &mut dest).unwrap();
        assert_eq!(n, values.len());
        assert_eq!(dest, values);
    }

    #[test]
    fn partial_element_at_eof_is_an_error() {
        let mut cur = Cursor::new(vec![1u8, 2, 3]);
        let mut dest = vec![0u64; 1];
        assert!(read_elements(&mut cur, &mut dest).is_err());
    }

    #[test]
    fn clean_eof_yields_fewer_elements_than_requested() {
        let mut buf = Vec::new();
        write_elements(&mut buf, &[7, 8, 9]).unwrap();
        let mut cur = Cursor::new(buf);
        let mut dest = vec![0u64; 10];
        let n = read_elements(&mut cur, &mut dest).unwrap();
        assert_eq!(n, 3);
        assert_eq!(&dest[..3], &[7, 8, 9]);
    }

    #[test]
    fn validate_declared_length_accepts_a_file_long_enough_for_its_header() {
        let mut buf = Vec::new();
        write_header(&mut buf, 3).unwrap();
        write_elements(&mut buf, &[1, 2, 3]).unwrap();
        let mut cur = Cursor::new(buf);
        validate_declared_length(&mut cur, std::path::Path::new("<test>"), 3).unwrap();
    }

    #[test]
    fn validate_declared_length_rejects_a_truncated_file() {
        let mut buf = Vec::new();
        write_header(&mut buf, 3).unwrap();
        write_elements(&mut buf, &[1, 2]).unwrap();
        let mut cur = Cursor::new(buf);
        let err = validate_declared_length(&mut cur, std::path::Path::new("<test>"), 3).unwrap_err();
        assert!(matches!(err, ExtSortError::InvalidHeader { .. }));
    }
}
