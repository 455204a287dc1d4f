//! WAL segment reader
//!
//! The WAL file is line oriented:
//!
//! ```text
//! 3                 <- pointer: id of the next block to be produced
//! PUT alice 100     <- records not yet folded into a block
//! DEPOSIT alice 50
//! ```
//!
//! The reader only frames lines and decodes the pointer. Deciding whether a
//! record line that fails to decode is a torn write or corruption is left
//! to the caller, since that depends on the line's position.

use std::fs;
use std::path::{Path, PathBuf};

use super::errors::{WalError, WalResult};
use crate::codec::{decode_line, decode_pointer};
use crate::ledger::Transaction;

/// One record line of the segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentLine {
    /// 1-based line number in the file (the pointer is line 1)
    pub number: usize,
    /// Byte offset of the first byte of the line
    pub offset: u64,
    /// Byte offset just past the line terminator (or EOF if unterminated)
    pub end: u64,
    /// Line content without terminator
    pub text: String,
    /// Whether the line ends with `\n`
    pub terminated: bool,
}

/// A fully read WAL file
#[derive(Debug, Clone)]
pub struct WalSegment {
    path: PathBuf,
    pointer: u64,
    header_end: u64,
    header_terminated: bool,
    lines: Vec<SegmentLine>,
    bytes: Vec<u8>,
}

impl WalSegment {
    /// Reads and frames the WAL file at `path`.
    ///
    /// # Errors
    ///
    /// `LEDGER_WAL_CORRUPTION` if the file cannot be read, is empty, or its
    /// first line is not a valid block pointer.
    pub fn read(path: &Path) -> WalResult<Self> {
        let bytes = fs::read(path).map_err(|e| {
            WalError::corruption(format!(
                "Failed to read WAL file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(path, &bytes)
    }

    /// Frames WAL bytes that were already read from `path`.
    pub fn parse(path: &Path, bytes: &[u8]) -> WalResult<Self> {
        if bytes.is_empty() {
            return Err(WalError::corruption(format!(
                "WAL file {} is empty, missing block pointer line",
                path.display()
            )));
        }

        let mut raw_lines = split_lines(bytes);
        let (header_text, _, header_end, header_terminated) = raw_lines.remove(0);
        let pointer = decode_pointer(&header_text)
            .map_err(|e| WalError::corruption_at_line(1, e.to_string()))?;

        let lines = raw_lines
            .into_iter()
            .enumerate()
            .map(|(i, (text, offset, end, terminated))| SegmentLine {
                number: i + 2,
                offset,
                end,
                text,
                terminated,
            })
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            pointer,
            header_end,
            header_terminated,
            lines,
            bytes: bytes.to_vec(),
        })
    }

    /// Path the segment was read from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The WAL pointer: id of the next block to be produced
    pub fn pointer(&self) -> u64 {
        self.pointer
    }

    /// Byte offset just past the pointer line
    pub fn header_end(&self) -> u64 {
        self.header_end
    }

    /// Whether the pointer line is followed by `\n`
    pub fn header_terminated(&self) -> bool {
        self.header_terminated
    }

    /// Record lines in file order
    pub fn lines(&self) -> &[SegmentLine] {
        &self.lines
    }

    /// Number of record lines (parseable or not)
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total file length in bytes
    pub fn file_len(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Raw bytes following the first `count` record lines.
    ///
    /// Compaction carries these over into the next segment unchanged.
    pub fn bytes_after_records(&self, count: usize) -> &[u8] {
        let start = match count {
            0 => self.header_end,
            n => self.lines.get(n - 1).map(|l| l.end).unwrap_or(self.file_len()),
        };
        &self.bytes[start as usize..]
    }

    /// Decodes the first `count` record lines, failing on any bad line.
    ///
    /// Used by compaction, where every drained line must be intact.
    pub fn decode_records(&self, count: usize) -> WalResult<Vec<Transaction>> {
        if self.lines.len() < count {
            return Err(WalError::corruption(format!(
                "WAL holds {} records, expected at least {}",
                self.lines.len(),
                count
            )));
        }
        self.lines[..count]
            .iter()
            .map(|line| {
                if !line.terminated {
                    return Err(WalError::corruption_at_line(
                        line.number,
                        "record line is missing its terminator",
                    ));
                }
                decode_line(&line.text)
                    .map_err(|e| WalError::corruption_at_line(line.number, e.to_string()))
            })
            .collect()
    }
}

/// Splits bytes into (text, start, end, terminated) tuples.
fn split_lines(bytes: &[u8]) -> Vec<(String, u64, u64, bool)> {
    let mut out = Vec::new();
    let mut start = 0usize;
    while start < bytes.len() {
        match bytes[start..].iter().position(|b| *b == b'\n') {
            Some(rel) => {
                let end = start + rel;
                let text = String::from_utf8_lossy(&bytes[start..end]).into_owned();
                out.push((text, start as u64, (end + 1) as u64, true));
                start = end + 1;
            }
            None => {
                let text = String::from_utf8_lossy(&bytes[start..]).into_owned();
                out.push((text, start as u64, bytes.len() as u64, false));
                start = bytes.len();
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(bytes: &[u8]) -> WalResult<WalSegment> {
        WalSegment::parse(Path::new("log.txt"), bytes)
    }

    #[test]
    fn test_pointer_only() {
        let segment = parse(b"1\n").unwrap();
        assert_eq!(segment.pointer(), 1);
        assert_eq!(segment.header_end(), 2);
        assert!(segment.header_terminated());
        assert_eq!(segment.line_count(), 0);
    }

    #[test]
    fn test_lines_and_offsets() {
        let segment = parse(b"2\nPUT alice 100\nDEPOSIT alice 50\n").unwrap();
        assert_eq!(segment.pointer(), 2);

        let lines = segment.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].number, 2);
        assert_eq!(lines[0].offset, 2);
        assert_eq!(lines[0].end, 16);
        assert_eq!(lines[0].text, "PUT alice 100");
        assert_eq!(lines[1].offset, 16);
        assert!(lines[1].terminated);
        assert_eq!(lines[1].end, segment.file_len());
    }

    #[test]
    fn test_unterminated_final_line() {
        let segment = parse(b"2\nPUT alice 100\nDEPOS").unwrap();
        let last = segment.lines().last().unwrap();
        assert_eq!(last.text, "DEPOS");
        assert!(!last.terminated);
        assert_eq!(last.offset, 16);
    }

    #[test]
    fn test_bytes_after_records() {
        let segment = parse(b"1\nPUT a 1\nPUT a 2\nPUT a 3\nPUT a").unwrap();
        assert_eq!(segment.bytes_after_records(0), b"PUT a 1\nPUT a 2\nPUT a 3\nPUT a");
        assert_eq!(segment.bytes_after_records(2), b"PUT a 3\nPUT a");
        assert_eq!(segment.bytes_after_records(5), b"");
    }

    #[test]
    fn test_empty_file_is_corruption() {
        let err = parse(b"").unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_bad_pointer_is_corruption() {
        let err = parse(b"PUT alice 1\n").unwrap_err();
        assert_eq!(err.details(), Some("line: 1"));
    }

    #[test]
    fn test_decode_records() {
        let segment = parse(b"1\nPUT a 1\nDEPOSIT a 2\nWITHDRAW a 1\n").unwrap();
        let records = segment.decode_records(2).unwrap();
        assert_eq!(
            records,
            vec![Transaction::put("a", 1), Transaction::deposit("a", 2)]
        );
        assert!(segment.decode_records(4).is_err());
    }

    #[test]
    fn test_decode_records_rejects_bad_line() {
        let segment = parse(b"1\nPUT a 1\nGARBAGE\n").unwrap();
        let err = segment.decode_records(2).unwrap_err();
        assert_eq!(err.details(), Some("line: 3"));
    }

    #[test]
    fn test_read_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("log.txt");
        fs::write(&path, "4\nTRANSFER a b 3\n").unwrap();

        let segment = WalSegment::read(&path).unwrap();
        assert_eq!(segment.pointer(), 4);
        assert_eq!(segment.path(), path.as_path());
        assert_eq!(segment.line_count(), 1);
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        assert!(WalSegment::read(&temp_dir.path().join("log.txt")).is_err());
    }
}
