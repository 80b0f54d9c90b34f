//! Streaming FASTA reader.
//!
//! Residues are collected into a growing buffer as lines arrive, so files
//! are read once. Only ASCII letters are kept, uppercased; digits,
//! whitespace and punctuation (including a trailing `*` stop) are dropped.
//! `;` lines are legacy comments. Text before the first `>` header is
//! returned as an unnamed record. Input is handled as bytes, so stray
//! non-UTF-8 bytes in headers or comments do not fail the read.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{info, warn};

use crate::sequence::Sequence;
use crate::{AlignerError, Result};

pub struct FastaReader<R> {
    reader: R,
    line: Vec<u8>,
    pending_id: Option<String>,
    done: bool,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            pending_id: None,
            done: false,
        }
    }

    /// Next record, or `None` at end of input.
    pub fn next_record(&mut self) -> std::io::Result<Option<Sequence>> {
        if self.done {
            return Ok(None);
        }

        let mut id = self.pending_id.take();
        let mut data = Vec::new();
        loop {
            self.line.clear();
            if self.reader.read_until(b'\n', &mut self.line)? == 0 {
                self.done = true;
                break;
            }
            let line = self.line.as_slice();
            if let Some(header) = line.strip_prefix(b">") {
                let next_id = String::from_utf8_lossy(header)
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .to_string();
                if id.is_none() && data.is_empty() {
                    id = Some(next_id);
                    continue;
                }
                self.pending_id = Some(next_id);
                break;
            }
            if line.starts_with(b";") {
                continue;
            }
            data.extend(
                line.iter()
                    .copied()
                    .filter(u8::is_ascii_alphabetic)
                    .map(|b| b.to_ascii_uppercase()),
            );
        }

        if id.is_none() && data.is_empty() && self.done {
            return Ok(None);
        }
        Ok(Some(Sequence::with_id(id.unwrap_or_default(), data)))
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = std::io::Result<Sequence>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

fn open<P: AsRef<Path>>(path: P) -> Result<FastaReader<BufReader<File>>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| AlignerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(FastaReader::new(BufReader::new(file)))
}

/// First record of a FASTA file. A file without residues yields an empty
/// sequence, which is a valid degenerate input.
pub fn read_sequence<P: AsRef<Path>>(path: P) -> Result<Sequence> {
    let path = path.as_ref();
    let seq = open(path)?
        .next_record()
        .map_err(|source| AlignerError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .unwrap_or_default();
    if seq.is_empty() {
        warn!("{} contains no residues", path.display());
    }
    info!("read {} ({} residues) from {}", seq.id(), seq.len(), path.display());
    Ok(seq)
}

pub fn read_sequences<P: AsRef<Path>>(path: P) -> Result<Vec<Sequence>> {
    let path = path.as_ref();
    let records = open(path)?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|source| AlignerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    info!("read {} records from {}", records.len(), path.display());
    Ok(records)
}
