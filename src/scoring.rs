use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, info};

use crate::{AlignerError, Result};

/// Standard amino acids in substitution-matrix order.
pub const ALPHABET: &[u8; ALPHABET_SIZE] = b"ARNDCQEGHILKMFPSTWYV";
pub const ALPHABET_SIZE: usize = 20;

#[rustfmt::skip]
const BLOSUM62: [[i32; ALPHABET_SIZE]; ALPHABET_SIZE] = [
    //A   R   N   D   C   Q   E   G   H   I   L   K   M   F   P   S   T   W   Y   V
    [ 4, -1, -2, -2,  0, -1, -1,  0, -2, -1, -1, -1, -1, -2, -1,  1,  0, -3, -2,  0], // A
    [-1,  5,  0, -2, -3,  1,  0, -2,  0, -3, -2,  2, -1, -3, -2, -1, -1, -3, -2, -3], // R
    [-2,  0,  6,  1, -3,  0,  0,  0,  1, -3, -3,  0, -2, -3, -2,  1,  0, -4, -2, -3], // N
    [-2, -2,  1,  6, -3,  0,  2, -1, -1, -3, -4, -1, -3, -3, -1,  0, -1, -4, -3, -3], // D
    [ 0, -3, -3, -3,  9, -3, -4, -3, -3, -1, -1, -3, -1, -2, -3, -1, -1, -2, -2, -1], // C
    [-1,  1,  0,  0, -3,  5,  2, -2,  0, -3, -2,  1,  0, -3, -1,  0, -1, -2, -1, -2], // Q
    [-1,  0,  0,  2, -4,  2,  5, -2,  0, -3, -3,  1, -2, -3, -1,  0, -1, -3, -2, -2], // E
    [ 0, -2,  0, -1, -3, -2, -2,  6, -2, -4, -4, -2, -3, -3, -2,  0, -2, -2, -3, -3], // G
    [-2,  0,  1, -1, -3,  0,  0, -2,  8, -3, -3, -1, -2, -1, -2, -1, -2, -2,  2, -3], // H
    [-1, -3, -3, -3, -1, -3, -3, -4, -3,  4,  2, -3,  1,  0, -3, -2, -1, -3, -1,  3], // I
    [-1, -2, -3, -4, -1, -2, -3, -4, -3,  2,  4, -2,  2,  0, -3, -2, -1, -2, -1,  1], // L
    [-1,  2,  0, -1, -3,  1,  1, -2, -1, -3, -2,  5, -1, -3, -1,  0, -1, -3, -2, -2], // K
    [-1, -1, -2, -3, -1,  0, -2, -3, -2,  1,  2, -1,  5,  0, -2, -1, -1, -1, -1,  1], // M
    [-2, -3, -3, -3, -2, -3, -3, -3, -1,  0,  0, -3,  0,  6, -4, -2, -2,  1,  3, -1], // F
    [-1, -2, -2, -1, -3, -1, -1, -2, -2, -3, -3, -1, -2, -4,  7, -1, -1, -4, -3, -2], // P
    [ 1, -1,  1,  0, -1,  0,  0,  0, -1, -2, -2,  0, -1, -2, -1,  4,  1, -3, -2, -2], // S
    [ 0, -1,  0, -1, -1, -1, -1, -2, -2, -1, -1, -1, -1, -2, -1,  1,  5, -2, -2,  0], // T
    [-3, -3, -4, -4, -2, -2, -3, -2, -2, -3, -2, -3, -1,  1, -4, -3, -2, 11,  2, -3], // W
    [-2, -2, -2, -3, -2, -1, -2, -3,  2, -1, -1, -2, -1,  3, -3, -2, -2,  2,  7, -1], // Y
    [ 0, -3, -3, -3, -1, -2, -2, -3, -3,  3,  1, -2,  1, -1, -2, -2,  0, -3, -1,  4], // V
];

/// Position of `residue` in [`ALPHABET`]. Case-sensitive.
pub fn residue_index(residue: u8) -> Option<usize> {
    ALPHABET.iter().position(|&aa| aa == residue)
}

/// Fails on the first byte that is not one of the 20 standard residues.
pub fn validate_residues(residues: &[u8]) -> Result<()> {
    match residues.iter().position(|&r| residue_index(r).is_none()) {
        Some(pos) => {
            debug!("non-standard residue {:?} at position {}", residues[pos] as char, pos);
            Err(AlignerError::InvalidResidue(residues[pos] as char))
        }
        None => Ok(()),
    }
}

/// 20x20 amino-acid substitution scores.
///
/// Rows and columns follow [`ALPHABET`]. Symmetry is typical for published
/// matrices but is not required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionMatrix {
    scores: [[i32; ALPHABET_SIZE]; ALPHABET_SIZE],
}

impl Default for SubstitutionMatrix {
    fn default() -> Self {
        Self::blosum62()
    }
}

impl SubstitutionMatrix {
    pub fn new(scores: [[i32; ALPHABET_SIZE]; ALPHABET_SIZE]) -> Self {
        Self { scores }
    }

    pub fn blosum62() -> Self {
        Self::new(BLOSUM62)
    }

    /// Identity matrix: `match_score` on the diagonal, `mismatch_score` elsewhere.
    pub fn from_match_mismatch(match_score: i32, mismatch_score: i32) -> Self {
        let mut scores = [[mismatch_score; ALPHABET_SIZE]; ALPHABET_SIZE];
        for (i, row) in scores.iter_mut().enumerate() {
            row[i] = match_score;
        }
        Self::new(scores)
    }

    /// Score at the intersection of `a`'s row and `b`'s column.
    ///
    /// # Errors
    ///
    /// [`AlignerError::InvalidResidue`] if either symbol is outside the
    /// standard alphabet. Lowercase letters are rejected.
    pub fn score(&self, a: u8, b: u8) -> Result<i32> {
        let row = residue_index(a).ok_or(AlignerError::InvalidResidue(a as char))?;
        let col = residue_index(b).ok_or(AlignerError::InvalidResidue(b as char))?;
        Ok(self.scores[row][col])
    }

    pub fn is_symmetric(&self) -> bool {
        (0..ALPHABET_SIZE).all(|i| (0..i).all(|j| self.scores[i][j] == self.scores[j][i]))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| AlignerError::MatrixUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        let matrix = Self::from_reader(BufReader::new(file))?;
        info!("loaded substitution matrix {}", path.display());
        Ok(matrix)
    }

    /// Parses NCBI-style matrix text: `#` comments, a header of column
    /// labels, then one labelled row per residue. Labels outside the standard
    /// alphabet (B, Z, X, `*`) are ignored. A line that cannot be read is
    /// reported as [`AlignerError::MatrixFormat`] at that line.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut columns: Option<Vec<Option<usize>>> = None;
        let mut scores = [[0; ALPHABET_SIZE]; ALPHABET_SIZE];
        let mut seen_rows = [false; ALPHABET_SIZE];

        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.map_err(|e| AlignerError::MatrixFormat {
                line: line_no,
                msg: format!("cannot read line: {}", e),
            })?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some(header) = columns.as_ref() else {
                let labels = line
                    .split_whitespace()
                    .map(|token| parse_label(token, line_no).map(residue_index))
                    .collect::<Result<Vec<_>>>()?;
                check_complete(labels.iter().flatten().copied(), "header", line_no)?;
                columns = Some(labels);
                continue;
            };

            let mut tokens = line.split_whitespace();
            let label = tokens.next().map(|t| parse_label(t, line_no)).transpose()?;
            let values = tokens
                .map(|token| {
                    token.parse::<i32>().map_err(|_| AlignerError::MatrixFormat {
                        line: line_no,
                        msg: format!("'{}' is not an integer score", token),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            if values.len() != header.len() {
                return Err(AlignerError::MatrixFormat {
                    line: line_no,
                    msg: format!("expected {} scores, found {}", header.len(), values.len()),
                });
            }

            let Some(row) = label.and_then(residue_index) else {
                continue;
            };
            if seen_rows[row] {
                return Err(AlignerError::MatrixFormat {
                    line: line_no,
                    msg: format!("duplicate row for residue '{}'", ALPHABET[row] as char),
                });
            }
            seen_rows[row] = true;
            for (col, value) in header.iter().zip(values) {
                if let Some(col) = col {
                    scores[row][*col] = value;
                }
            }
        }

        if columns.is_none() {
            return Err(AlignerError::MatrixFormat {
                line: 0,
                msg: "no header line found".to_string(),
            });
        }
        let rows = seen_rows.iter().enumerate().filter(|(_, &seen)| seen).map(|(i, _)| i);
        check_complete(rows, "rows", 0)?;

        let matrix = Self::new(scores);
        debug!("parsed substitution matrix (symmetric: {})", matrix.is_symmetric());
        Ok(matrix)
    }
}

fn parse_label(token: &str, line: usize) -> Result<u8> {
    match token.as_bytes() {
        [label] => Ok(*label),
        _ => Err(AlignerError::MatrixFormat {
            line,
            msg: format!("'{}' is not a single-character residue label", token),
        }),
    }
}

fn check_complete(indices: impl Iterator<Item = usize>, what: &str, line: usize) -> Result<()> {
    let mut present = [false; ALPHABET_SIZE];
    indices.for_each(|i| present[i] = true);
    match present.iter().position(|&p| !p) {
        Some(missing) => Err(AlignerError::MatrixFormat {
            line,
            msg: format!("{} missing standard residue '{}'", what, ALPHABET[missing] as char),
        }),
        None => Ok(()),
    }
}
