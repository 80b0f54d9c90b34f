use std::fmt;

use crate::matrix::AlignmentMatrix;
use crate::scoring::SubstitutionMatrix;
use crate::{AlignerError, Result, GAP};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracebackOperation {
    Match,
    Mismatch,
    /// Residue of the second sequence against a gap.
    Insertion,
    /// Residue of the first sequence against a gap.
    Deletion,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlignmentStats {
    pub matches: usize,
    pub mismatches: usize,
    pub gaps: usize,
}

impl AlignmentStats {
    /// Fraction of alignment columns holding identical residues.
    pub fn identity(&self) -> f64 {
        let columns = self.matches + self.mismatches + self.gaps;
        if columns == 0 {
            0.0
        } else {
            self.matches as f64 / columns as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentResult {
    pub score: i32,
    pub aligned_seq1: String,
    pub aligned_seq2: String,
    pub operations: Vec<TracebackOperation>,
}

impl AlignmentResult {
    /// Number of alignment columns.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn statistics(&self) -> AlignmentStats {
        self.operations
            .iter()
            .fold(AlignmentStats::default(), |mut acc, op| {
                match op {
                    TracebackOperation::Match => acc.matches += 1,
                    TracebackOperation::Mismatch => acc.mismatches += 1,
                    TracebackOperation::Insertion | TracebackOperation::Deletion => acc.gaps += 1,
                }
                acc
            })
    }
}

impl fmt::Display for AlignmentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sequence 1: {}", self.aligned_seq1)?;
        writeln!(f, "Sequence 2: {}", self.aligned_seq2)?;
        write!(f, "Score: {}", self.score)
    }
}

/// Walks a filled [`AlignmentMatrix`] from `(n, m)` back to `(0, 0)`.
///
/// Moves are tried diagonal, then up, then left; the first one consistent
/// with the cell value wins, which makes the reported alignment
/// reproducible when several optimal paths exist.
pub struct Traceback<'a> {
    matrix: &'a AlignmentMatrix,
    seq1: &'a [u8],
    seq2: &'a [u8],
    scoring: &'a SubstitutionMatrix,
    gap_penalty: i32,
}

impl<'a> Traceback<'a> {
    pub fn new(
        matrix: &'a AlignmentMatrix,
        seq1: &'a [u8],
        seq2: &'a [u8],
        scoring: &'a SubstitutionMatrix,
        gap_penalty: i32,
    ) -> Self {
        Self {
            matrix,
            seq1,
            seq2,
            scoring,
            gap_penalty,
        }
    }

    pub fn reconstruct_alignment(&self) -> Result<AlignmentResult> {
        let capacity = self.seq1.len() + self.seq2.len();
        let mut aligned_seq1 = reserve(capacity)?;
        let mut aligned_seq2 = reserve(capacity)?;
        let mut operations = reserve(capacity)?;

        let mut i = self.seq1.len();
        let mut j = self.seq2.len();

        let gap = i64::from(self.gap_penalty);
        let cell = |row, col| i64::from(self.matrix.get(row, col));

        while i > 0 || j > 0 {
            let current = cell(i, j);

            if i > 0 && j > 0 {
                let (a, b) = (self.seq1[i - 1], self.seq2[j - 1]);
                if current == cell(i - 1, j - 1) + i64::from(self.scoring.score(a, b)?) {
                    aligned_seq1.push(a);
                    aligned_seq2.push(b);
                    operations.push(if a == b {
                        TracebackOperation::Match
                    } else {
                        TracebackOperation::Mismatch
                    });
                    i -= 1;
                    j -= 1;
                    continue;
                }
            }

            let up = i > 0 && current == cell(i - 1, j) + gap;
            let left = j > 0 && current == cell(i, j - 1) + gap;

            // Without a consistent move, drain whichever sequence remains.
            if up || (!left && i > 0) {
                aligned_seq1.push(self.seq1[i - 1]);
                aligned_seq2.push(GAP);
                operations.push(TracebackOperation::Deletion);
                i -= 1;
            } else {
                aligned_seq1.push(GAP);
                aligned_seq2.push(self.seq2[j - 1]);
                operations.push(TracebackOperation::Insertion);
                j -= 1;
            }
        }

        aligned_seq1.reverse();
        aligned_seq2.reverse();
        operations.reverse();

        Ok(AlignmentResult {
            score: self.matrix.final_score(),
            aligned_seq1: aligned_seq1.into_iter().map(char::from).collect(),
            aligned_seq2: aligned_seq2.into_iter().map(char::from).collect(),
            operations,
        })
    }
}

fn reserve<T>(capacity: usize) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(capacity).map_err(|e| {
        AlignerError::AllocationFailure(format!("traceback buffer of {} entries: {}", capacity, e))
    })?;
    Ok(buf)
}
