use log::debug;

use crate::scoring::SubstitutionMatrix;
use crate::{AlignerError, Result, MAX_SEQUENCE_SIZE};

/// Dense (n+1) x (m+1) score grid stored row-major in one allocation.
///
/// Cell `(i, j)` holds the best score for aligning the first `i` residues of
/// the first sequence with the first `j` residues of the second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentMatrix {
    data: Vec<i32>,
    rows: usize,
    cols: usize,
}

impl AlignmentMatrix {
    /// Zero-filled matrix. Reservation failure is reported, not aborted on.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        let longest = rows.max(cols).saturating_sub(1);
        if longest > MAX_SEQUENCE_SIZE {
            return Err(AlignerError::SequenceTooLarge(longest));
        }

        let cells = rows.checked_mul(cols).ok_or_else(|| {
            AlignerError::AllocationFailure(format!("{} x {} cells overflow usize", rows, cols))
        })?;
        let data = allocate(cells)?;

        Ok(Self { data, rows, cols })
    }

    /// Fills the matrix for a global alignment with a linear gap penalty.
    ///
    /// Borders hold `i * gap_penalty` / `j * gap_penalty`; every inner cell is
    /// the best of the diagonal, up and left moves. Scores are never clamped.
    pub fn build(
        seq1: &[u8],
        seq2: &[u8],
        scoring: &SubstitutionMatrix,
        gap_penalty: i32,
    ) -> Result<Self> {
        let mut matrix = Self::new(seq1.len() + 1, seq2.len() + 1)?;
        debug!("filling {} x {} alignment matrix", matrix.rows, matrix.cols);

        let gap = i64::from(gap_penalty);
        for i in 0..matrix.rows {
            matrix.store(i, 0, i as i64 * gap)?;
        }
        for j in 0..matrix.cols {
            matrix.store(0, j, j as i64 * gap)?;
        }

        // Candidates are summed in i64; only the winner has to fit in a cell.
        for (i, &a) in seq1.iter().enumerate().map(|(i, a)| (i + 1, a)) {
            for (j, &b) in seq2.iter().enumerate().map(|(j, b)| (j + 1, b)) {
                let match_score = i64::from(matrix.get(i - 1, j - 1)) + i64::from(scoring.score(a, b)?);
                let delete_score = i64::from(matrix.get(i - 1, j)) + gap;
                let insert_score = i64::from(matrix.get(i, j - 1)) + gap;
                matrix.store(i, j, match_score.max(delete_score).max(insert_score))?;
            }
        }

        Ok(matrix)
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> i32 {
        self.data[row * self.cols + col]
    }

    #[inline]
    fn store(&mut self, row: usize, col: usize, value: i64) -> Result<()> {
        let value = i32::try_from(value).map_err(|_| AlignerError::ScoreOverflow { row, col })?;
        self.data[row * self.cols + col] = value;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Score of the full alignment, at the bottom-right corner.
    pub fn final_score(&self) -> i32 {
        self.get(self.rows - 1, self.cols - 1)
    }
}

fn allocate(cells: usize) -> Result<Vec<i32>> {
    let mut data = Vec::new();
    data.try_reserve_exact(cells)
        .map_err(|e| AlignerError::AllocationFailure(format!("alignment matrix of {} cells: {}", cells, e)))?;
    data.resize(cells, 0);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> SubstitutionMatrix {
        SubstitutionMatrix::from_match_mismatch(4, -1)
    }

    #[test]
    fn test_boundary_initialization() {
        let m = AlignmentMatrix::build(b"ACD", b"AC", &identity(), -2).unwrap();
        assert_eq!((m.rows(), m.cols()), (4, 3));
        for i in 0..4 {
            assert_eq!(m.get(i, 0), -2 * i as i32);
        }
        for j in 0..3 {
            assert_eq!(m.get(0, j), -2 * j as i32);
        }
    }

    #[test]
    fn test_recurrence_values() {
        let m = AlignmentMatrix::build(b"AC", b"AD", &identity(), -1).unwrap();
        // row 1: A vs A, A vs AD
        assert_eq!(m.get(1, 1), 4);
        assert_eq!(m.get(1, 2), 3);
        // row 2: AC vs A, AC vs AD
        assert_eq!(m.get(2, 1), 3);
        assert_eq!(m.get(2, 2), 3);
        assert_eq!(m.final_score(), 3);
    }

    #[test]
    fn test_no_clamping_to_zero() {
        let m = AlignmentMatrix::build(b"WW", b"PP", &SubstitutionMatrix::blosum62(), -10).unwrap();
        // W/P scores -4 each; two substitutions beat four gaps.
        assert_eq!(m.get(1, 1), -4);
        assert_eq!(m.final_score(), -8);
    }

    #[test]
    fn test_empty_sequences() {
        let m = AlignmentMatrix::build(b"", b"", &identity(), -3).unwrap();
        assert_eq!((m.rows(), m.cols()), (1, 1));
        assert_eq!(m.final_score(), 0);

        let m = AlignmentMatrix::build(b"", b"ACDE", &identity(), -3).unwrap();
        assert_eq!(m.final_score(), -12);
    }

    #[test]
    fn test_invalid_residue_propagates() {
        let err = AlignmentMatrix::build(b"ACD", b"AXD", &identity(), -1).unwrap_err();
        assert!(matches!(err, AlignerError::InvalidResidue('X')));
    }

    #[test]
    fn test_oversized_dimensions_rejected() {
        let err = AlignmentMatrix::new(MAX_SEQUENCE_SIZE + 2, 1).unwrap_err();
        assert!(matches!(err, AlignerError::SequenceTooLarge(n) if n == MAX_SEQUENCE_SIZE + 1));
    }

    #[test]
    fn test_unallocatable_matrix_is_an_error() {
        // Byte size exceeds isize::MAX, which no allocator accepts.
        let err = allocate(usize::MAX / 2).unwrap_err();
        assert!(matches!(err, AlignerError::AllocationFailure(_)), "{err}");
    }

    #[test]
    fn test_border_overflow_is_an_error() {
        let err = AlignmentMatrix::build(b"", b"AAA", &identity(), i32::MIN / 2).unwrap_err();
        assert!(matches!(err, AlignerError::ScoreOverflow { row: 0, col: 3 }), "{err}");

        let m = AlignmentMatrix::build(b"", b"AA", &identity(), i32::MIN / 2).unwrap();
        assert_eq!(m.final_score(), i32::MIN);
    }

    #[test]
    fn test_cell_overflow_is_an_error() {
        let huge = SubstitutionMatrix::from_match_mismatch(i32::MAX, i32::MIN);
        let err = AlignmentMatrix::build(b"AA", b"AA", &huge, 0).unwrap_err();
        assert!(matches!(err, AlignerError::ScoreOverflow { row: 2, col: 2 }), "{err}");
    }

    #[test]
    fn test_underflowing_candidate_does_not_fail_cell() {
        // The diagonal sum falls below i32::MIN but the gap moves win.
        let scoring = SubstitutionMatrix::from_match_mismatch(0, i32::MIN);
        let m = AlignmentMatrix::build(b"A", b"C", &scoring, -1).unwrap();
        assert_eq!(m.final_score(), -2);

        let m = AlignmentMatrix::build(b"AC", b"CA", &scoring, -1).unwrap();
        assert_eq!(m.get(1, 1), -2);
        assert_eq!(m.final_score(), -2);
    }
}
