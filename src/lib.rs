//! Global pairwise alignment of protein sequences.
//!
//! Scores come from a 20x20 amino-acid substitution matrix and a linear gap
//! penalty. The score matrix is filled Needleman-Wunsch style (penalized
//! borders, no clamping to zero) and a single optimal path is recovered by
//! traceback with a fixed diagonal > up > left preference.
//!
//! ```
//! use pairwise_aligner::{align, SubstitutionMatrix};
//!
//! let scoring = SubstitutionMatrix::from_match_mismatch(4, -1);
//! let result = align(b"ACD", b"ACD", &scoring, -1)?;
//! assert_eq!(result.score, 12);
//! assert_eq!(result.aligned_seq1, "ACD");
//! # Ok::<(), pairwise_aligner::AlignerError>(())
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use log::debug;
use thiserror::Error;

pub mod batch;
pub mod config;
pub mod fasta;
pub mod matrix;
pub mod scoring;
pub mod sequence;
pub mod traceback;

pub use batch::BatchAligner;
pub use config::{AlignerParameters, DEFAULT_GAP_PENALTY, MAX_THREADS};
pub use matrix::AlignmentMatrix;
pub use scoring::{residue_index, SubstitutionMatrix, ALPHABET, ALPHABET_SIZE};
pub use sequence::Sequence;
pub use traceback::{AlignmentResult, AlignmentStats, Traceback, TracebackOperation};

/// Gap marker in aligned output.
pub const GAP: u8 = b'-';

/// Longest sequence accepted. Bounds the matrix dimensions only; scores are
/// range-checked separately and overflow is reported as
/// [`AlignerError::ScoreOverflow`].
pub const MAX_SEQUENCE_SIZE: usize = 134_150_000;

#[derive(Debug, Error)]
pub enum AlignerError {
    #[error("invalid residue {0:?}: not one of the 20 standard amino acids")]
    InvalidResidue(char),
    #[error("input unavailable: {0}")]
    InputUnavailable(String),
    #[error("allocation failed: {0}")]
    AllocationFailure(String),
    #[error("sequence too large: {0} residues")]
    SequenceTooLarge(usize),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("score overflow at cell ({row}, {col}): gap penalty or substitution scores too large")]
    ScoreOverflow { row: usize, col: usize },
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read substitution matrix {}: {source}", .path.display())]
    MatrixUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed substitution matrix at line {line}: {msg}")]
    MatrixFormat { line: usize, msg: String },
    #[error("worker error: {0}")]
    WorkerError(String),
}

pub type Result<T> = std::result::Result<T, AlignerError>;

/// Optimal global alignment of `seq1` against `seq2`.
///
/// Every residue is checked against the standard alphabet before any work is
/// done, so residues that only ever sit opposite a gap are rejected too.
/// The score matrix lives only for the duration of the call.
pub fn align(
    seq1: &[u8],
    seq2: &[u8],
    scoring: &SubstitutionMatrix,
    gap_penalty: i32,
) -> Result<AlignmentResult> {
    crate::scoring::validate_residues(seq1)?;
    crate::scoring::validate_residues(seq2)?;

    let start_time = Instant::now();
    let matrix = AlignmentMatrix::build(seq1, seq2, scoring, gap_penalty)?;
    let result = Traceback::new(&matrix, seq1, seq2, scoring, gap_penalty).reconstruct_alignment()?;
    debug!(
        "aligned {} x {} residues in {:?} (score {})",
        seq1.len(),
        seq2.len(),
        start_time.elapsed(),
        result.score
    );

    Ok(result)
}

/// Aligner bound to a substitution matrix and parameters.
#[derive(Debug, Clone, Default)]
pub struct Aligner {
    params: AlignerParameters,
    scoring: Option<Arc<SubstitutionMatrix>>,
}

impl Aligner {
    pub fn new(params: AlignerParameters) -> Self {
        Self {
            params,
            scoring: None,
        }
    }

    pub fn with_matrix(mut self, scoring: SubstitutionMatrix) -> Self {
        self.scoring = Some(Arc::new(scoring));
        self
    }

    pub fn params(&self) -> &AlignerParameters {
        &self.params
    }

    fn scoring(&self) -> Result<&Arc<SubstitutionMatrix>> {
        self.scoring
            .as_ref()
            .ok_or_else(|| AlignerError::InputUnavailable("no substitution matrix loaded".to_string()))
    }

    pub fn align(&self, seq1: &Sequence, seq2: &Sequence) -> Result<AlignmentResult> {
        let scoring = self.scoring()?;
        align(seq1.residues(), seq2.residues(), scoring, self.params.gap_penalty())
    }

    /// Aligns independent pairs on `params.threads()` workers, preserving order.
    pub fn align_batch(&self, pairs: Vec<(Sequence, Sequence)>) -> Result<Vec<AlignmentResult>> {
        let scoring = Arc::clone(self.scoring()?);
        if self.params.threads() == 1 || pairs.len() < 2 {
            return pairs
                .iter()
                .map(|(seq1, seq2)| align(seq1.residues(), seq2.residues(), &scoring, self.params.gap_penalty()))
                .collect();
        }

        let threads = self.params.threads().min(pairs.len());
        let mut batch = BatchAligner::new(scoring, self.params.gap_penalty(), threads)?;
        batch.align_parallel(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_rejects_residue_opposite_gap() {
        // 'J' would never be scored: it is aligned against an empty sequence.
        let err = align(b"AJ", b"", &SubstitutionMatrix::blosum62(), -4).unwrap_err();
        assert!(matches!(err, AlignerError::InvalidResidue('J')));
    }

    #[test]
    fn test_aligner_requires_matrix() {
        let aligner = Aligner::new(AlignerParameters::new());
        let err = aligner
            .align(&Sequence::new(b"ACD"), &Sequence::new(b"ACD"))
            .unwrap_err();
        assert!(matches!(err, AlignerError::InputUnavailable(_)));
        assert!(aligner.align_batch(Vec::new()).is_err());
    }

    #[test]
    fn test_aligner_uses_parameters() {
        let aligner = Aligner::new(AlignerParameters::new().with_gap_penalty(-2))
            .with_matrix(SubstitutionMatrix::blosum62());
        let result = aligner.align(&Sequence::new(b"A"), &Sequence::new(b"")).unwrap();
        assert_eq!(result.score, -2);
        assert_eq!(result.aligned_seq2, "-");
    }

    #[test]
    fn test_align_batch_threaded_matches_single() {
        let pairs = vec![
            (Sequence::new(b"HEAGAWGHEE"), Sequence::new(b"PAWHEAE")),
            (Sequence::new(b"GATTACA"), Sequence::new(b"GCATGCT")),
            (Sequence::new(b"KK"), Sequence::new(b"")),
        ];
        let single = Aligner::new(AlignerParameters::new())
            .with_matrix(SubstitutionMatrix::blosum62())
            .align_batch(pairs.clone())
            .unwrap();
        let threaded = Aligner::new(AlignerParameters::new().with_threads(4).unwrap())
            .with_matrix(SubstitutionMatrix::blosum62())
            .align_batch(pairs)
            .unwrap();
        assert_eq!(single, threaded);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            AlignerError::InvalidResidue('B').to_string(),
            "invalid residue 'B': not one of the 20 standard amino acids"
        );
        let err = AlignerError::MatrixFormat { line: 4, msg: "bad".to_string() };
        assert_eq!(err.to_string(), "malformed substitution matrix at line 4: bad");
    }

    #[test]
    fn test_align_reports_score_overflow() {
        let err = align(b"AAA", b"", &SubstitutionMatrix::blosum62(), i32::MIN / 2).unwrap_err();
        assert!(matches!(err, AlignerError::ScoreOverflow { row: 3, col: 0 }), "{err}");

        let huge = SubstitutionMatrix::from_match_mismatch(i32::MAX / 2 + 1, -1);
        let err = align(b"AA", b"AA", &huge, -1).unwrap_err();
        assert!(matches!(err, AlignerError::ScoreOverflow { row: 2, col: 2 }), "{err}");
    }

    #[test]
    fn test_align_extreme_scores_within_range() {
        let result = align(b"AA", b"", &SubstitutionMatrix::blosum62(), i32::MIN / 2).unwrap();
        assert_eq!(result.score, i32::MIN / 2 * 2);

        let big = SubstitutionMatrix::from_match_mismatch(i32::MAX / 2, -1);
        let result = align(b"AA", b"AA", &big, -1).unwrap();
        assert_eq!(result.score, i32::MAX / 2 * 2);
    }

    #[test]
    fn test_align_batch_overflow_does_not_hang() {
        let pairs = vec![
            (Sequence::new(b"ACD"), Sequence::new(b"ACD")),
            (Sequence::new(b"AAAA"), Sequence::new(b"")),
            (Sequence::new(b"KK"), Sequence::new(b"K")),
        ];
        let params = AlignerParameters::new()
            .with_gap_penalty(i32::MIN / 3)
            .with_threads(3)
            .unwrap();
        let aligner = Aligner::new(params).with_matrix(SubstitutionMatrix::blosum62());
        let err = aligner.align_batch(pairs).unwrap_err();
        assert!(matches!(err, AlignerError::ScoreOverflow { row: 4, col: 0 }), "{err}");
    }
}
