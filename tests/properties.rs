//! Property tests for alignment invariants.

use pairwise_aligner::{align, AlignmentMatrix, SubstitutionMatrix, ALPHABET};
use proptest::prelude::*;

fn arb_protein(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(ALPHABET.to_vec()), 0..max_len)
}

fn residues_only(aligned: &str) -> Vec<u8> {
    aligned.bytes().filter(|&b| b != b'-').collect()
}

proptest! {
    #[test]
    fn test_score_symmetric_under_swap(
        a in arb_protein(30),
        b in arb_protein(30),
        gap in -12i32..0,
    ) {
        let scoring = SubstitutionMatrix::blosum62();
        let forward = align(&a, &b, &scoring, gap).unwrap();
        let reverse = align(&b, &a, &scoring, gap).unwrap();
        prop_assert_eq!(forward.score, reverse.score);
    }

    #[test]
    fn test_aligned_lengths_equal_and_residues_preserved(
        a in arb_protein(40),
        b in arb_protein(40),
        gap in -12i32..4,
    ) {
        let result = align(&a, &b, &SubstitutionMatrix::blosum62(), gap).unwrap();
        prop_assert_eq!(result.aligned_seq1.len(), result.aligned_seq2.len());
        prop_assert_eq!(result.aligned_seq1.len(), result.operations.len());
        prop_assert_eq!(residues_only(&result.aligned_seq1), a);
        prop_assert_eq!(residues_only(&result.aligned_seq2), b);
        // No column pairs two gaps.
        prop_assert!(result
            .aligned_seq1
            .bytes()
            .zip(result.aligned_seq2.bytes())
            .all(|(x, y)| x != b'-' || y != b'-'));
    }

    #[test]
    fn test_score_equals_matrix_corner(
        a in arb_protein(25),
        b in arb_protein(25),
        gap in -10i32..0,
    ) {
        let scoring = SubstitutionMatrix::blosum62();
        let matrix = AlignmentMatrix::build(&a, &b, &scoring, gap).unwrap();
        let result = align(&a, &b, &scoring, gap).unwrap();
        prop_assert_eq!(result.score, matrix.final_score());
    }

    #[test]
    fn test_self_alignment_is_gapless(a in arb_protein(40), gap in -8i32..0) {
        // Identity scores of 20 exceed twice any gap magnitude used here.
        let scoring = SubstitutionMatrix::from_match_mismatch(20, -1);
        let text = String::from_utf8(a.clone()).unwrap();
        let result = align(&a, &a, &scoring, gap).unwrap();
        prop_assert_eq!(&result.aligned_seq1, &text);
        prop_assert_eq!(&result.aligned_seq2, &text);
        prop_assert_eq!(result.score, 20 * a.len() as i32);
    }

    #[test]
    fn test_empty_against_any(b in arb_protein(50), gap in -10i32..10) {
        let result = align(b"", &b, &SubstitutionMatrix::blosum62(), gap).unwrap();
        prop_assert_eq!(result.score, gap * b.len() as i32);
        prop_assert!(result.aligned_seq1.bytes().all(|c| c == b'-'));
        prop_assert_eq!(result.aligned_seq2.as_bytes(), &b[..]);
    }
}
