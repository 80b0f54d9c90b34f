use log::warn;

use crate::{AlignerError, Result};

pub const DEFAULT_GAP_PENALTY: i32 = -4;
pub const MAX_THREADS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignerParameters {
    gap_penalty: i32,
    threads: usize,
}

impl Default for AlignerParameters {
    fn default() -> Self {
        Self {
            gap_penalty: DEFAULT_GAP_PENALTY,
            threads: 1,
        }
    }
}

impl AlignerParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score added per gap position. Normally negative; a positive value is
    /// accepted but rewards gaps.
    pub fn with_gap_penalty(mut self, gap_penalty: i32) -> Self {
        if gap_penalty > 0 {
            warn!("gap penalty {} is positive and will favour gapped alignments", gap_penalty);
        }
        self.gap_penalty = gap_penalty;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Result<Self> {
        if threads == 0 || threads > MAX_THREADS {
            return Err(AlignerError::InvalidParameter(format!(
                "thread count must be between 1 and {}, got {}",
                MAX_THREADS, threads
            )));
        }
        self.threads = threads;
        Ok(self)
    }

    pub fn gap_penalty(&self) -> i32 {
        self.gap_penalty
    }

    pub fn threads(&self) -> usize {
        self.threads
    }
}
