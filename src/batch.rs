use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, warn};

use crate::scoring::SubstitutionMatrix;
use crate::sequence::Sequence;
use crate::traceback::AlignmentResult;
use crate::{align, AlignerError, Result};

/// Fixed pool of worker threads aligning independent sequence pairs.
///
/// Each pair is aligned on a single thread; parallelism is across pairs only.
pub struct BatchAligner {
    work_tx: Option<Sender<WorkItem>>,
    result_rx: Receiver<WorkResult>,
    workers: Vec<thread::JoinHandle<()>>,
}

struct WorkItem {
    index: usize,
    seq1: Sequence,
    seq2: Sequence,
}

struct WorkResult {
    index: usize,
    worker_id: usize,
    result: Result<AlignmentResult>,
}

impl BatchAligner {
    pub fn new(scoring: Arc<SubstitutionMatrix>, gap_penalty: i32, threads: usize) -> Result<Self> {
        let (work_tx, work_rx) = unbounded();
        let (result_tx, result_rx) = unbounded();
        let mut workers = Vec::with_capacity(threads);

        for worker_id in 0..threads.max(1) {
            let scoring = Arc::clone(&scoring);
            let work_rx = work_rx.clone();
            let result_tx = result_tx.clone();
            let worker = thread::Builder::new()
                .name(format!("align-worker-{}", worker_id))
                .spawn(move || Self::worker(worker_id, &scoring, gap_penalty, work_rx, result_tx))
                .map_err(|e| AlignerError::WorkerError(format!("failed to spawn worker {}: {}", worker_id, e)))?;
            workers.push(worker);
        }
        debug!("started {} alignment workers", workers.len());

        Ok(Self {
            work_tx: Some(work_tx),
            result_rx,
            workers,
        })
    }

    fn worker(
        worker_id: usize,
        scoring: &SubstitutionMatrix,
        gap_penalty: i32,
        work_rx: Receiver<WorkItem>,
        result_tx: Sender<WorkResult>,
    ) {
        while let Ok(work) = work_rx.recv() {
            let result = Self::run_item(work.index, || {
                align(work.seq1.residues(), work.seq2.residues(), scoring, gap_penalty)
            });
            if result_tx
                .send(WorkResult {
                    index: work.index,
                    worker_id,
                    result,
                })
                .is_err()
            {
                break;
            }
        }
    }

    /// A panicking item still yields a result, so the collector never waits
    /// on an answer that will not come.
    fn run_item<F>(index: usize, job: F) -> Result<AlignmentResult>
    where
        F: FnOnce() -> Result<AlignmentResult>,
    {
        panic::catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|_| {
            warn!("alignment of pair {} panicked", index);
            Err(AlignerError::WorkerError(format!("alignment of pair {} panicked", index)))
        })
    }

    /// Aligns every pair and returns results in input order.
    ///
    /// All pairs are processed even when some fail; the error reported is the
    /// one belonging to the earliest failing pair.
    pub fn align_parallel(&mut self, pairs: Vec<(Sequence, Sequence)>) -> Result<Vec<AlignmentResult>> {
        let work_tx = self
            .work_tx
            .as_ref()
            .ok_or_else(|| AlignerError::WorkerError("worker pool is shut down".to_string()))?;

        let total = pairs.len();
        for (index, (seq1, seq2)) in pairs.into_iter().enumerate() {
            work_tx
                .send(WorkItem { index, seq1, seq2 })
                .map_err(|e| AlignerError::WorkerError(e.to_string()))?;
        }

        let mut slots: Vec<Option<Result<AlignmentResult>>> = (0..total).map(|_| None).collect();
        for _ in 0..total {
            let work_result = self
                .result_rx
                .recv()
                .map_err(|e| AlignerError::WorkerError(e.to_string()))?;
            debug!("pair {} aligned by worker {}", work_result.index, work_result.worker_id);
            slots[work_result.index] = Some(work_result.result);
        }

        slots
            .into_iter()
            .map(|slot| slot.unwrap_or_else(|| Err(AlignerError::WorkerError("missing result".to_string()))))
            .collect()
    }
}

impl Drop for BatchAligner {
    fn drop(&mut self) {
        // Closing the work channel stops the workers.
        self.work_tx.take();

        while let Some(worker) = self.workers.pop() {
            if worker.join().is_err() {
                warn!("alignment worker panicked");
            }
        }
    }
}
