//! Scan orchestration contract.
//!
//! Physical scan execution is external; this module fixes the contract a
//! plan feeds into: one scanner per ready segment, results concatenated
//! in segment order (never merged by key), per-segment resources released
//! when the stream is dropped, however consumption ends.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{CubeplanError, Result};
use crate::planner::Plan;

/// A ready cube segment, in range order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentInfo {
    pub name: String,
    pub input_records: u64,
}

/// Failure while constructing a segment scanner.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A dimension value could not be resolved against the segment
    /// dictionary. Benign on a segment that holds no records at all.
    #[error("unresolved dictionary value in segment {segment}: {detail}")]
    DictionaryMiss { segment: String, detail: String },
    #[error("segment {segment} scanner failed: {detail}")]
    Failed { segment: String, detail: String },
}

/// One result row; value decoding is the scanner's concern.
pub type Tuple = Vec<serde_json::Value>;

pub type TupleStream = Box<dyn Iterator<Item = Result<Tuple>>>;

pub trait ScannerFactory {
    /// Open a scanner over one segment for the given plan. The scanner
    /// owns its segment resources and releases them on drop.
    fn open(&self, segment: &SegmentInfo, plan: &Plan)
        -> std::result::Result<TupleStream, ScanError>;
}

/// Open one scanner per ready segment. A dictionary miss on a segment
/// with zero input records means the segment is genuinely empty and is
/// skipped with a warning; any other construction failure aborts the
/// whole query, since a partial result must never be returned.
pub fn open_segment_scanners(
    factory: &dyn ScannerFactory,
    segments: &[SegmentInfo],
    plan: &Plan,
) -> Result<SequentialTupleIterator> {
    let mut scanners = VecDeque::new();
    for segment in segments {
        match factory.open(segment, plan) {
            Ok(scanner) => scanners.push_back(scanner),
            Err(ScanError::DictionaryMiss { .. }) if segment.input_records == 0 => {
                tracing::warn!(
                    segment = %segment.name,
                    "segment has no input records, skipping it"
                );
            }
            Err(err) => return Err(CubeplanError::Scan(err.to_string())),
        }
    }
    Ok(SequentialTupleIterator { scanners })
}

/// Lazy concatenation of per-segment scanners in fixed segment order.
/// Finite and non-restartable; dropping it mid-stream drops every
/// remaining scanner.
pub struct SequentialTupleIterator {
    scanners: VecDeque<TupleStream>,
}

impl SequentialTupleIterator {
    pub fn empty() -> Self {
        Self {
            scanners: VecDeque::new(),
        }
    }
}

impl std::fmt::Debug for SequentialTupleIterator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequentialTupleIterator")
            .field("scanners", &self.scanners.len())
            .finish()
    }
}

impl Iterator for SequentialTupleIterator {
    type Item = Result<Tuple>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let scanner = self.scanners.front_mut()?;
            match scanner.next() {
                Some(item) => return Some(item),
                None => {
                    // exhausted scanner is dropped here, releasing its
                    // segment resources before the next one is consumed
                    self.scanners.pop_front();
                }
            }
        }
    }
}
