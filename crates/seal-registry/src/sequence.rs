//! # Sequence Allocation
//!
//! Each prefix owns an ordered sequence of suffixes starting at 1. A
//! generation batch must begin exactly at `max(existing) + 1`: no gaps and
//! no overlap. The allocator validates a requested range against the
//! suffixes already issued and hands out the per-prefix lock that keeps
//! the read-validate-insert cycle of concurrent generations serialized.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use seal_core::{Prefix, SealCode};

use crate::config::RegistryConfig;
use crate::error::SequenceError;

/// A validated generation batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangePlan {
    pub prefix: Prefix,
    pub start: u64,
    pub end: u64,
    /// `(suffix, code)` for every seal in `start..=end`.
    pub codes: Vec<(u64, SealCode)>,
}

/// Per-prefix range validation and locking.
#[derive(Debug)]
pub struct SequenceAllocator {
    locks: DashMap<Prefix, Arc<Mutex<()>>>,
    code_width: usize,
    max_batch: u64,
}

impl SequenceAllocator {
    pub fn new(config: &RegistryConfig) -> Self {
        Self {
            locks: DashMap::new(),
            code_width: config.code_width,
            max_batch: config.max_generate_batch,
        }
    }

    /// `max(existing) + 1`, or 1 for a prefix with no seals.
    pub fn next_expected(existing: &[u64]) -> u64 {
        existing.iter().max().map_or(1, |max| max.saturating_add(1))
    }

    /// The lock serializing generation under `prefix`. The caller acquires it
    /// with its own timeout.
    pub fn prefix_lock(&self, prefix: &Prefix) -> Arc<Mutex<()>> {
        self.locks.entry(prefix.clone()).or_default().clone()
    }

    /// Check `start..=end` against the issued suffixes of `prefix`.
    ///
    /// Rejects `end < start`, then an oversize batch, then any start other
    /// than the next expected suffix. Codes that collide with another
    /// prefix's seals are caught by the caller against the store.
    pub fn validate_range(
        &self,
        prefix: &Prefix,
        start: u64,
        end: u64,
        existing: &[u64],
    ) -> Result<RangePlan, SequenceError> {
        if end < start {
            return Err(SequenceError::InvalidRange { start, end });
        }
        // A full-width range has more members than u64 can count.
        let requested = (end - start).checked_add(1).unwrap_or(u64::MAX);
        if requested > self.max_batch {
            return Err(SequenceError::RangeTooLarge {
                requested,
                max: self.max_batch,
            });
        }
        let expected = Self::next_expected(existing);
        if start != expected {
            return Err(SequenceError::NonContiguous {
                prefix: prefix.clone(),
                expected,
                start,
            });
        }
        let codes = (start..=end)
            .map(|suffix| (suffix, SealCode::compose(prefix, suffix, self.code_width)))
            .collect();
        Ok(RangePlan {
            prefix: prefix.clone(),
            start,
            end,
            codes,
        })
    }

    pub fn code_width(&self) -> usize {
        self.code_width
    }
}
