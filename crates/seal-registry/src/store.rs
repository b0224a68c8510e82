//! # Versioned Seal Store
//!
//! The registry's persistence collaborator. Every record carries a version
//! that increments on each write; writers read a version, compute the new
//! record, and commit only if the version is unchanged.
//!
//! [`InMemorySealStore`] keeps records behind a `parking_lot::RwLock` and
//! bounds every lock acquisition by a configured timeout so a stuck writer
//! surfaces as [`StoreError::Timeout`] instead of a hang.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Serialize};

use seal_core::{LotNumber, Prefix, SealCode};
use seal_state::{Seal, SealStatus};

use crate::error::{SnapshotError, StoreError};
use crate::guard::is_in_stock;

/// A record together with the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versioned<T> {
    pub value: T,
    pub version: u64,
}

/// Persistence for seals with per-record compare-and-swap.
///
/// Implementations must be safe to share across threads. Batch writes are
/// all-or-nothing.
pub trait SealStore: Send + Sync {
    /// Read one seal.
    fn get(&self, code: &SealCode) -> Result<Option<Versioned<Seal>>, StoreError>;

    /// Read every seal.
    fn list(&self) -> Result<Vec<Versioned<Seal>>, StoreError>;

    /// Every seal whose lot number equals `lot`.
    fn lot_members(&self, lot: &LotNumber) -> Result<Vec<Versioned<Seal>>, StoreError>;

    /// Suffixes already issued under `prefix`.
    fn suffixes(&self, prefix: &Prefix) -> Result<Vec<u64>, StoreError>;

    /// Insert new seals at version 1. Fails with `DuplicateCode` and writes
    /// nothing if any code already exists.
    fn insert_all(&self, seals: Vec<Seal>) -> Result<(), StoreError>;

    /// Replace one seal if its stored version equals `expected_version`.
    /// Returns the new version.
    fn compare_and_swap(&self, expected_version: u64, seal: Seal) -> Result<u64, StoreError>;

    /// Replace several seals atomically; any version mismatch writes nothing.
    fn compare_and_swap_all(&self, updates: Vec<(u64, Seal)>) -> Result<(), StoreError>;
}

type Records = HashMap<SealCode, Versioned<Seal>>;

/// Thread-safe in-memory [`SealStore`].
#[derive(Debug, Clone)]
pub struct InMemorySealStore {
    data: Arc<RwLock<Records>>,
    lock_timeout: Duration,
}

impl InMemorySealStore {
    /// An empty store whose lock acquisitions give up after `lock_timeout`.
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
            lock_timeout,
        }
    }

    /// A store pre-loaded from a snapshot.
    ///
    /// The records are checked against the invariants generation and
    /// transitions maintain; one bad record rejects the whole snapshot.
    pub fn from_snapshot(
        records: Vec<Versioned<Seal>>,
        lock_timeout: Duration,
    ) -> Result<Self, SnapshotError> {
        validate_snapshot(&records)?;
        let data = records
            .into_iter()
            .map(|r| (r.value.code().clone(), r))
            .collect();
        Ok(Self {
            data: Arc::new(RwLock::new(data)),
            lock_timeout,
        })
    }

    /// Every record, ordered by code.
    pub fn snapshot(&self) -> Result<Vec<Versioned<Seal>>, StoreError> {
        let mut records = self.list()?;
        records.sort_by(|a, b| a.value.code().cmp(b.value.code()));
        Ok(records)
    }

    fn read(&self, operation: &'static str) -> Result<RwLockReadGuard<'_, Records>, StoreError> {
        self.data
            .try_read_for(self.lock_timeout)
            .ok_or_else(|| self.timeout(operation))
    }

    fn write(&self, operation: &'static str) -> Result<RwLockWriteGuard<'_, Records>, StoreError> {
        self.data
            .try_write_for(self.lock_timeout)
            .ok_or_else(|| self.timeout(operation))
    }

    fn timeout(&self, operation: &'static str) -> StoreError {
        StoreError::Timeout {
            operation,
            after_ms: u64::try_from(self.lock_timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

fn validate_snapshot(records: &[Versioned<Seal>]) -> Result<(), SnapshotError> {
    let mut codes = HashSet::with_capacity(records.len());
    let mut issued: BTreeMap<&Prefix, Vec<u64>> = BTreeMap::new();
    for record in records {
        let seal = &record.value;
        if record.version == 0 {
            return Err(SnapshotError::ZeroVersion {
                code: seal.code().clone(),
            });
        }
        if !code_matches(seal) {
            return Err(SnapshotError::CodeMismatch {
                code: seal.code().clone(),
                prefix: seal.prefix().clone(),
                suffix: seal.suffix(),
            });
        }
        if !codes.insert(seal.code()) {
            return Err(SnapshotError::DuplicateCode {
                code: seal.code().clone(),
            });
        }
        check_status(seal)?;
        issued.entry(seal.prefix()).or_default().push(seal.suffix());
    }

    for (prefix, mut suffixes) in issued {
        suffixes.sort_unstable();
        for (expected, found) in (1u64..).zip(suffixes) {
            if found != expected {
                return Err(SnapshotError::NonContiguous {
                    prefix: prefix.clone(),
                    expected,
                    found,
                });
            }
        }
    }
    Ok(())
}

/// The code is the prefix followed by nothing but the suffix's digits.
fn code_matches(seal: &Seal) -> bool {
    seal.code()
        .as_str()
        .strip_prefix(seal.prefix().as_str())
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse::<u64>().ok())
        == Some(seal.suffix())
}

fn check_status(seal: &Seal) -> Result<(), SnapshotError> {
    let status = seal.status();
    let problem = if status == SealStatus::Available && !is_in_stock(seal) {
        Some("available seal still holds an owner reference")
    } else if status.requires_sector() && seal.sector_id().is_none() {
        Some("sector reference missing")
    } else if status == SealStatus::Linked && seal.shipment_id().is_none() {
        Some("shipment reference missing")
    } else if status.requires_reason()
        && seal.destruction_reason().map_or(true, |r| r.trim().is_empty())
    {
        Some("destruction reason missing")
    } else {
        None
    };
    match problem {
        Some(problem) => Err(SnapshotError::InconsistentStatus {
            code: seal.code().clone(),
            status,
            problem,
        }),
        None => Ok(()),
    }
}

fn check_version(data: &Records, code: &SealCode, expected: u64) -> Result<(), StoreError> {
    let current = data
        .get(code)
        .ok_or_else(|| StoreError::NotFound { code: code.clone() })?;
    if current.version != expected {
        return Err(StoreError::VersionConflict {
            code: code.clone(),
            expected,
            actual: current.version,
        });
    }
    Ok(())
}

impl SealStore for InMemorySealStore {
    fn get(&self, code: &SealCode) -> Result<Option<Versioned<Seal>>, StoreError> {
        Ok(self.read("get")?.get(code).cloned())
    }

    fn list(&self) -> Result<Vec<Versioned<Seal>>, StoreError> {
        Ok(self.read("list")?.values().cloned().collect())
    }

    fn lot_members(&self, lot: &LotNumber) -> Result<Vec<Versioned<Seal>>, StoreError> {
        Ok(self
            .read("lot_members")?
            .values()
            .filter(|r| r.value.lot_number() == Some(lot))
            .cloned()
            .collect())
    }

    fn suffixes(&self, prefix: &Prefix) -> Result<Vec<u64>, StoreError> {
        Ok(self
            .read("suffixes")?
            .values()
            .filter(|r| r.value.prefix() == prefix)
            .map(|r| r.value.suffix())
            .collect())
    }

    fn insert_all(&self, seals: Vec<Seal>) -> Result<(), StoreError> {
        let mut data = self.write("insert_all")?;
        let mut batch: Records = HashMap::with_capacity(seals.len());
        for seal in seals {
            let code = seal.code().clone();
            if data.contains_key(&code) || batch.contains_key(&code) {
                return Err(StoreError::DuplicateCode { code });
            }
            batch.insert(code, Versioned { value: seal, version: 1 });
        }
        data.extend(batch);
        Ok(())
    }

    fn compare_and_swap(&self, expected_version: u64, seal: Seal) -> Result<u64, StoreError> {
        let mut data = self.write("compare_and_swap")?;
        let code = seal.code().clone();
        check_version(&data, &code, expected_version)?;
        let version = expected_version + 1;
        data.insert(code, Versioned { value: seal, version });
        Ok(version)
    }

    fn compare_and_swap_all(&self, updates: Vec<(u64, Seal)>) -> Result<(), StoreError> {
        let mut data = self.write("compare_and_swap_all")?;
        for (expected, seal) in &updates {
            check_version(&data, seal.code(), *expected)?;
        }
        for (expected, seal) in updates {
            data.insert(
                seal.code().clone(),
                Versioned {
                    value: seal,
                    version: expected + 1,
                },
            );
        }
        Ok(())
    }
}
