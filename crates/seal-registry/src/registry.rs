//! # Seal Registry
//!
//! The single entry point for every seal operation. The registry owns the
//! read-validate-write cycle: it reads from the [`SealStore`], runs the
//! pure validators (sequence allocator, planner, guard, state machine),
//! and commits with compare-and-swap, retrying a bounded number of times
//! when another writer got there first.
//!
//! ## Concurrency
//!
//! - Generation holds the per-prefix lock from reading the issued suffixes
//!   through inserting the batch.
//! - Single-seal writes use optimistic concurrency on the record version.
//! - Distribution commits one transition per seal; a failed seal does not
//!   undo the ones before it.
//! - Lot destruction re-runs the guard on a fresh read and writes the whole
//!   lot in one atomic swap.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::Serialize;

use seal_core::{LotNumber, Prefix, SealCode, SectorId, Timestamp};
use seal_state::{
    display_label, display_status, sector_availability, CloseOutStatus, Seal, SealStatus,
    SectorAvailability, TransitionContext, TransitionError,
};

use crate::config::RegistryConfig;
use crate::directory::SectorDirectory;
use crate::error::{RegistryError, SequenceError, StoreError};
use crate::guard;
use crate::planner::{plan_auto, plan_manual, AssignmentMode, Plan};
use crate::report::BatchReport;
use crate::sequence::SequenceAllocator;
use crate::store::{InMemorySealStore, SealStore, Versioned};

// ─── Read models ─────────────────────────────────────────────────────

/// A stored seal as presented to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SealView {
    #[serde(flatten)]
    pub seal: Seal,
    /// Stored status with the reserved-and-owned reclassification applied.
    pub display_status: SealStatus,
    pub display_label: String,
    pub sector_name: Option<String>,
}

/// Listing criteria. All present criteria must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SealFilter {
    pub status: Option<SealStatus>,
    pub sector_id: Option<SectorId>,
    pub lot: Option<LotNumber>,
    /// Case-insensitive substring of the code or lot number.
    pub search: Option<String>,
    /// 1-based; values below 1 read as 1.
    pub page: Option<usize>,
    /// Clamped to `1..=max_page_size`.
    pub limit: Option<usize>,
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

/// Result of a successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Generated {
    pub prefix: Prefix,
    pub lot_number: Option<LotNumber>,
    pub created: Vec<SealCode>,
}

/// A committed distribution plan and its per-seal outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionOutcome {
    pub mode: AssignmentMode,
    pub plan: Plan,
    pub report: BatchReport,
}

impl DistributionOutcome {
    /// Codes that reached the target status.
    pub fn assigned(&self) -> &[SealCode] {
        &self.report.succeeded
    }
}

/// Destruction eligibility of one lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LotSummary {
    pub lot_number: LotNumber,
    pub total: usize,
    /// Members that are no longer in stock.
    pub distributed: usize,
    pub destroyed: usize,
    pub destroyable: bool,
}

/// A seal held by a sector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectorSeal {
    pub code: SealCode,
    pub lot_number: Option<LotNumber>,
    pub status: SealStatus,
    pub availability: SectorAvailability,
    pub label: String,
}

// ─── Registry ────────────────────────────────────────────────────────

/// Shared, thread-safe seal registry.
pub struct SealRegistry {
    store: Arc<dyn SealStore>,
    directory: Arc<dyn SectorDirectory>,
    allocator: SequenceAllocator,
    config: RegistryConfig,
}

impl std::fmt::Debug for SealRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealRegistry")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SealRegistry {
    pub fn new(
        store: Arc<dyn SealStore>,
        directory: Arc<dyn SectorDirectory>,
        config: RegistryConfig,
    ) -> Self {
        let allocator = SequenceAllocator::new(&config);
        Self {
            store,
            directory,
            allocator,
            config,
        }
    }

    /// Registry over a fresh [`InMemorySealStore`].
    pub fn in_memory(directory: Arc<dyn SectorDirectory>, config: RegistryConfig) -> Self {
        let store = Arc::new(InMemorySealStore::new(config.store_timeout));
        Self::new(store, directory, config)
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // ── Generation ───────────────────────────────────────────────────

    /// Suffix the next generation batch for `prefix` must start at.
    pub fn next_number(&self, prefix: &Prefix) -> Result<u64, RegistryError> {
        let existing = self.store.suffixes(prefix)?;
        Ok(SequenceAllocator::next_expected(&existing))
    }

    /// Create seals `start..=end` under `prefix`, all in `available`.
    pub fn generate(
        &self,
        prefix: Prefix,
        start: u64,
        end: u64,
        lot_number: Option<LotNumber>,
    ) -> Result<Generated, RegistryError> {
        let lock = self.allocator.prefix_lock(&prefix);
        let _held = lock
            .try_lock_for(self.config.store_timeout)
            .ok_or(StoreError::Timeout {
                operation: "prefix_lock",
                after_ms: self.config.store_timeout_ms(),
            })?;

        let existing = self.store.suffixes(&prefix)?;
        let range = match self.allocator.validate_range(&prefix, start, end, &existing) {
            Ok(range) => range,
            Err(e) => {
                tracing::warn!(prefix = %prefix, start, end, error = %e, "generation rejected");
                return Err(e.into());
            }
        };

        let now = Timestamp::now();
        let width = self.allocator.code_width();
        let seals: Vec<Seal> = range
            .codes
            .iter()
            .map(|(suffix, _)| Seal::generated(prefix.clone(), *suffix, width, lot_number.clone(), now))
            .collect();

        self.store.insert_all(seals).map_err(|e| match e {
            StoreError::DuplicateCode { code } => SequenceError::CodeCollision { code }.into(),
            other => RegistryError::from(other),
        })?;

        let created: Vec<SealCode> = range.codes.into_iter().map(|(_, code)| code).collect();
        metrics::counter!("seals_generated_total").increment(created.len() as u64);
        tracing::info!(
            prefix = %prefix,
            start,
            end,
            lot = lot_number.as_ref().map(|l| l.as_str()),
            count = created.len(),
            "generated seal batch"
        );
        Ok(Generated {
            prefix,
            lot_number,
            created,
        })
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn get(&self, code: &SealCode) -> Result<SealView, RegistryError> {
        let record = self
            .store
            .get(code)?
            .ok_or_else(|| RegistryError::SealNotFound { code: code.clone() })?;
        Ok(self.view(record.value))
    }

    /// Filtered, paginated listing, newest (highest prefix and suffix) first.
    pub fn list(&self, filter: &SealFilter) -> Result<Page<SealView>, RegistryError> {
        let needle = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_ascii_uppercase);

        let mut matched: Vec<Seal> = self
            .store
            .list()?
            .into_iter()
            .map(|r| r.value)
            .filter(|s| filter.status.map_or(true, |st| s.status() == st))
            .filter(|s| {
                filter
                    .sector_id
                    .as_ref()
                    .map_or(true, |id| s.sector_id() == Some(id))
            })
            .filter(|s| filter.lot.as_ref().map_or(true, |l| s.lot_number() == Some(l)))
            .filter(|s| {
                needle.as_deref().map_or(true, |n| {
                    s.code().as_str().contains(n)
                        || s.lot_number()
                            .is_some_and(|l| l.as_str().to_ascii_uppercase().contains(n))
                })
            })
            .collect();
        matched.sort_by(|a, b| (b.prefix(), b.suffix()).cmp(&(a.prefix(), a.suffix())));

        let limit = filter
            .limit
            .unwrap_or(self.config.default_page_size)
            .clamp(1, self.config.max_page_size.max(1));
        let page = filter.page.unwrap_or(1).max(1);
        let total = matched.len();
        let items = matched
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .map(|s| self.view(s))
            .collect();

        Ok(Page {
            items,
            total,
            page,
            limit,
            total_pages: total.div_ceil(limit),
        })
    }

    /// Every lot with its destruction eligibility, ordered by lot number.
    pub fn lot_summaries(&self) -> Result<Vec<LotSummary>, RegistryError> {
        let mut lots: BTreeMap<LotNumber, LotSummary> = BTreeMap::new();
        for record in self.store.list()? {
            let seal = record.value;
            let Some(lot) = seal.lot_number() else {
                continue;
            };
            let entry = lots.entry(lot.clone()).or_insert_with(|| LotSummary {
                lot_number: lot.clone(),
                total: 0,
                distributed: 0,
                destroyed: 0,
                destroyable: false,
            });
            entry.total += 1;
            if !guard::is_in_stock(&seal) {
                entry.distributed += 1;
            }
            if seal.status() == SealStatus::Destroyed {
                entry.destroyed += 1;
            }
        }
        Ok(lots
            .into_values()
            .map(|mut s| {
                s.destroyable = s.total > 0 && s.distributed == 0;
                s
            })
            .collect())
    }

    /// Seals currently held by `sector_id`, lowest code first.
    pub fn sector_stock(&self, sector_id: &SectorId) -> Result<Vec<SectorSeal>, RegistryError> {
        self.require_sector(sector_id)?;
        let mut held: Vec<Seal> = self
            .store
            .list()?
            .into_iter()
            .map(|r| r.value)
            .filter(|s| s.sector_id() == Some(sector_id))
            .collect();
        held.sort_by(|a, b| (a.prefix(), a.suffix()).cmp(&(b.prefix(), b.suffix())));
        Ok(held
            .into_iter()
            .map(|s| {
                let availability = sector_availability(&s);
                SectorSeal {
                    code: s.code().clone(),
                    lot_number: s.lot_number().cloned(),
                    status: s.status(),
                    availability,
                    label: availability.label().to_string(),
                }
            })
            .collect())
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Move one seal to `to`.
    pub fn transition(
        &self,
        code: &SealCode,
        to: SealStatus,
        ctx: &TransitionContext,
    ) -> Result<Seal, RegistryError> {
        if let Some(sector) = &ctx.sector_id {
            self.require_sector(sector)?;
        }
        self.commit(code, |seal| Ok(seal.transition(to, ctx, Timestamp::now())?))
    }

    /// Close out one seal as lost, damaged, or destroyed. Used seals are
    /// refused.
    pub fn destroy_single(
        &self,
        code: &SealCode,
        reason: &str,
        target: CloseOutStatus,
    ) -> Result<Seal, RegistryError> {
        let ctx = TransitionContext::with_reason(reason);
        let to = SealStatus::from(target);
        self.commit(code, |seal| {
            if seal.status() == SealStatus::Used {
                return Err(TransitionError::TerminalStateUsed {
                    code: seal.code().clone(),
                }
                .into());
            }
            Ok(seal.transition(to, &ctx, Timestamp::now())?)
        })
    }

    // ── Distribution ─────────────────────────────────────────────────

    /// Hand `quantity` available seals, lowest codes first, to one sector.
    pub fn distribute_manual(
        &self,
        sector_id: SectorId,
        quantity: i64,
        mode: AssignmentMode,
    ) -> Result<DistributionOutcome, RegistryError> {
        self.require_sector(&sector_id)?;
        let stock = self.available_stock()?;
        let plan = plan_manual(sector_id.clone(), quantity, stock.len()).map_err(|e| {
            tracing::warn!(sector = %sector_id, quantity, error = %e, "manual distribution rejected");
            e
        })?;
        let report = self.commit_plan(&plan, &stock, mode, "distribute_manual");
        Ok(DistributionOutcome { mode, plan, report })
    }

    /// Spread available seals evenly across `sector_ids`, optionally capped
    /// at `limit` seals. Each sector receives a contiguous block of codes.
    pub fn distribute_auto(
        &self,
        sector_ids: &[SectorId],
        limit: Option<usize>,
        mode: AssignmentMode,
    ) -> Result<DistributionOutcome, RegistryError> {
        let (plan, stock) = self.auto_plan(sector_ids, limit)?;
        let report = self.commit_plan(&plan, &stock, mode, "distribute_auto");
        Ok(DistributionOutcome { mode, plan, report })
    }

    /// The plan [`SealRegistry::distribute_auto`] would commit right now.
    pub fn preview_auto(
        &self,
        sector_ids: &[SectorId],
        limit: Option<usize>,
    ) -> Result<Plan, RegistryError> {
        self.auto_plan(sector_ids, limit).map(|(plan, _)| plan)
    }

    // ── Lot destruction ──────────────────────────────────────────────

    /// Destroy every seal of `lot` with the same reason, all or nothing.
    pub fn destroy_lot(&self, lot: &LotNumber, reason: &str) -> Result<BatchReport, RegistryError> {
        let ctx = TransitionContext::with_reason(reason);
        if ctx.reason().is_none() {
            return Err(TransitionError::MissingReason {
                to: SealStatus::Destroyed,
            }
            .into());
        }

        let attempts = self.config.max_cas_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            let members = self.store.lot_members(lot)?;
            let seals: Vec<Seal> = members.iter().map(|r| r.value.clone()).collect();
            let codes = match guard::can_destroy_lot(lot, &seals) {
                Ok(codes) => codes,
                Err(e) => {
                    tracing::warn!(lot = %lot, error = %e, "lot destruction blocked");
                    return Err(e.into());
                }
            };

            let now = Timestamp::now();
            let updates = members
                .iter()
                .map(|r| {
                    r.value
                        .transition(SealStatus::Destroyed, &ctx, now)
                        .map(|seal| (r.version, seal))
                })
                .collect::<Result<Vec<_>, TransitionError>>()?;

            match self.store.compare_and_swap_all(updates) {
                Ok(()) => {
                    metrics::counter!("seal_transitions_total", "to" => SealStatus::Destroyed.as_str())
                        .increment(codes.len() as u64);
                    tracing::info!(lot = %lot, count = codes.len(), "lot destroyed");
                    return Ok(BatchReport {
                        succeeded: codes,
                        failed: Vec::new(),
                    });
                }
                Err(StoreError::VersionConflict { code, .. }) => {
                    metrics::counter!("seal_cas_conflicts_total").increment(1);
                    if attempt >= attempts {
                        metrics::counter!("seal_batch_failures_total", "operation" => "destroy_lot")
                            .increment(1);
                        tracing::warn!(lot = %lot, code = %code, attempt, "lot destruction gave up");
                        return Err(RegistryError::ConcurrentModification { code, attempts });
                    }
                    tracing::warn!(lot = %lot, code = %code, attempt, "lot changed during destruction, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Attach display status and sector name to a stored seal.
    pub fn view(&self, seal: Seal) -> SealView {
        let sector_name = seal.sector_id().and_then(|id| self.directory.name_of(id));
        SealView {
            display_status: display_status(&seal),
            display_label: display_label(&seal).to_string(),
            sector_name,
            seal,
        }
    }

    // ── Internals ────────────────────────────────────────────────────

    fn require_sector(&self, id: &SectorId) -> Result<(), RegistryError> {
        match self.directory.resolve(id) {
            Some(_) => Ok(()),
            None => Err(RegistryError::UnknownSector { sector: id.clone() }),
        }
    }

    /// Available seals in ascending code order.
    fn available_stock(&self) -> Result<Vec<Versioned<Seal>>, RegistryError> {
        let mut stock: Vec<Versioned<Seal>> = self
            .store
            .list()?
            .into_iter()
            .filter(|r| r.value.status() == SealStatus::Available)
            .collect();
        stock.sort_by(|a, b| {
            (a.value.prefix(), a.value.suffix()).cmp(&(b.value.prefix(), b.value.suffix()))
        });
        Ok(stock)
    }

    fn auto_plan(
        &self,
        sector_ids: &[SectorId],
        limit: Option<usize>,
    ) -> Result<(Plan, Vec<Versioned<Seal>>), RegistryError> {
        let mut seen = HashSet::with_capacity(sector_ids.len());
        for id in sector_ids {
            if !seen.insert(id) {
                return Err(RegistryError::DuplicateSector { sector: id.clone() });
            }
            self.require_sector(id)?;
        }
        let stock = self.available_stock()?;
        let total = limit.map_or(stock.len(), |cap| cap.min(stock.len()));
        let plan = plan_auto(sector_ids, total)?;
        Ok((plan, stock))
    }

    fn commit_plan(
        &self,
        plan: &Plan,
        stock: &[Versioned<Seal>],
        mode: AssignmentMode,
        operation: &'static str,
    ) -> BatchReport {
        let target = mode.target();
        let mut report = BatchReport::default();
        for (sector_id, record) in plan.lay_out(stock) {
            let ctx = TransitionContext::with_sector(sector_id.clone());
            let code = record.value.code();
            let outcome = self
                .commit(code, |seal| Ok(seal.transition(target, &ctx, Timestamp::now())?))
                .map(|_| ());
            report.record(code.clone(), outcome);
        }

        if report.is_complete() {
            tracing::info!(
                operation,
                sectors = plan.allocations.len(),
                count = report.succeeded.len(),
                "distribution committed"
            );
        } else {
            metrics::counter!("seal_batch_failures_total", "operation" => operation)
                .increment(report.failed.len() as u64);
            tracing::warn!(
                operation,
                succeeded = report.succeeded.len(),
                failed = report.failed.len(),
                "distribution partially committed"
            );
        }
        report
    }

    /// Read, compute, compare-and-swap; retry from the read on a version
    /// conflict up to `max_cas_attempts` times.
    fn commit(
        &self,
        code: &SealCode,
        next: impl Fn(&Seal) -> Result<Seal, RegistryError>,
    ) -> Result<Seal, RegistryError> {
        let attempts = self.config.max_cas_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            let current = self
                .store
                .get(code)?
                .ok_or_else(|| RegistryError::SealNotFound { code: code.clone() })?;
            let updated = next(&current.value)?;
            match self.store.compare_and_swap(current.version, updated.clone()) {
                Ok(version) => {
                    metrics::counter!("seal_transitions_total", "to" => updated.status().as_str())
                        .increment(1);
                    tracing::debug!(
                        code = %code,
                        from = %current.value.status(),
                        to = %updated.status(),
                        version,
                        "seal transition committed"
                    );
                    return Ok(updated);
                }
                Err(StoreError::VersionConflict {
                    expected, actual, ..
                }) => {
                    metrics::counter!("seal_cas_conflicts_total").increment(1);
                    tracing::warn!(code = %code, attempt, expected, actual, "seal version conflict");
                    if attempt >= attempts {
                        return Err(RegistryError::ConcurrentModification {
                            code: code.clone(),
                            attempts,
                        });
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
