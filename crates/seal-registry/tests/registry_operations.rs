//! # Registry Operation Tests
//!
//! End-to-end behaviour of `SealRegistry` over the in-memory store:
//! generation contiguity, distribution, transitions, close-out, lot
//! destruction, listings, and the retry path under injected conflicts.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use proptest::prelude::*;

use seal_core::{LotNumber, Prefix, SealCode, SectorId, ShipmentId};
use seal_registry::{
    AssignmentMode, GuardError, InMemorySealStore, PlanError, RegistryConfig, RegistryError,
    SealFilter, SealRegistry, SealStore, SequenceError, StaticDirectory, StoreError, Versioned,
};
use seal_state::{CloseOutStatus, Seal, SealStatus, TransitionContext, TransitionError};

fn directory() -> Arc<StaticDirectory> {
    Arc::new(
        StaticDirectory::new()
            .with_sector(sector("A"), "Alpha Dock")
            .with_sector(sector("B"), "Bravo Dock")
            .with_sector(sector("C"), "Charlie Dock")
            .with_sector(sector("S1"), "Receiving"),
    )
}

fn registry() -> SealRegistry {
    SealRegistry::in_memory(directory(), RegistryConfig::default())
}

fn prefix(p: &str) -> Prefix {
    Prefix::new(p).unwrap()
}

fn lot(l: &str) -> Option<LotNumber> {
    Some(LotNumber::new(l).unwrap())
}

fn sector(s: &str) -> SectorId {
    SectorId::new(s).unwrap()
}

fn code(c: &str) -> SealCode {
    SealCode::new(c).unwrap()
}

fn codes(list: &[SealCode]) -> Vec<String> {
    list.iter().map(|c| c.to_string()).collect()
}

// ── Generation ───────────────────────────────────────────────────────

#[test]
fn generation_must_continue_the_sequence() {
    let reg = registry();
    let first = reg.generate(prefix("LACRE"), 1, 5, lot("L1")).unwrap();
    assert_eq!(first.created.len(), 5);
    assert_eq!(first.created[0].as_str(), "LACRE000001");
    reg.generate(prefix("LACRE"), 6, 10, lot("L2")).unwrap();

    let err = reg.generate(prefix("LACRE"), 7, 9, lot("L3")).unwrap_err();
    assert_eq!(
        err,
        RegistryError::Sequence(SequenceError::NonContiguous {
            prefix: prefix("LACRE"),
            expected: 11,
            start: 7,
        })
    );
    assert!(err.to_string().contains("expected start = 11, got 7"));
    assert_eq!(reg.next_number(&prefix("LACRE")).unwrap(), 11);
    assert_eq!(reg.next_number(&prefix("OTHER")).unwrap(), 1);
}

#[test]
fn generated_seals_start_available_with_history() {
    let reg = registry();
    reg.generate(prefix("LACRE"), 1, 1, lot("L1")).unwrap();
    let view = reg.get(&code("LACRE000001")).unwrap();
    assert_eq!(view.seal.status(), SealStatus::Available);
    assert_eq!(view.seal.lot_number(), lot("L1").as_ref());
    assert_eq!(view.seal.history().len(), 1);
    assert!(view.sector_name.is_none());
}

#[test]
fn cross_prefix_code_collision_is_rejected() {
    let config = RegistryConfig {
        code_width: 1,
        ..RegistryConfig::default()
    };
    let reg = SealRegistry::in_memory(directory(), config);
    reg.generate(prefix("A"), 1, 11, None).unwrap();
    let err = reg.generate(prefix("A1"), 1, 1, None).unwrap_err();
    assert_eq!(
        err,
        RegistryError::Sequence(SequenceError::CodeCollision { code: code("A11") })
    );
    // Nothing from the rejected batch was written.
    assert_eq!(reg.next_number(&prefix("A1")).unwrap(), 1);
}

#[test]
fn inverted_range_is_rejected() {
    let err = registry().generate(prefix("LACRE"), 5, 1, None).unwrap_err();
    assert_eq!(
        err,
        RegistryError::Sequence(SequenceError::InvalidRange { start: 5, end: 1 })
    );
}

// ── Distribution ─────────────────────────────────────────────────────

#[test]
fn auto_distribution_gives_contiguous_fair_blocks() {
    let reg = registry();
    reg.generate(prefix("LACRE"), 1, 7, lot("L1")).unwrap();
    let outcome = reg
        .distribute_auto(&[sector("A"), sector("B"), sector("C")], None, AssignmentMode::Assign)
        .unwrap();
    let shares: Vec<usize> = outcome.plan.allocations.iter().map(|a| a.quantity).collect();
    assert_eq!(shares, vec![3, 2, 2]);
    assert!(outcome.report.is_complete());
    assert_eq!(outcome.assigned().len(), 7);

    let held_by_a = reg.sector_stock(&sector("A")).unwrap();
    let a_codes: Vec<_> = held_by_a.iter().map(|s| s.code.to_string()).collect();
    assert_eq!(a_codes, vec!["LACRE000001", "LACRE000002", "LACRE000003"]);
    let b_codes: Vec<_> = reg
        .sector_stock(&sector("B"))
        .unwrap()
        .iter()
        .map(|s| s.code.to_string())
        .collect();
    assert_eq!(b_codes, vec!["LACRE000004", "LACRE000005"]);
}

#[test]
fn auto_distribution_respects_limit_and_preview_does_not_commit() {
    let reg = registry();
    reg.generate(prefix("LACRE"), 1, 10, None).unwrap();
    let preview = reg.preview_auto(&[sector("A"), sector("B")], Some(5)).unwrap();
    assert_eq!(preview.total(), 5);
    assert_eq!(preview.allocations[0].quantity, 3);
    let available = SealFilter {
        status: Some(SealStatus::Available),
        ..SealFilter::default()
    };
    assert_eq!(reg.list(&available).unwrap().total, 10);

    reg.distribute_auto(&[sector("A"), sector("B")], Some(5), AssignmentMode::Assign)
        .unwrap();
    assert_eq!(reg.list(&available).unwrap().total, 5);
}

#[test]
fn auto_distribution_validates_sectors() {
    let reg = registry();
    reg.generate(prefix("LACRE"), 1, 4, None).unwrap();
    assert_eq!(
        reg.preview_auto(&[sector("A")], None).unwrap_err(),
        RegistryError::Plan(PlanError::InsufficientSectors { given: 1 })
    );
    assert_eq!(
        reg.preview_auto(&[sector("A"), sector("A")], None).unwrap_err(),
        RegistryError::DuplicateSector { sector: sector("A") }
    );
    assert_eq!(
        reg.preview_auto(&[sector("A"), sector("ZZ")], None).unwrap_err(),
        RegistryError::UnknownSector { sector: sector("ZZ") }
    );
}

#[test]
fn manual_distribution_rejects_insufficient_stock() {
    let reg = registry();
    reg.generate(prefix("LACRE"), 1, 5, None).unwrap();
    let err = reg
        .distribute_manual(sector("S1"), 10, AssignmentMode::Assign)
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::Plan(PlanError::InsufficientStock {
            requested: 10,
            available: 5
        })
    );
    assert_eq!(
        reg.distribute_manual(sector("S1"), 0, AssignmentMode::Assign)
            .unwrap_err(),
        RegistryError::Plan(PlanError::InvalidQuantity { quantity: 0 })
    );
}

#[test]
fn manual_reserve_takes_lowest_codes_and_displays_as_assigned() {
    let reg = registry();
    reg.generate(prefix("LACRE"), 1, 5, None).unwrap();
    let outcome = reg
        .distribute_manual(sector("S1"), 2, AssignmentMode::Reserve)
        .unwrap();
    assert_eq!(codes(outcome.assigned()), vec!["LACRE000001", "LACRE000002"]);

    let view = reg.get(&code("LACRE000001")).unwrap();
    assert_eq!(view.seal.status(), SealStatus::Reserved);
    assert_eq!(view.display_status, SealStatus::Assigned);
    assert_eq!(view.display_label, "ASSIGNED");
    assert_eq!(view.sector_name.as_deref(), Some("Receiving"));

    let stock = reg.sector_stock(&sector("S1")).unwrap();
    assert!(stock.iter().all(|s| s.label == "Used / Unavailable"));
}

// ── Transitions and close-out ────────────────────────────────────────

#[test]
fn used_seal_cannot_be_closed_out() {
    let reg = registry();
    reg.generate(prefix("LACRE"), 1, 1, None).unwrap();
    let c = code("LACRE000001");
    reg.transition(
        &c,
        SealStatus::Linked,
        &TransitionContext::with_shipment(ShipmentId::new("SH1").unwrap()),
    )
    .unwrap();
    reg.transition(&c, SealStatus::Used, &TransitionContext::default())
        .unwrap();

    let err = reg
        .destroy_single(&c, "found broken", CloseOutStatus::Destroyed)
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::Transition(TransitionError::TerminalStateUsed { code: c.clone() })
    );
    assert_eq!(reg.get(&c).unwrap().seal.status(), SealStatus::Used);
}

#[test]
fn close_out_requires_a_reason_and_respects_the_table() {
    let reg = registry();
    reg.generate(prefix("LACRE"), 1, 2, None).unwrap();
    let c = code("LACRE000001");
    assert_eq!(
        reg.destroy_single(&c, "   ", CloseOutStatus::Lost).unwrap_err(),
        RegistryError::Transition(TransitionError::MissingReason { to: SealStatus::Lost })
    );
    let lost = reg.destroy_single(&c, "fell overboard", CloseOutStatus::Lost).unwrap();
    assert_eq!(lost.destruction_reason(), Some("fell overboard"));
    let destroyed = reg
        .destroy_single(&c, "written off", CloseOutStatus::Destroyed)
        .unwrap();
    assert_eq!(destroyed.status(), SealStatus::Destroyed);

    let err = reg
        .transition(&c, SealStatus::Available, &TransitionContext::default())
        .unwrap_err();
    assert!(matches!(
        err,
        RegistryError::Transition(TransitionError::IllegalTransition { .. })
    ));
}

#[test]
fn transition_rejects_unknown_sector_and_missing_seal() {
    let reg = registry();
    reg.generate(prefix("LACRE"), 1, 1, None).unwrap();
    assert_eq!(
        reg.transition(
            &code("LACRE000001"),
            SealStatus::Assigned,
            &TransitionContext::with_sector(sector("NOPE")),
        )
        .unwrap_err(),
        RegistryError::UnknownSector { sector: sector("NOPE") }
    );
    assert_eq!(
        reg.get(&code("LACRE999999")).unwrap_err(),
        RegistryError::SealNotFound { code: code("LACRE999999") }
    );
}

#[test]
fn release_returns_seal_to_stock() {
    let reg = registry();
    reg.generate(prefix("LACRE"), 1, 1, lot("L1")).unwrap();
    let c = code("LACRE000001");
    reg.transition(&c, SealStatus::Assigned, &TransitionContext::with_sector(sector("S1")))
        .unwrap();
    let released = reg
        .transition(&c, SealStatus::Available, &TransitionContext::default())
        .unwrap();
    assert!(released.sector_id().is_none());
    assert!(reg.lot_summaries().unwrap()[0].destroyable);
}

// ── Lot destruction ──────────────────────────────────────────────────

#[test]
fn one_distributed_seal_blocks_lot_destruction() {
    let reg = registry();
    reg.generate(prefix("LACRE"), 1, 3, lot("L1")).unwrap();
    reg.transition(
        &code("LACRE000002"),
        SealStatus::Assigned,
        &TransitionContext::with_sector(sector("S1")),
    )
    .unwrap();

    let err = reg.destroy_lot(&LotNumber::new("L1").unwrap(), "expired").unwrap_err();
    assert!(matches!(
        err,
        RegistryError::Guard(GuardError::LotHasDistributedSeals { distributed: 1, total: 3, .. })
    ));
    assert_eq!(
        reg.get(&code("LACRE000001")).unwrap().seal.status(),
        SealStatus::Available
    );
}

#[test]
fn lot_destruction_destroys_every_member() {
    let reg = registry();
    reg.generate(prefix("LACRE"), 1, 3, lot("L1")).unwrap();
    reg.generate(prefix("LACRE"), 4, 4, lot("L2")).unwrap();
    let l1 = LotNumber::new("L1").unwrap();

    assert_eq!(
        reg.destroy_lot(&l1, " ").unwrap_err(),
        RegistryError::Transition(TransitionError::MissingReason {
            to: SealStatus::Destroyed
        })
    );

    let report = reg.destroy_lot(&l1, "batch misprinted").unwrap();
    assert_eq!(
        codes(&report.succeeded),
        vec!["LACRE000001", "LACRE000002", "LACRE000003"]
    );
    assert!(report.failed.is_empty());
    assert_eq!(
        reg.get(&code("LACRE000004")).unwrap().seal.status(),
        SealStatus::Available
    );

    let summaries = reg.lot_summaries().unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].lot_number, l1);
    assert_eq!(summaries[0].destroyed, 3);
    assert!(!summaries[0].destroyable);
    assert!(summaries[1].destroyable);

    assert_eq!(
        reg.destroy_lot(&LotNumber::new("L9").unwrap(), "x").unwrap_err(),
        RegistryError::Guard(GuardError::LotNotFound {
            lot: LotNumber::new("L9").unwrap()
        })
    );
}

// ── Listing ──────────────────────────────────────────────────────────

#[test]
fn listing_filters_searches_and_paginates_newest_first() {
    let reg = registry();
    reg.generate(prefix("LACRE"), 1, 30, lot("JAN")).unwrap();
    reg.generate(prefix("LACRE"), 31, 35, lot("FEB")).unwrap();

    let first = reg.list(&SealFilter::default()).unwrap();
    assert_eq!(first.total, 35);
    assert_eq!(first.limit, 24);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.items[0].seal.code().as_str(), "LACRE000035");

    let second = reg
        .list(&SealFilter {
            page: Some(2),
            ..SealFilter::default()
        })
        .unwrap();
    assert_eq!(second.items.len(), 11);

    let feb = reg
        .list(&SealFilter {
            search: Some("feb".into()),
            ..SealFilter::default()
        })
        .unwrap();
    assert_eq!(feb.total, 5);

    let by_code = reg
        .list(&SealFilter {
            search: Some("000012".into()),
            ..SealFilter::default()
        })
        .unwrap();
    assert_eq!(by_code.total, 1);

    reg.distribute_manual(sector("S1"), 3, AssignmentMode::Assign).unwrap();
    let held = reg
        .list(&SealFilter {
            sector_id: Some(sector("S1")),
            status: Some(SealStatus::Assigned),
            lot: lot("JAN"),
            ..SealFilter::default()
        })
        .unwrap();
    assert_eq!(held.total, 3);
}

// ── Optimistic concurrency ───────────────────────────────────────────

/// Store that loses the first `conflicts` compare-and-swap races.
struct ContendedStore {
    inner: InMemorySealStore,
    conflicts: AtomicU32,
}

impl ContendedStore {
    fn conflict(&self, seal: &Seal, expected: u64) -> Option<StoreError> {
        let remaining = self.conflicts.load(Ordering::SeqCst);
        if remaining == 0 {
            return None;
        }
        self.conflicts.store(remaining - 1, Ordering::SeqCst);
        Some(StoreError::VersionConflict {
            code: seal.code().clone(),
            expected,
            actual: expected + 1,
        })
    }
}

impl SealStore for ContendedStore {
    fn get(&self, code: &SealCode) -> Result<Option<Versioned<Seal>>, StoreError> {
        self.inner.get(code)
    }
    fn list(&self) -> Result<Vec<Versioned<Seal>>, StoreError> {
        self.inner.list()
    }
    fn lot_members(&self, lot: &LotNumber) -> Result<Vec<Versioned<Seal>>, StoreError> {
        self.inner.lot_members(lot)
    }
    fn suffixes(&self, prefix: &Prefix) -> Result<Vec<u64>, StoreError> {
        self.inner.suffixes(prefix)
    }
    fn insert_all(&self, seals: Vec<Seal>) -> Result<(), StoreError> {
        self.inner.insert_all(seals)
    }
    fn compare_and_swap(&self, expected_version: u64, seal: Seal) -> Result<u64, StoreError> {
        match self.conflict(&seal, expected_version) {
            Some(e) => Err(e),
            None => self.inner.compare_and_swap(expected_version, seal),
        }
    }
    fn compare_and_swap_all(&self, updates: Vec<(u64, Seal)>) -> Result<(), StoreError> {
        if let Some((v, s)) = updates.first() {
            if let Some(e) = self.conflict(s, *v) {
                return Err(e);
            }
        }
        self.inner.compare_and_swap_all(updates)
    }
}

fn contended(conflicts: u32) -> SealRegistry {
    let store = ContendedStore {
        inner: InMemorySealStore::new(std::time::Duration::from_millis(200)),
        conflicts: AtomicU32::new(0),
    };
    let store = Arc::new(store);
    let reg = SealRegistry::new(store.clone(), directory(), RegistryConfig::default());
    reg.generate(prefix("LACRE"), 1, 2, lot("L1")).unwrap();
    store.conflicts.store(conflicts, Ordering::SeqCst);
    reg
}

#[test]
fn conflicts_within_the_bound_are_retried() {
    let reg = contended(2);
    let seal = reg
        .transition(
            &code("LACRE000001"),
            SealStatus::Assigned,
            &TransitionContext::with_sector(sector("S1")),
        )
        .unwrap();
    assert_eq!(seal.status(), SealStatus::Assigned);
}

#[test]
fn persistent_conflicts_surface_as_retryable() {
    let reg = contended(10);
    let err = reg
        .transition(
            &code("LACRE000001"),
            SealStatus::Assigned,
            &TransitionContext::with_sector(sector("S1")),
        )
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::ConcurrentModification {
            code: code("LACRE000001"),
            attempts: 3
        }
    );
    assert!(err.is_retryable());
}

#[test]
fn partial_distribution_reports_failures_without_rollback() {
    // Three conflicts exhaust the first seal; the second commits.
    let reg = contended(3);
    let outcome = reg
        .distribute_manual(sector("S1"), 2, AssignmentMode::Assign)
        .unwrap();
    assert_eq!(codes(&outcome.report.succeeded), vec!["LACRE000002"]);
    assert_eq!(outcome.report.failed.len(), 1);
    assert_eq!(outcome.report.failed[0].code.as_str(), "LACRE000001");
    assert_eq!(outcome.report.failed[0].kind, "concurrent_modification");
    assert!(outcome.report.failed[0].retryable);
}

#[test]
fn lot_destruction_retries_whole_batch_on_conflict() {
    let reg = contended(1);
    let report = reg
        .destroy_lot(&LotNumber::new("L1").unwrap(), "expired")
        .unwrap();
    assert_eq!(report.succeeded.len(), 2);
}

/// Store whose reads never complete within the bound.
struct StalledStore;

impl SealStore for StalledStore {
    fn get(&self, _: &SealCode) -> Result<Option<Versioned<Seal>>, StoreError> {
        Err(StoreError::Timeout { operation: "get", after_ms: 5 })
    }
    fn list(&self) -> Result<Vec<Versioned<Seal>>, StoreError> {
        Err(StoreError::Timeout { operation: "list", after_ms: 5 })
    }
    fn lot_members(&self, _: &LotNumber) -> Result<Vec<Versioned<Seal>>, StoreError> {
        Err(StoreError::Timeout { operation: "lot_members", after_ms: 5 })
    }
    fn suffixes(&self, _: &Prefix) -> Result<Vec<u64>, StoreError> {
        Err(StoreError::Timeout { operation: "suffixes", after_ms: 5 })
    }
    fn insert_all(&self, _: Vec<Seal>) -> Result<(), StoreError> {
        Err(StoreError::Timeout { operation: "insert_all", after_ms: 5 })
    }
    fn compare_and_swap(&self, _: u64, _: Seal) -> Result<u64, StoreError> {
        Err(StoreError::Timeout { operation: "compare_and_swap", after_ms: 5 })
    }
    fn compare_and_swap_all(&self, _: Vec<(u64, Seal)>) -> Result<(), StoreError> {
        Err(StoreError::Timeout { operation: "compare_and_swap_all", after_ms: 5 })
    }
}

#[test]
fn store_timeouts_are_transient_failures() {
    let reg = SealRegistry::new(Arc::new(StalledStore), directory(), RegistryConfig::default());
    let err = reg.generate(prefix("LACRE"), 1, 1, None).unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(err.kind(), "store_timeout");
    assert!(reg.get(&code("LACRE000001")).unwrap_err().is_retryable());
}

// ── Properties ───────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn repeated_generation_stays_contiguous(batches in proptest::collection::vec(1u64..20, 1..10)) {
        let reg = registry();
        let p = prefix("LACRE");
        for size in &batches {
            let start = reg.next_number(&p).unwrap();
            reg.generate(p.clone(), start, start + size - 1, None).unwrap();
        }
        let total: u64 = batches.iter().sum();
        let page = reg.list(&SealFilter { limit: Some(1000), ..SealFilter::default() }).unwrap();
        let mut suffixes: Vec<u64> = page.items.iter().map(|v| v.seal.suffix()).collect();
        suffixes.sort_unstable();
        prop_assert_eq!(suffixes, (1..=total).collect::<Vec<_>>());
    }
}
