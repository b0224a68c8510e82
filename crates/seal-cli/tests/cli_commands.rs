//! # CLI Command Tests
//!
//! Runs subcommand handlers against a state file in a temp directory and
//! checks what each invocation leaves behind for the next one.

use std::path::Path;

use seal_cli::distribute::{run_distribute, DistributeArgs, DistributeCommand};
use seal_cli::lots::{run_lots, LotArgs, LotCommand};
use seal_cli::seals::{run_seals, SealArgs, SealCommand};
use seal_cli::workspace::Workspace;
use seal_core::{Prefix, SealCode};
use seal_registry::{parse_sectors, RegistryConfig, RegistryError};
use seal_state::SealStatus;

fn open(path: &Path) -> Workspace {
    Workspace::open(
        path,
        parse_sectors("S1=Receiving,S2=Shipping").unwrap(),
        RegistryConfig::default(),
    )
    .unwrap()
}

fn generate(path: &Path, start: u64, end: u64, lot: &str) -> anyhow::Result<u8> {
    run_seals(
        &SealArgs {
            command: SealCommand::Generate {
                prefix: "LACRE".into(),
                start,
                end,
                lot: Some(lot.into()),
            },
        },
        &open(path),
    )
}

fn status_of(path: &Path, code: &str) -> SealStatus {
    open(path)
        .registry()
        .get(&SealCode::new(code).unwrap())
        .unwrap()
        .seal
        .status()
}

#[test]
fn generation_persists_between_invocations() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seals.json");

    assert_eq!(generate(&path, 1, 5, "L1").unwrap(), 0);
    assert_eq!(generate(&path, 6, 10, "L2").unwrap(), 0);

    let err = generate(&path, 7, 9, "L3").unwrap_err();
    assert!(format!("{err:#}").contains("expected start = 11, got 7"));
    assert_eq!(
        open(&path)
            .registry()
            .next_number(&Prefix::new("LACRE").unwrap())
            .unwrap(),
        11
    );
}

#[test]
fn auto_distribution_is_saved() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seals.json");
    generate(&path, 1, 5, "L1").unwrap();

    let code = run_distribute(
        &DistributeArgs {
            command: DistributeCommand::Auto {
                sectors: vec!["S1".into(), "S2".into()],
                limit: None,
                mode: "assign".into(),
            },
        },
        &open(&path),
    )
    .unwrap();
    assert_eq!(code, 0);
    assert_eq!(status_of(&path, "LACRE000001"), SealStatus::Assigned);
    assert_eq!(status_of(&path, "LACRE000005"), SealStatus::Assigned);
}

#[test]
fn plan_does_not_touch_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seals.json");
    generate(&path, 1, 3, "L1").unwrap();

    run_distribute(
        &DistributeArgs {
            command: DistributeCommand::Plan {
                sectors: vec!["S1".into(), "S2".into()],
                limit: None,
            },
        },
        &open(&path),
    )
    .unwrap();
    assert_eq!(status_of(&path, "LACRE000001"), SealStatus::Available);
}

#[test]
fn manual_distribution_beyond_stock_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seals.json");
    generate(&path, 1, 5, "L1").unwrap();

    let err = run_distribute(
        &DistributeArgs {
            command: DistributeCommand::Manual {
                sector: "S1".into(),
                quantity: 10,
                mode: "assign".into(),
            },
        },
        &open(&path),
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RegistryError>(),
        Some(RegistryError::Plan(_))
    ));
    assert_eq!(status_of(&path, "LACRE000001"), SealStatus::Available);
}

#[test]
fn lot_destruction_requires_stock_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seals.json");
    generate(&path, 1, 2, "L1").unwrap();
    generate(&path, 3, 4, "L2").unwrap();

    run_seals(
        &SealArgs {
            command: SealCommand::Transition {
                code: "LACRE000003".into(),
                target: "reserved".into(),
                sector: Some("S2".into()),
                shipment: None,
                reason: None,
            },
        },
        &open(&path),
    )
    .unwrap();

    let destroy = |lot: &str| {
        run_lots(
            &LotArgs {
                command: LotCommand::Destroy {
                    lot: lot.into(),
                    reason: "recall".into(),
                },
            },
            &open(&path),
        )
    };
    assert!(destroy("L2").is_err());
    assert_eq!(status_of(&path, "LACRE000004"), SealStatus::Available);

    assert_eq!(destroy("L1").unwrap(), 0);
    assert_eq!(status_of(&path, "LACRE000001"), SealStatus::Destroyed);
    assert_eq!(status_of(&path, "LACRE000002"), SealStatus::Destroyed);
}

#[test]
fn single_destroy_defaults_to_destroyed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seals.json");
    generate(&path, 1, 1, "L1").unwrap();

    run_seals(
        &SealArgs {
            command: SealCommand::Destroy {
                code: "LACRE000001".into(),
                reason: "snapped".into(),
                target: "destroyed".into(),
            },
        },
        &open(&path),
    )
    .unwrap();
    let view = open(&path)
        .registry()
        .get(&SealCode::new("LACRE000001").unwrap())
        .unwrap();
    assert_eq!(view.seal.status(), SealStatus::Destroyed);
    assert_eq!(view.seal.destruction_reason(), Some("snapped"));
}
