//! # Distribution Planning
//!
//! Pure computations over the count of available seals. A [`Plan`] says
//! how many seals each sector receives; [`Plan::lay_out`] carves the
//! ordered stock into one contiguous block per allocation. Nothing here
//! touches the store.

use serde::{Deserialize, Serialize};

use seal_core::SectorId;
use seal_state::SealStatus;

use crate::error::PlanError;

/// Which edge out of `available` a distribution commits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentMode {
    /// `available → assigned`.
    #[default]
    Assign,
    /// `available → reserved`.
    Reserve,
}

impl AssignmentMode {
    pub fn target(self) -> SealStatus {
        match self {
            Self::Assign => SealStatus::Assigned,
            Self::Reserve => SealStatus::Reserved,
        }
    }
}

impl std::str::FromStr for AssignmentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "assign" => Ok(Self::Assign),
            "reserve" => Ok(Self::Reserve),
            other => Err(format!("unknown assignment mode {other:?}; expected assign or reserve")),
        }
    }
}

/// One sector's share of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub sector_id: SectorId,
    pub quantity: usize,
}

/// Sector shares in the order they were requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub allocations: Vec<Allocation>,
}

impl Plan {
    /// Sum of all shares.
    pub fn total(&self) -> usize {
        self.allocations.iter().map(|a| a.quantity).sum()
    }

    /// Pair each seal of `stock` with its sector: the first allocation takes
    /// the first `quantity` items, the next allocation the following block,
    /// and so on. Items past [`Plan::total`] are left out.
    pub fn lay_out<'a, T>(&'a self, stock: &'a [T]) -> Vec<(&'a SectorId, &'a T)> {
        let mut laid = Vec::with_capacity(self.total().min(stock.len()));
        let mut items = stock.iter();
        for allocation in &self.allocations {
            for item in items.by_ref().take(allocation.quantity) {
                laid.push((&allocation.sector_id, item));
            }
        }
        laid
    }
}

/// `quantity` seals to one sector.
pub fn plan_manual(
    sector_id: SectorId,
    quantity: i64,
    available: usize,
) -> Result<Plan, PlanError> {
    if quantity <= 0 {
        return Err(PlanError::InvalidQuantity { quantity });
    }
    let requested = quantity as u64;
    if requested > available as u64 {
        return Err(PlanError::InsufficientStock {
            requested,
            available,
        });
    }
    Ok(Plan {
        allocations: vec![Allocation {
            sector_id,
            quantity: requested as usize,
        }],
    })
}

/// Split `total` across `sector_ids` so shares differ by at most one.
///
/// With `k` sectors each gets `total / k`; the first `total % k` sectors in
/// input order get one more.
pub fn plan_auto(sector_ids: &[SectorId], total: usize) -> Result<Plan, PlanError> {
    let k = sector_ids.len();
    if k < 2 {
        return Err(PlanError::InsufficientSectors { given: k });
    }
    let base = total / k;
    let remainder = total % k;
    let allocations = sector_ids
        .iter()
        .enumerate()
        .map(|(i, id)| Allocation {
            sector_id: id.clone(),
            quantity: base + usize::from(i < remainder),
        })
        .collect();
    Ok(Plan { allocations })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sectors(names: &[&str]) -> Vec<SectorId> {
        names.iter().map(|n| SectorId::new(n).unwrap()).collect()
    }

    fn shares(plan: &Plan) -> Vec<usize> {
        plan.allocations.iter().map(|a| a.quantity).collect()
    }

    #[test]
    fn remainder_goes_to_first_listed() {
        let plan = plan_auto(&sectors(&["A", "B", "C"]), 7).unwrap();
        assert_eq!(shares(&plan), vec![3, 2, 2]);
        assert_eq!(plan.allocations[0].sector_id.as_str(), "A");
    }

    #[test]
    fn auto_needs_two_sectors() {
        assert_eq!(
            plan_auto(&sectors(&["A"]), 10).unwrap_err(),
            PlanError::InsufficientSectors { given: 1 }
        );
        assert!(plan_auto(&[], 0).is_err());
    }

    #[test]
    fn auto_with_no_stock_gives_zero_shares() {
        let plan = plan_auto(&sectors(&["A", "B"]), 0).unwrap();
        assert_eq!(shares(&plan), vec![0, 0]);
    }

    #[test]
    fn manual_rejections() {
        let s1 = SectorId::new("S1").unwrap();
        assert_eq!(
            plan_manual(s1.clone(), 10, 5).unwrap_err(),
            PlanError::InsufficientStock {
                requested: 10,
                available: 5
            }
        );
        assert_eq!(
            plan_manual(s1.clone(), 0, 5).unwrap_err(),
            PlanError::InvalidQuantity { quantity: 0 }
        );
        assert_eq!(
            plan_manual(s1.clone(), -3, 5).unwrap_err(),
            PlanError::InvalidQuantity { quantity: -3 }
        );
        assert_eq!(plan_manual(s1, 5, 5).unwrap().total(), 5);
    }

    #[test]
    fn lay_out_gives_contiguous_blocks_in_order() {
        let plan = plan_auto(&sectors(&["A", "B", "C"]), 7).unwrap();
        let stock: Vec<u32> = (1..=9).collect();
        let laid: Vec<(String, u32)> = plan
            .lay_out(&stock)
            .into_iter()
            .map(|(s, n)| (s.to_string(), *n))
            .collect();
        assert_eq!(
            laid,
            vec![
                ("A".into(), 1),
                ("A".into(), 2),
                ("A".into(), 3),
                ("B".into(), 4),
                ("B".into(), 5),
                ("C".into(), 6),
                ("C".into(), 7),
            ]
        );
    }

    #[test]
    fn mode_parses_and_targets() {
        assert_eq!("Reserve".parse::<AssignmentMode>().unwrap().target(), SealStatus::Reserved);
        assert_eq!(AssignmentMode::default().target(), SealStatus::Assigned);
        assert!("lend".parse::<AssignmentMode>().is_err());
    }

    proptest! {
        #[test]
        fn auto_shares_are_fair_and_exhaustive(k in 2usize..12, total in 0usize..5000) {
            let ids: Vec<SectorId> = (0..k).map(|i| SectorId::new(&format!("S{i}")).unwrap()).collect();
            let plan = plan_auto(&ids, total).unwrap();
            let s = shares(&plan);
            prop_assert_eq!(s.iter().sum::<usize>(), total);
            let max = *s.iter().max().unwrap();
            let min = *s.iter().min().unwrap();
            prop_assert!(max - min <= 1);
            // Larger shares precede smaller ones.
            prop_assert!(s.windows(2).all(|w| w[0] >= w[1]));
        }

        #[test]
        fn lay_out_covers_each_item_once(k in 2usize..6, total in 0usize..200) {
            let ids: Vec<SectorId> = (0..k).map(|i| SectorId::new(&format!("S{i}")).unwrap()).collect();
            let plan = plan_auto(&ids, total).unwrap();
            let stock: Vec<usize> = (0..total).collect();
            let laid = plan.lay_out(&stock);
            let items: Vec<usize> = laid.iter().map(|(_, n)| **n).collect();
            prop_assert_eq!(items, stock.clone());
        }
    }
}
