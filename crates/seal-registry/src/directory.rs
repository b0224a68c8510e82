//! Sector directory: resolves sector identifiers to display records.
//!
//! Sectors are owned elsewhere; the registry only needs to know whether an
//! id exists and what to call it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use seal_core::SectorId;

use crate::config::ConfigError;

/// A sector as the directory describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorInfo {
    pub id: SectorId,
    pub name: String,
}

/// Lookup of sectors by id.
pub trait SectorDirectory: Send + Sync {
    /// The sector, or `None` if it does not exist.
    fn resolve(&self, id: &SectorId) -> Option<SectorInfo>;

    /// Display name, if the sector exists.
    fn name_of(&self, id: &SectorId) -> Option<String> {
        self.resolve(id).map(|s| s.name)
    }
}

/// Fixed in-memory directory.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    sectors: HashMap<SectorId, SectorInfo>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_sector(mut self, id: SectorId, name: impl Into<String>) -> Self {
        self.insert(id, name);
        self
    }

    pub fn insert(&mut self, id: SectorId, name: impl Into<String>) {
        let info = SectorInfo {
            id: id.clone(),
            name: name.into(),
        };
        self.sectors.insert(id, info);
    }
}

impl FromIterator<SectorInfo> for StaticDirectory {
    fn from_iter<I: IntoIterator<Item = SectorInfo>>(iter: I) -> Self {
        Self {
            sectors: iter.into_iter().map(|s| (s.id.clone(), s)).collect(),
        }
    }
}

impl SectorDirectory for StaticDirectory {
    fn resolve(&self, id: &SectorId) -> Option<SectorInfo> {
        self.sectors.get(id).cloned()
    }
}

/// Parse `S1=Receiving,S2=Shipping` as read from `SEAL_SECTORS`. A bare id
/// is its own display name.
pub fn parse_sectors(raw: &str) -> Result<Vec<SectorInfo>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (id, name) = entry.split_once('=').unwrap_or((entry, entry));
            let id = SectorId::new(id).map_err(|e| ConfigError::Invalid {
                var: "SEAL_SECTORS",
                value: entry.to_string(),
                reason: e.to_string(),
            })?;
            Ok(SectorInfo {
                id,
                name: name.trim().to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sector_pairs() {
        let sectors = parse_sectors("S1=Receiving, S2 = Shipping ,S3").unwrap();
        assert_eq!(sectors.len(), 3);
        assert_eq!(sectors[0].name, "Receiving");
        assert_eq!(sectors[1].id.as_str(), "S2");
        assert_eq!(sectors[1].name, "Shipping");
        assert_eq!(sectors[2].name, "S3");
    }

    #[test]
    fn rejects_blank_sector_id() {
        assert!(parse_sectors("=Nameless").is_err());
        assert!(parse_sectors("").unwrap().is_empty());
    }

    #[test]
    fn resolves_known_sectors_only() {
        let dir = StaticDirectory::new()
            .with_sector(SectorId::new("S2").unwrap(), "Shipping")
            .with_sector(SectorId::new("S1").unwrap(), "Receiving");
        assert_eq!(
            dir.name_of(&SectorId::new("S1").unwrap()).as_deref(),
            Some("Receiving")
        );
        assert!(dir.resolve(&SectorId::new("S9").unwrap()).is_none());
        let shipping = dir.resolve(&SectorId::new("S2").unwrap()).unwrap();
        assert_eq!(shipping.name, "Shipping");
    }
}
