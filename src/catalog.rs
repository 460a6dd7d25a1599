//! Troop and tower stat catalog.
//!
//! The built-in roster is used unless stat files are supplied. Files are
//! JSON objects keyed by name:
//!
//! ```json
//! { "Knight": { "HP": 200, "ATK": 300, "DEF": 150, "Mana": 5, "EXP": 25, "Special": "" } }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::info;

use crate::game::{CombatStats, Special, StatProvider, TowerTemplate, TowerTemplates, TroopTemplate};

/// Key of the guard tower entry in a tower file.
pub const GUARD_TOWER: &str = "GuardTower";

/// Key of the king tower entry in a tower file.
pub const KING_TOWER: &str = "KingTower";

/// Errors loading stat files.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file is not valid stat JSON.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },
    /// A required tower entry is absent.
    #[error("tower file has no `{0}` entry")]
    MissingTower(&'static str),
    /// The troop file defines no troops.
    #[error("troop file defines no troops")]
    NoTroops,
    /// A troop or tower would enter play already dead.
    #[error("`{0}` has 0 HP")]
    ZeroHp(String),
}

/// In-memory [`StatProvider`] with case-insensitive troop lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    troops: HashMap<String, TroopTemplate>,
    towers: TowerTemplates,
}

impl Catalog {
    /// Build a catalog from templates. Troop names are matched ignoring case.
    #[must_use]
    pub fn new(troops: impl IntoIterator<Item = TroopTemplate>, towers: TowerTemplates) -> Self {
        let troops = troops
            .into_iter()
            .map(|t| (t.name.to_ascii_lowercase(), t))
            .collect();
        Self { troops, towers }
    }

    /// The standard roster.
    #[must_use]
    pub fn builtin() -> Self {
        let plain = |name: &str, hp, atk, def, mana, exp| TroopTemplate {
            exp,
            ..TroopTemplate::new(name, CombatStats::new(hp, atk, def), mana)
        };
        let troops = [
            plain("Pawn", 50, 150, 100, 3, 5),
            plain("Bishop", 100, 200, 150, 4, 10),
            plain("Rook", 250, 200, 200, 5, 25),
            plain("Knight", 200, 300, 150, 5, 25),
            plain("Prince", 500, 400, 300, 6, 50),
            plain("Queen", 50, 0, 0, 5, 30).with_special(Special::Heal),
        ];
        let towers = TowerTemplates {
            guard: TowerTemplate {
                name: GUARD_TOWER.to_string(),
                stats: CombatStats::new(1000, 300, 100),
                crit: 0.05,
                exp_value: 100,
            },
            king: TowerTemplate {
                name: KING_TOWER.to_string(),
                stats: CombatStats::new(2000, 500, 300),
                crit: 0.10,
                exp_value: 200,
            },
        };
        Self::new(troops, towers)
    }

    /// Load troops and towers from stat files.
    ///
    /// # Errors
    ///
    /// Returns an error if either file is unreadable or malformed, if the
    /// troop file is empty, if a tower entry is missing, or if any template
    /// has 0 HP.
    pub fn load(troops_path: &Path, towers_path: &Path) -> Result<Self, CatalogError> {
        let troops: BTreeMap<String, TroopTemplate> = read_json(troops_path)?;
        if troops.is_empty() {
            return Err(CatalogError::NoTroops);
        }
        let mut towers: BTreeMap<String, TowerTemplate> = read_json(towers_path)?;

        let mut take = |key: &'static str| {
            towers
                .remove(key)
                .map(|mut t| {
                    if t.name.is_empty() {
                        key.clone_into(&mut t.name);
                    }
                    t
                })
                .ok_or(CatalogError::MissingTower(key))
        };
        let towers = TowerTemplates {
            guard: take(GUARD_TOWER)?,
            king: take(KING_TOWER)?,
        };
        for tower in [&towers.guard, &towers.king] {
            if tower.stats.hp == 0 {
                return Err(CatalogError::ZeroHp(tower.name.clone()));
            }
        }

        let troops = troops
            .into_iter()
            .map(|(key, mut t)| {
                if t.name.is_empty() {
                    t.name = key;
                }
                if t.stats.hp == 0 {
                    return Err(CatalogError::ZeroHp(t.name));
                }
                Ok(t)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let catalog = Self::new(troops, towers);
        info!(
            troops = catalog.troops.len(),
            path = %troops_path.display(),
            "loaded stat catalog"
        );
        Ok(catalog)
    }

    /// Load from files when both paths are given, else the built-in roster.
    ///
    /// # Errors
    ///
    /// See [`Catalog::load`].
    pub fn from_paths(
        troops_path: Option<&Path>,
        towers_path: Option<&Path>,
    ) -> Result<Self, CatalogError> {
        match (troops_path, towers_path) {
            (Some(troops), Some(towers)) => Self::load(troops, towers),
            _ => Ok(Self::builtin()),
        }
    }

    /// All troops, sorted by mana cost then name.
    #[must_use]
    pub fn troops(&self) -> Vec<&TroopTemplate> {
        let mut troops: Vec<_> = self.troops.values().collect();
        troops.sort_by(|a, b| a.mana.cmp(&b.mana).then_with(|| a.name.cmp(&b.name)));
        troops
    }

    /// Guard and king tower templates.
    #[must_use]
    pub const fn tower_templates(&self) -> &TowerTemplates {
        &self.towers
    }
}

impl StatProvider for Catalog {
    fn troop(&self, name: &str) -> Option<TroopTemplate> {
        self.troops.get(&name.to_ascii_lowercase()).cloned()
    }

    fn towers(&self) -> TowerTemplates {
        self.towers.clone()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
