// src/horde/table.rs
//! Data-driven spawn tables + loader (`.tables.ron`).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::core::{RandomSource, SpawnSpec, SpawnTable, TableRef};
use super::error::HordeError;

// ---------- Selectors (data form) ----------

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TableSelector {
    /// `amount` copies of `id`, or a uniform count in `amount..=max_amount`.
    Entity {
        id: String,
        #[serde(default = "default_amount")]
        amount: u32,
        #[serde(default)]
        max_amount: Option<u32>,
        #[serde(default = "default_prob")]
        prob: f32,
    },
    /// Every child, independently.
    All {
        children: Vec<TableSelector>,
        #[serde(default = "default_prob")]
        prob: f32,
    },
    /// `rolls` weighted picks among the children.
    Group {
        children: Vec<WeightedSelector>,
        #[serde(default = "default_amount")]
        rolls: u32,
        #[serde(default = "default_prob")]
        prob: f32,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeightedSelector {
    #[serde(default = "default_weight")]
    pub weight: f32,
    pub selector: TableSelector,
}

fn default_amount() -> u32 {
    1
}
fn default_prob() -> f32 {
    1.0
}
fn default_weight() -> f32 {
    1.0
}

impl TableSelector {
    fn roll(&self, rng: &mut dyn RandomSource, out: &mut Vec<SpawnSpec>) {
        match self {
            TableSelector::Entity { id, amount, max_amount, prob } => {
                if !rng.chance(*prob) {
                    return;
                }
                let count = match max_amount {
                    Some(max) => rng.range_u32(*amount, (*max).max(*amount)),
                    None => *amount,
                };
                out.extend((0..count).map(|_| SpawnSpec::new(id.clone())));
            }
            TableSelector::All { children, prob } => {
                if !rng.chance(*prob) {
                    return;
                }
                for child in children {
                    child.roll(rng, out);
                }
            }
            TableSelector::Group { children, rolls, prob } => {
                if !rng.chance(*prob) {
                    return;
                }
                let total: f32 = children.iter().map(|c| c.weight.max(0.0)).sum();
                if total <= 0.0 {
                    return;
                }
                for _ in 0..*rolls {
                    let mut r = rng.range_f32(0.0, total);
                    let picked = children
                        .iter()
                        .filter(|c| c.weight > 0.0)
                        .find(|c| {
                            r -= c.weight;
                            r <= 0.0
                        })
                        .or_else(|| children.iter().rev().find(|c| c.weight > 0.0));
                    if let Some(child) = picked {
                        child.selector.roll(rng, out);
                    }
                }
            }
        }
    }
}

// ---------- Registry ----------

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NamedTable {
    pub name: String,
    pub root: TableSelector,
}

/// Loaded tables by name.
#[derive(Resource, Clone, Debug, Default)]
pub struct HordeTables {
    tables: HashMap<String, TableSelector>,
}

impl HordeTables {
    pub fn from_tables(defs: Vec<NamedTable>) -> Result<Self, HordeError> {
        let mut tables = HashMap::with_capacity(defs.len());
        for def in defs {
            if tables.contains_key(&def.name) {
                return Err(HordeError::DuplicateTable(def.name));
            }
            tables.insert(def.name, def.root);
        }
        Ok(Self { tables })
    }

    pub fn from_ron_str(src: &str) -> Result<Self, HordeError> {
        let defs: Vec<NamedTable> = ron::de::from_str(src).map_err(|e| HordeError::Ron(e.to_string()))?;
        Self::from_tables(defs)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, HordeError> {
        let src = fs::read_to_string(path)?;
        Self::from_ron_str(&src)
    }

    pub fn get(&self, name: &str) -> Option<&TableSelector> {
        self.tables.get(name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl SpawnTable for HordeTables {
    fn expand(&self, table: &TableRef, rng: &mut dyn RandomSource) -> Result<Vec<SpawnSpec>, HordeError> {
        let root = self
            .tables
            .get(&table.0)
            .ok_or_else(|| HordeError::UnknownTable(table.0.clone()))?;
        let mut out = Vec::new();
        root.roll(rng, &mut out);
        debug!("Horde: table '{}' expanded to {} spawns", table, out.len());
        Ok(out)
    }
}
