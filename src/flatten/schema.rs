//! Declarative column schema for flattened run records
//!
//! A [`Schema`] is an ordered list of [`SchemaEntry`] values. Declaration order
//! is output column order. Scalar entries own one column; complex entries own
//! one column per sub-field.

use crate::error::SchemaError;
use crate::flatten::filter::FilterSet;
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// One output field: a record key, its display header and its sub-fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEntry {
    pub key: String,
    pub header: String,
    /// Empty for scalar fields
    pub sub_fields: Vec<String>,
}

impl SchemaEntry {
    pub fn scalar(key: impl Into<String>, header: impl Into<String>) -> Self {
        SchemaEntry {
            key: key.into(),
            header: header.into(),
            sub_fields: Vec::new(),
        }
    }

    pub fn complex(key: impl Into<String>, header: impl Into<String>, sub_fields: &[&str]) -> Self {
        SchemaEntry {
            key: key.into(),
            header: header.into(),
            sub_fields: sub_fields.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn is_scalar(&self) -> bool {
        self.sub_fields.is_empty()
    }

    /// Number of output columns this entry owns
    pub fn column_span(&self) -> usize {
        self.sub_fields.len().max(1)
    }

    fn validate(&self) -> Result<(), SchemaError> {
        if self.key.is_empty() {
            return Err(SchemaError::EmptyKey);
        }

        let mut seen = HashSet::new();
        for sub_field in &self.sub_fields {
            if sub_field.is_empty() {
                return Err(SchemaError::EmptySubField {
                    key: self.key.clone(),
                });
            }
            if !seen.insert(sub_field.as_str()) {
                return Err(SchemaError::DuplicateSubField {
                    key: self.key.clone(),
                    sub_field: sub_field.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Ordered, validated collection of schema entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    entries: Vec<SchemaEntry>,
}

impl Schema {
    /// Build a schema, rejecting empty or duplicate keys and malformed sub-field lists
    pub fn new(entries: Vec<SchemaEntry>) -> Result<Self, SchemaError> {
        let mut keys = HashSet::new();
        for entry in &entries {
            entry.validate()?;
            if !keys.insert(entry.key.as_str()) {
                return Err(SchemaError::DuplicateKey(entry.key.clone()));
            }
        }

        Ok(Schema { entries })
    }

    /// The built-in layout for Slay the Spire run history uploads
    pub fn sts_runs() -> Self {
        STS_RUNS.clone()
    }

    pub fn entries(&self) -> &[SchemaEntry] {
        &self.entries
    }

    /// Drop every entry whose key carries a filter rule.
    ///
    /// Filtered fields never produce columns, whether or not a record matched.
    pub fn without_filtered(&self, filters: &FilterSet) -> Schema {
        Schema {
            entries: self
                .entries
                .iter()
                .filter(|e| !filters.contains_key(&e.key))
                .cloned()
                .collect(),
        }
    }

    pub fn column_count(&self) -> usize {
        self.entries.iter().map(SchemaEntry::column_span).sum()
    }

    /// Display headers: the entry header on its first column, blanks on the rest
    pub fn header_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(self.column_count());
        for entry in &self.entries {
            row.push(entry.header.clone());
            row.extend(std::iter::repeat(String::new()).take(entry.column_span() - 1));
        }
        row
    }

    /// Sub-field names, blank for scalar columns
    pub fn sub_header_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(self.column_count());
        for entry in &self.entries {
            if entry.is_scalar() {
                row.push(String::new());
            } else {
                row.extend(entry.sub_fields.iter().cloned());
            }
        }
        row
    }
}

const STS_RUN_FIELDS: &[(&str, &str, &[&str])] = &[
    ("play_id", "Play Id", &[]),
    ("build_version", "Build Version", &[]),
    ("timestamp", "Timestamp", &[]),
    ("local_time", "Local Time", &[]),
    ("playtime", "Playtime", &[]),
    ("is_beta", "Is Beta", &[]),
    ("is_prod", "Is Prod", &[]),
    ("is_trial", "Is Trial", &[]),
    ("is_daily", "Is Daily", &[]),
    ("is_endless", "Is Endless", &[]),
    ("seed_played", "Seed Played", &[]),
    ("chose_seed", "Chose Seed", &[]),
    ("is_ascension_mode", "Is Ascension Mode", &[]),
    ("ascension_level", "Ascension Level", &[]),
    ("victory", "Victory", &[]),
    ("score", "Score", &[]),
    ("floor_reached", "Floor Reached", &[]),
    ("killed_by", "Killed By", &[]),
    ("character_chosen", "Character Chosen", &[]),
    ("master_deck", "Master Deck", &[]),
    ("relics", "Relics", &[]),
    ("neow_bonus", "Neow Bonus", &[]),
    ("neow_cost", "Neow Cost", &[]),
    ("gold", "Gold", &[]),
    ("gold_per_floor", "Gold Per Floor", &[]),
    ("player_experience", "Player Experience", &[]),
    ("path_per_floor", "Path Per Floor", &[]),
    ("path_taken", "Path Taken", &[]),
    ("campfire_rested", "Campfire Rested", &[]),
    ("campfire_upgraded", "Campfire Upgraded", &[]),
    ("campfire_choices", "Campfire Choices", &["floor", "key", "data"]),
    ("max_hp_per_floor", "Max Hp Per Floor", &[]),
    ("current_hp_per_floor", "Current Hp Per Floor", &[]),
    ("damage_taken", "Damage Taken", &["damage", "enemies", "floor", "turns"]),
    ("card_choices", "Card Choices", &["not_picked", "picked", "floor"]),
    ("relics_obtained", "Relics Obtained", &["floor", "key"]),
    ("boss_relics", "Boss Relics", &["not_picked", "picked"]),
    (
        "event_choices",
        "Event Choices",
        &[
            "floor",
            "event_name",
            "player_choice",
            "damage_healed",
            "damage_taken",
            "max_hp_gain",
            "max_hp_loss",
            "gold_gain",
            "gold_loss",
            "cards_obtained",
            "cards_removed",
            "cards_upgraded",
            "cards_transformed",
            "relics_obtained",
            "relics_lost",
            "potions_obtained",
        ],
    ),
    ("items_purchased", "Items Purchased", &[]),
    ("item_purchase_floors", "Item Purchase Floors", &[]),
    ("items_purged", "Items Purged", &[]),
    ("items_purged_floors", "Items Purged Floors", &[]),
    ("purchased_purges", "Purchased Purges", &[]),
    ("potions_obtained", "Potions Obtained", &["floor", "key"]),
    ("potions_floor_spawned", "Potions Floor Spawned", &[]),
    ("potions_floor_usage", "Potions Floor Usage", &[]),
];

static STS_RUNS: Lazy<Schema> = Lazy::new(|| {
    let entries = STS_RUN_FIELDS
        .iter()
        .map(|(key, header, sub_fields)| SchemaEntry::complex(*key, *header, sub_fields))
        .collect();
    Schema::new(entries).unwrap()
});
