//! Whole-record exclusion rules

use once_cell::sync::Lazy;
use serde_json::{Map, Value};

/// Drop any record whose value at `key` equals `required`
#[derive(Debug, Clone, PartialEq)]
pub struct FilterRule {
    pub key: String,
    pub required: Value,
}

impl FilterRule {
    pub fn new(key: impl Into<String>, required: Value) -> Self {
        FilterRule {
            key: key.into(),
            required,
        }
    }

    /// An absent key never matches.
    pub fn matches(&self, record: &Map<String, Value>) -> bool {
        record.get(&self.key) == Some(&self.required)
    }
}

/// Ordered set of filter rules, evaluated first to last
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    rules: Vec<FilterRule>,
}

impl FilterSet {
    pub fn new(rules: Vec<FilterRule>) -> Self {
        FilterSet { rules }
    }

    /// Beta, prod, trial, daily, endless and custom-seed runs are excluded
    pub fn sts_defaults() -> Self {
        STS_DEFAULTS.clone()
    }

    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.rules.iter().any(|r| r.key == key)
    }

    /// First rule that matches the record, if any
    pub fn matching_rule(&self, record: &Map<String, Value>) -> Option<&FilterRule> {
        self.rules.iter().find(|r| r.matches(record))
    }

    pub fn should_exclude(&self, record: &Map<String, Value>) -> bool {
        self.matching_rule(record).is_some()
    }
}

static STS_DEFAULTS: Lazy<FilterSet> = Lazy::new(|| {
    FilterSet::new(
        ["is_beta", "is_prod", "is_trial", "is_daily", "is_endless", "chose_seed"]
            .into_iter()
            .map(|key| FilterRule::new(key, Value::Bool(true)))
            .collect(),
    )
});
