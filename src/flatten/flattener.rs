use crate::error::FlattenError;
use crate::flatten::filter::FilterSet;
use crate::flatten::schema::{Schema, SchemaEntry};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Joins the items of a list held in a single cell
pub const LIST_SEPARATOR: &str = ", ";

/// Joins the per-element values of one complex sub-field
pub const ELEMENT_SEPARATOR: &str = "; ";

/// Outcome of flattening one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flattened {
    /// One cell per schema column
    Row(Vec<String>),
    /// A filter rule matched on `key`
    Dropped { key: String },
}

/// Projects semi-structured run records onto a fixed set of columns
#[derive(Debug, Clone)]
pub struct Flattener {
    schema: Schema,
    filters: FilterSet,
    known_keys: HashSet<String>,
}

impl Flattener {
    /// Filtered keys are removed from `schema` before any column is laid out
    pub fn new(schema: Schema, filters: FilterSet) -> Self {
        let known_keys = schema
            .entries()
            .iter()
            .map(|e| e.key.clone())
            .chain(filters.rules().iter().map(|r| r.key.clone()))
            .collect();

        Flattener {
            schema: schema.without_filtered(&filters),
            filters,
            known_keys,
        }
    }

    /// The column layout of every emitted row
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Flatten a record into a row, or report which filter dropped it.
    ///
    /// Every filter rule is checked, including rules on keys the schema does not declare.
    pub fn flatten(&self, record: &Map<String, Value>) -> Result<Flattened, FlattenError> {
        if let Some(rule) = self.filters.matching_rule(record) {
            return Ok(Flattened::Dropped {
                key: rule.key.clone(),
            });
        }

        let mut row = Vec::with_capacity(self.schema.column_count());
        for entry in self.schema.entries() {
            match record.get(&entry.key) {
                None => {
                    row.extend(std::iter::repeat(String::new()).take(entry.column_span()));
                }
                Some(value) if entry.is_scalar() => {
                    row.push(display_string(value));
                }
                Some(value) => {
                    Self::flatten_complex(entry, value, &mut row)?;
                }
            }
        }

        debug_assert_eq!(row.len(), self.schema.column_count());
        Ok(Flattened::Row(row))
    }

    /// Record keys that neither the schema nor the filter set knows about
    pub fn unknown_keys<'a>(&'a self, record: &'a Map<String, Value>) -> impl Iterator<Item = &'a str> + 'a {
        record
            .keys()
            .filter(move |k| !self.known_keys.contains(k.as_str()))
            .map(String::as_str)
    }

    /// Emit one cell per sub-field, each joining that sub-field across all elements
    fn flatten_complex(
        entry: &SchemaEntry,
        value: &Value,
        row: &mut Vec<String>,
    ) -> Result<(), FlattenError> {
        // A lone object is treated as a one-element list
        let elements = match value {
            Value::Array(items) => items.as_slice(),
            Value::Object(_) => std::slice::from_ref(value),
            other => {
                return Err(FlattenError::NotComplex {
                    key: entry.key.clone(),
                    found: kind_name(other),
                });
            }
        };

        let objects = elements
            .iter()
            .enumerate()
            .map(|(index, element)| {
                element.as_object().ok_or_else(|| FlattenError::ElementNotObject {
                    key: entry.key.clone(),
                    index,
                    found: kind_name(element),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for sub_field in &entry.sub_fields {
            let cell = objects
                .iter()
                .map(|obj| obj.get(sub_field).map(display_string).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(ELEMENT_SEPARATOR);
            row.push(cell);
        }

        Ok(())
    }
}

/// Text form of a value as it appears in a cell.
///
/// Booleans render as `True`/`False`, null as an empty cell, lists as their
/// items joined by [`LIST_SEPARATOR`] and objects as compact JSON.
pub fn display_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_string)
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR),
        Value::Object(_) => value.to_string(),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::filter::FilterRule;
    use crate::flatten::schema::SchemaEntry;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    fn row(flattened: Flattened) -> Vec<String> {
        match flattened {
            Flattened::Row(cells) => cells,
            Flattened::Dropped { key } => panic!("Expected a row, record was dropped by '{}'", key),
        }
    }

    fn run_schema() -> Schema {
        Schema::new(vec![
            SchemaEntry::scalar("victory", "Victory"),
            SchemaEntry::scalar("relics", "Relics"),
            SchemaEntry::complex("relics_obtained", "Relics Obtained", &["floor", "key"]),
            SchemaEntry::scalar("is_daily", "Is Daily"),
            SchemaEntry::scalar("score", "Score"),
        ])
        .unwrap()
    }

    fn daily_filter() -> FilterSet {
        FilterSet::new(vec![FilterRule::new("is_daily", json!(true))])
    }

    #[test]
    fn test_scalar_fields() {
        let schema = Schema::new(vec![
            SchemaEntry::scalar("victory", "Victory"),
            SchemaEntry::scalar("relics", "Relics"),
        ])
        .unwrap();
        let flattener = Flattener::new(schema, FilterSet::default());

        let cells = row(flattener
            .flatten(&record(json!({"victory": true, "relics": ["Boot", "Vajra"]})))
            .unwrap());

        assert_eq!(flattener.schema().header_row(), vec!["Victory", "Relics"]);
        assert_eq!(flattener.schema().sub_header_row(), vec!["", ""]);
        assert_eq!(cells, vec!["True", "Boot, Vajra"]);
    }

    #[test]
    fn test_complex_field_joins_elements() {
        let flattener = Flattener::new(run_schema(), FilterSet::default());
        let input = record(json!({
            "relics_obtained": [
                {"floor": 1, "key": "Boot"},
                {"floor": 3, "key": "Vajra"}
            ]
        }));

        let cells = row(flattener.flatten(&input).unwrap());

        assert_eq!(cells[2], "1; 3");
        assert_eq!(cells[3], "Boot; Vajra");
    }

    #[test]
    fn test_single_object_matches_one_element_list() {
        let flattener = Flattener::new(run_schema(), FilterSet::default());
        let single = record(json!({"relics_obtained": {"floor": 7, "key": "Anchor"}}));
        let listed = record(json!({"relics_obtained": [{"floor": 7, "key": "Anchor"}]}));

        assert_eq!(
            flattener.flatten(&single).unwrap(),
            flattener.flatten(&listed).unwrap()
        );
    }

    #[test]
    fn test_missing_sub_field_and_nested_list() {
        let schema = Schema::new(vec![SchemaEntry::complex(
            "card_choices",
            "Card Choices",
            &["not_picked", "picked", "floor"],
        )])
        .unwrap();
        let flattener = Flattener::new(schema, FilterSet::default());
        let input = record(json!({
            "card_choices": [
                {"not_picked": ["Strike", "Defend"], "picked": "Bash", "floor": 1},
                {"not_picked": ["Clash"], "floor": 2}
            ]
        }));

        let cells = row(flattener.flatten(&input).unwrap());

        assert_eq!(cells, vec!["Strike, Defend; Clash", "Bash; ", "1; 2"]);
    }

    #[test]
    fn test_missing_fields_keep_column_positions() {
        let flattener = Flattener::new(run_schema(), daily_filter());

        let cells = row(flattener.flatten(&record(json!({"score": 412}))).unwrap());

        assert_eq!(cells.len(), flattener.schema().column_count());
        assert_eq!(cells, vec!["", "", "", "", "412"]);
    }

    #[test]
    fn test_filter_drops_record_and_column() {
        let flattener = Flattener::new(run_schema(), daily_filter());

        let dropped = flattener
            .flatten(&record(json!({"is_daily": true, "victory": true})))
            .unwrap();
        assert_eq!(dropped, Flattened::Dropped { key: "is_daily".to_string() });

        let kept = row(flattener
            .flatten(&record(json!({"is_daily": false, "victory": true})))
            .unwrap());
        assert_eq!(kept.len(), 5);
        assert!(!flattener.schema().header_row().contains(&"Is Daily".to_string()));
    }

    #[test]
    fn test_filter_on_undeclared_key_still_drops() {
        let filters = FilterSet::new(vec![FilterRule::new("is_endless", json!(true))]);
        let flattener = Flattener::new(run_schema(), filters);

        let dropped = flattener
            .flatten(&record(json!({"is_endless": true, "victory": true})))
            .unwrap();

        assert_eq!(dropped, Flattened::Dropped { key: "is_endless".to_string() });
        assert_eq!(flattener.schema().column_count(), run_schema().column_count());
    }

    #[test]
    fn test_empty_complex_list_gives_empty_cells() {
        let flattener = Flattener::new(run_schema(), FilterSet::default());

        let cells = row(flattener.flatten(&record(json!({"relics_obtained": []}))).unwrap());

        assert_eq!(cells[2], "");
        assert_eq!(cells[3], "");
    }

    #[test]
    fn test_scalar_in_complex_field_is_rejected() {
        let flattener = Flattener::new(run_schema(), FilterSet::default());

        let err = flattener
            .flatten(&record(json!({"relics_obtained": "Boot"})))
            .unwrap_err();
        assert_eq!(
            err,
            FlattenError::NotComplex {
                key: "relics_obtained".to_string(),
                found: "a string",
            }
        );

        let err = flattener
            .flatten(&record(json!({"relics_obtained": [{"floor": 1}, 5]})))
            .unwrap_err();
        assert_eq!(
            err,
            FlattenError::ElementNotObject {
                key: "relics_obtained".to_string(),
                index: 1,
                found: "a number",
            }
        );
    }

    #[test]
    fn test_display_strings() {
        assert_eq!(display_string(&json!(null)), "");
        assert_eq!(display_string(&json!(false)), "False");
        assert_eq!(display_string(&json!(-3)), "-3");
        assert_eq!(display_string(&json!(1.5)), "1.5");
        assert_eq!(display_string(&json!("NeowsLament")), "NeowsLament");
        assert_eq!(display_string(&json!([1, "a", true])), "1, a, True");
        assert_eq!(display_string(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn test_unknown_keys() {
        let flattener = Flattener::new(run_schema(), daily_filter());
        let input = record(json!({"victory": true, "is_daily": false, "circlet_count": 0}));

        let unknown: Vec<&str> = flattener.unknown_keys(&input).collect();

        assert_eq!(unknown, vec!["circlet_count"]);
    }
}
