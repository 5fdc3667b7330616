//! Change-sets submitted by the grid and their validation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::is_pk_column;
use crate::error::EditorError;
use crate::ident::{is_bi_column, quote_ident};

/// Edits to one row: the key that targets it and the new cell values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Change {
    /// Primary key column to value
    pub pk: Map<String, Value>,
    /// Editable column to new value
    pub set: Map<String, Value>,
}

impl Change {
    /// Returns true if there is nothing to write for this row.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

/// Body of `POST /update`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub changes: Vec<Change>,
}

impl ChangeSet {
    /// Parses and validates a raw request body.
    ///
    /// The whole set is rejected on the first problem, so either every
    /// change is acceptable or nothing reaches the store.
    pub fn parse(body: &[u8], pk_cols: &[String]) -> Result<Self, EditorError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| EditorError::validation(format!("Invalid body: {}", e)))?;
        Self::from_value(value, pk_cols)
    }

    /// Validates an already decoded JSON document.
    pub fn from_value(value: Value, pk_cols: &[String]) -> Result<Self, EditorError> {
        let entries = match value {
            Value::Object(mut body) => match body.remove("changes") {
                Some(Value::Array(entries)) => entries,
                _ => return Err(invalid_body()),
            },
            _ => return Err(invalid_body()),
        };

        let mut changes = Vec::with_capacity(entries.len());
        for entry in entries {
            let Value::Object(mut entry) = entry else {
                return Err(EditorError::validation("Invalid change: missing pk"));
            };
            let pk = match entry.remove("pk") {
                Some(Value::Object(pk)) => pk,
                _ => return Err(EditorError::validation("Invalid change: missing pk")),
            };
            let set = match entry.remove("set") {
                Some(Value::Object(set)) => set,
                _ => return Err(EditorError::validation("Invalid change: missing set")),
            };

            let change = Change { pk, set };
            validate_change(&change, pk_cols)?;
            changes.push(change);
        }

        Ok(Self { changes })
    }
}

/// Checks one change against the editable-column and primary key rules.
pub fn validate_change(change: &Change, pk_cols: &[String]) -> Result<(), EditorError> {
    for column in change.set.keys() {
        if !is_bi_column(column) {
            return Err(EditorError::validation(format!(
                "Column not allowed (not BI): {}",
                column
            )));
        }
        if is_pk_column(pk_cols, column) {
            return Err(EditorError::validation(format!(
                "Column not allowed (primary key): {}",
                column
            )));
        }
        quote_ident(column)?;
    }

    for pk in pk_cols {
        if !change.pk.contains_key(pk) {
            return Err(EditorError::validation(format!("Missing PK {} in pk", pk)));
        }
    }

    Ok(())
}

fn invalid_body() -> EditorError {
    EditorError::validation("Invalid body: expected {changes: [...]}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pk_cols() -> Vec<String> {
        vec!["material_codigo".to_string(), "centro".to_string()]
    }

    fn parse(value: Value) -> Result<ChangeSet, EditorError> {
        ChangeSet::parse(value.to_string().as_bytes(), &pk_cols())
    }

    #[test]
    fn test_parse_valid_change_set() {
        let set = parse(json!({
            "changes": [
                {"pk": {"material_codigo": "X", "centro": "Y"}, "set": {"bi_x": "nuevo", "bi_y": 123}},
                {"pk": {"material_codigo": "Z", "centro": "Y"}, "set": {}}
            ]
        }))
        .unwrap();

        assert_eq!(set.changes.len(), 2);
        assert_eq!(set.changes[0].set.get("bi_y"), Some(&json!(123)));
        assert!(set.changes[1].is_empty());
    }

    #[test]
    fn test_rejects_malformed_bodies() {
        for body in [json!([]), json!({}), json!({"changes": {}}), json!("x")] {
            let err = parse(body).unwrap_err();
            assert!(err.to_string().starts_with("Invalid body"), "{}", err);
        }

        let err = ChangeSet::parse(b"{not json", &pk_cols()).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_rejects_missing_pk_or_set() {
        let err = parse(json!({"changes": [{"set": {"bi_x": 1}}]})).unwrap_err();
        assert_eq!(err.to_string(), "Invalid change: missing pk");

        let err = parse(json!({"changes": [{"pk": "X", "set": {"bi_x": 1}}]})).unwrap_err();
        assert_eq!(err.to_string(), "Invalid change: missing pk");

        let err = parse(json!({
            "changes": [{"pk": {"material_codigo": "X", "centro": "Y"}}]
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid change: missing set");
    }

    #[test]
    fn test_rejects_whole_set_on_non_bi_column() {
        let err = parse(json!({
            "changes": [
                {"pk": {"material_codigo": "X", "centro": "Y"}, "set": {"bi_x": 1}},
                {"pk": {"material_codigo": "Z", "centro": "Y"}, "set": {"descripcion": "hack"}}
            ]
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "Column not allowed (not BI): descripcion");
    }

    #[test]
    fn test_rejects_missing_pk_column() {
        let err = parse(json!({
            "changes": [
                {"pk": {"material_codigo": "X", "centro": "Y"}, "set": {"bi_x": 1}},
                {"pk": {"material_codigo": "Z"}, "set": {"bi_x": 2}}
            ]
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "Missing PK centro in pk");
    }

    #[test]
    fn test_rejects_pk_column_in_set_and_bad_identifier() {
        let pk_cols = vec!["bin".to_string()];
        let err = ChangeSet::from_value(
            json!({"changes": [{"pk": {"bin": 1}, "set": {"bin": 2}}]}),
            &pk_cols,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Column not allowed (primary key): bin");

        let err = ChangeSet::from_value(
            json!({"changes": [{"pk": {"bin": 1}, "set": {"bi x": 2}}]}),
            &pk_cols,
        )
        .unwrap_err();
        assert_eq!(err, EditorError::InvalidIdentifier("bi x".to_string()));
    }
}
