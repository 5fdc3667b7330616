//! SQL text generation for snapshots and keyed updates.
//!
//! Only identifiers are spliced into the text, always through
//! [`quote_ident`]. Values travel as positional `?` parameters.

use serde_json::Value;

use crate::change::Change;
use crate::error::EditorError;
use crate::ident::quote_ident;

/// SQL text plus its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// `SELECT * FROM <table> LIMIT ?`
pub fn select_statement(table: &str, limit: u64) -> Result<Statement, EditorError> {
    Ok(Statement {
        sql: format!("SELECT * FROM {} LIMIT ?", quote_ident(table)?),
        params: vec![Value::from(limit)],
    })
}

/// `UPDATE <table> SET <c1>=?, ... WHERE <pk1>=? AND ...`
///
/// Parameters are the `set` values in `set` order followed by the key
/// values in `pk_cols` order. Returns `None` when the change has no columns
/// to write.
pub fn update_statement(
    table: &str,
    pk_cols: &[String],
    change: &Change,
) -> Result<Option<Statement>, EditorError> {
    if change.is_empty() {
        return Ok(None);
    }
    if pk_cols.is_empty() {
        return Err(EditorError::validation("No primary key columns configured"));
    }

    let mut params = Vec::with_capacity(change.set.len() + pk_cols.len());

    let mut assignments = Vec::with_capacity(change.set.len());
    for (column, value) in &change.set {
        assignments.push(format!("{}=?", quote_ident(column)?));
        params.push(value.clone());
    }

    let mut predicates = Vec::with_capacity(pk_cols.len());
    for pk in pk_cols {
        let value = change
            .pk
            .get(pk)
            .ok_or_else(|| EditorError::validation(format!("Missing PK {} in pk", pk)))?;
        predicates.push(format!("{}=?", quote_ident(pk)?));
        params.push(value.clone());
    }

    Ok(Some(Statement {
        sql: format!(
            "UPDATE {} SET {} WHERE {}",
            quote_ident(table)?,
            assignments.join(", "),
            predicates.join(" AND ")
        ),
        params,
    }))
}

/// Builds the statements for a batch, skipping changes with nothing to write.
///
/// Everything is built up front so identifier problems surface before a
/// transaction is opened.
pub fn update_statements(
    table: &str,
    pk_cols: &[String],
    changes: &[Change],
) -> Result<Vec<Statement>, EditorError> {
    let mut statements = Vec::with_capacity(changes.len());
    for change in changes {
        if let Some(statement) = update_statement(table, pk_cols, change)? {
            statements.push(statement);
        }
    }
    Ok(statements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn change(value: Value) -> Change {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_select_statement() {
        let stmt = select_statement("items", 200).unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM `items` LIMIT ?");
        assert_eq!(stmt.params, vec![json!(200)]);

        assert!(select_statement("items where 1=1", 200).is_err());
    }

    #[test]
    fn test_single_column_update() {
        let stmt = update_statement(
            "items",
            &["id".to_string()],
            &change(json!({"pk": {"id": 1}, "set": {"bi_price": 20}})),
        )
        .unwrap()
        .unwrap();

        assert_eq!(stmt.sql, "UPDATE `items` SET `bi_price`=? WHERE `id`=?");
        assert_eq!(stmt.params, vec![json!(20), json!(1)]);
    }

    #[test]
    fn test_composite_key_update_orders_params() {
        let stmt = update_statement(
            "stock",
            &["material_codigo".to_string(), "centro".to_string()],
            &change(json!({
                "pk": {"centro": "C1", "material_codigo": "M1"},
                "set": {"bi_x": "nuevo", "bi_y": null}
            })),
        )
        .unwrap()
        .unwrap();

        assert_eq!(
            stmt.sql,
            "UPDATE `stock` SET `bi_x`=?, `bi_y`=? WHERE `material_codigo`=? AND `centro`=?"
        );
        assert_eq!(
            stmt.params,
            vec![json!("nuevo"), Value::Null, json!("M1"), json!("C1")]
        );
    }

    #[test]
    fn test_empty_change_is_skipped() {
        let pk_cols = vec!["id".to_string()];
        let changes = vec![
            change(json!({"pk": {"id": 1}, "set": {}})),
            change(json!({"pk": {"id": 2}, "set": {"bi_a": 1}})),
        ];
        let statements = update_statements("items", &pk_cols, &changes).unwrap();
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].params, vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_bad_identifier_fails_whole_batch() {
        let pk_cols = vec!["id".to_string()];
        let changes = vec![
            change(json!({"pk": {"id": 1}, "set": {"bi_a": 1}})),
            change(json!({"pk": {"id": 2}, "set": {"bi`a": 1}})),
        ];
        assert_eq!(
            update_statements("items", &pk_cols, &changes),
            Err(EditorError::InvalidIdentifier("bi`a".to_string()))
        );
    }
}
