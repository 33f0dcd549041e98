/*
 * Responsibility
 * - partial update 用の `SET` 句を組み立てる (UPDATE ... SET "col"=$1, ...)
 * - serde_json::Value を sqlx の bind に載せ替える
 * - WHERE 句や RETURNING は各 repo 側で組み立てる
 */
use std::collections::HashMap;

use serde_json::{Map, Value};
use sqlx::{Postgres, postgres::PgArguments, query::QueryAs};
use thiserror::Error;

/// logical field name (API 側の camelCase) -> physical column name
pub type FieldNameMap<'a> = HashMap<&'a str, &'a str>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SqlError {
    #[error("no data to update")]
    NoData,
}

/// Generated `SET` clause.
///
/// `$i` in `set_cols` binds to `values[i - 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SetClause {
    pub set_cols: String,
    pub values: Vec<Value>,
}

impl SetClause {
    /// Next free placeholder index, for the caller's WHERE clause.
    pub fn next_placeholder(&self) -> usize {
        self.values.len() + 1
    }
}

/// Build a `SET` clause for a selective update.
///
/// Keys are emitted in the map's insertion order. A key missing from
/// `field_names` is used as the column name unchanged.
///
/// ```ignore
/// // {firstName: "Aliya", age: 32} => "\"first_name\"=$1, \"age\"=$2", ["Aliya", 32]
/// ```
pub fn partial_update(
    data: &Map<String, Value>,
    field_names: &FieldNameMap<'_>,
) -> Result<SetClause, SqlError> {
    if data.is_empty() {
        return Err(SqlError::NoData);
    }

    let (cols, values): (Vec<String>, Vec<Value>) = data
        .iter()
        .enumerate()
        .map(|(idx, (key, value))| {
            let column = field_names.get(key.as_str()).copied().unwrap_or(key.as_str());
            (
                format!("{}=${}", quote_ident(column), idx + 1),
                value.clone(),
            )
        })
        .unzip();

    Ok(SetClause {
        set_cols: cols.join(", "),
        values,
    })
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Bind a JSON scalar with the closest Postgres type.
///
/// The users resource only sends strings; null / bool / number cover callers
/// that update nullable, flag or numeric columns. Arrays / objects are bound
/// as their JSON text.
pub fn bind_json<'q, O>(
    query: QueryAs<'q, Postgres, O, PgArguments>,
    value: &'q Value,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64()),
        },
        Value::String(s) => query.bind(s.as_str()),
        other => query.bind(other.to_string()),
    }
}
