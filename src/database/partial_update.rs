use serde_json::{Map, Value};
use sqlx::{postgres::PgArguments, postgres::PgRow, FromRow, PgPool};

use crate::database::manager::DatabaseError;
use crate::error::ApiError;

/// A parameterized statement ready for execution
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub query: String,
    pub params: Vec<Value>,
}

/// Builds `UPDATE ... SET` statements touching only the columns present in a
/// request body.
///
/// Column names must come from a typed payload (never raw user keys); values
/// are only ever bound through `$n` placeholders.
pub struct PartialUpdate;

impl PartialUpdate {
    /// Assign each field a placeholder in insertion order, then append the key
    /// predicate as the last placeholder.
    ///
    /// An empty field map is rejected with a 400 instead of producing
    /// `UPDATE t SET  WHERE ...`.
    pub fn build(
        table: &str,
        fields: &Map<String, Value>,
        key_column: &str,
        key_value: impl Into<Value>,
    ) -> Result<UpdateStatement, ApiError> {
        if fields.is_empty() {
            return Err(ApiError::bad_request("At least one field is required to update."));
        }

        let columns: Vec<String> = fields
            .keys()
            .enumerate()
            .map(|(idx, column)| format!("{}=${}", column, idx + 1))
            .collect();

        let query = format!(
            "UPDATE {} SET {} WHERE {}=${} RETURNING *",
            table,
            columns.join(", "),
            key_column,
            fields.len() + 1
        );

        let mut params: Vec<Value> = fields.values().cloned().collect();
        params.push(key_value.into());

        Ok(UpdateStatement { query, params })
    }
}

impl UpdateStatement {
    /// Execute and return the updated row, or `None` when no row matched the key
    pub async fn fetch_optional<T>(&self, pool: &PgPool) -> Result<Option<T>, DatabaseError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut q = sqlx::query_as::<_, T>(&self.query);
        for p in self.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let row = q.fetch_optional(pool).await?;
        Ok(row)
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        // JSONB
        Value::Array(_) | Value::Object(_) => q.bind(sqlx::types::Json(v)),
    }
}
