/*
 * Responsibility
 * - users テーブル向け SQLx 操作
 * - PgPool を受け取り list / get / partial update / delete を提供
 * - DB エラーは RepoError に変換しやすい形で返す
 */
use serde_json::{Map, Value};
use sqlx::{FromRow, PgPool};

use crate::repos::{
    error::RepoError,
    sql::{self, FieldNameMap},
};

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

/// API field name -> users column. `email` and `username` map to themselves.
fn field_names() -> FieldNameMap<'static> {
    FieldNameMap::from([("firstName", "first_name"), ("lastName", "last_name")])
}

pub async fn list(db: &PgPool) -> Result<Vec<UserRow>, RepoError> {
    let rows = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT username, first_name, last_name, email, is_admin
        FROM users
        ORDER BY username
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn get(db: &PgPool, username: &str) -> Result<Option<UserRow>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT username, first_name, last_name, email, is_admin
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

/// Selective update: only the keys present in `changes` are written.
///
/// Returns `RepoError::Sql(SqlError::NoData)` for an empty `changes`.
pub async fn update(
    db: &PgPool,
    username: &str,
    changes: &Map<String, Value>,
) -> Result<Option<UserRow>, RepoError> {
    let clause = sql::partial_update(changes, &field_names())?;

    let query = format!(
        r#"
        UPDATE users
        SET {}
        WHERE username = ${}
        RETURNING username, first_name, last_name, email, is_admin
        "#,
        clause.set_cols,
        clause.next_placeholder(),
    );

    let mut q = sqlx::query_as::<_, UserRow>(&query);
    for value in &clause.values {
        q = sql::bind_json(q, value);
    }

    let row = q.bind(username).fetch_optional(db).await?;

    Ok(row)
}

pub async fn delete(db: &PgPool, username: &str) -> Result<bool, RepoError> {
    let result = sqlx::query(
        r#"
        DELETE FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}
