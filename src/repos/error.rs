/*
 * Responsibility
 * - repo が上位に伝える意味の定義
 */
use thiserror::Error;

use crate::repos::sql::SqlError;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
    #[error(transparent)]
    Sql(#[from] SqlError),
}
