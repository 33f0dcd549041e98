/*
 * Responsibility
 * - SQLx を使った永続化層 (table ごとの repo + SQL 組み立て helper)
 */
pub mod error;
pub mod sql;
pub mod user_repo;
