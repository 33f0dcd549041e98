/*
 * Responsibility
 * - Users の request/response DTO
 * - validation (形式チェック) 用の validate()
 * - PATCH body → partial update 用の Map への変換 (送られたフィールドだけ)
 */
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::repos::user_repo::UserRow;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(name) = &self.first_name
            && !(1..=30).contains(&name.trim().chars().count())
        {
            return Err("firstName must be 1-30 chars");
        }
        if let Some(name) = &self.last_name
            && !(1..=30).contains(&name.trim().chars().count())
        {
            return Err("lastName must be 1-30 chars");
        }
        if let Some(email) = &self.email {
            if !(6..=60).contains(&email.chars().count()) {
                return Err("email must be 6-60 chars");
            }
            if !looks_like_email(email) {
                return Err("email is not a valid address");
            }
        }

        Ok(())
    }

    /// Present fields only, keyed by their API names, in declaration order.
    pub fn into_changes(self) -> Map<String, Value> {
        let mut changes = Map::new();
        if let Some(v) = self.first_name {
            changes.insert("firstName".into(), Value::String(v));
        }
        if let Some(v) = self.last_name {
            changes.insert("lastName".into(), Value::String(v));
        }
        if let Some(v) = self.email {
            changes.insert("email".into(), Value::String(v));
        }
        changes
    }
}

fn looks_like_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !s.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            is_admin: row.is_admin,
        }
    }
}
