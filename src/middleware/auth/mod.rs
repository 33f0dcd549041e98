pub mod access;
pub mod guard;

pub use guard::{ensure_admin, ensure_logged_in, ensure_self_or_admin};
