//! Route handlers

pub mod health;
pub mod students;

/// Plain-text greeting on `/`
pub async fn welcome() -> &'static str {
    "Welcome to students api"
}
