pub mod admin;
pub mod auth;
pub mod public;

use crate::error::SiteError;

pub async fn not_found() -> SiteError {
    SiteError::NotFound
}
