use super::error::ApiError;
use super::responses::UsersPage;
use super::session::ApiSession;
use super::types::Identity;
use super::{classify, PAGE_SIZE};
use crate::retry::{self, RetryConfig};

async fn fetch_users_page(
    session: &dyn ApiSession,
    page_number: u32,
    retry_config: &RetryConfig,
) -> Result<UsersPage, ApiError> {
    let query = [
        ("page_size", PAGE_SIZE.to_string()),
        ("page_number", page_number.to_string()),
    ];
    let what = format!("User listing page {}", page_number);
    let value = retry::retry_with_backoff(retry_config, &what, classify, || {
        session.get_json("users", &query)
    })
    .await?;
    Ok(serde_json::from_value(value)?)
}

/// Enumerate every user on the account, in page order.
///
/// The first request doubles as page 1 and tells us how many pages exist.
/// An [`ApiError::Unauthorized`] from it means the token is unusable and no
/// sync can happen; callers should treat it as fatal.
pub async fn list_identities(
    session: &dyn ApiSession,
    retry_config: &RetryConfig,
) -> Result<Vec<Identity>, ApiError> {
    let first = fetch_users_page(session, 1, retry_config).await?;
    let page_count = first.page_count;
    tracing::debug!(page_count, "Listing users");

    let mut identities: Vec<Identity> = first.users.into_iter().map(Identity::from).collect();

    for page_number in 2..=page_count {
        let page = fetch_users_page(session, page_number, retry_config).await?;
        tracing::debug!(page_number, users = page.users.len(), "Fetched users page");
        identities.extend(page.users.into_iter().map(Identity::from));
    }

    Ok(identities)
}
