//! API route definitions.

use axum::{Router, middleware};

use ledgersync_shared::types::PageRequest;

use crate::{AppState, middleware::auth_middleware};

pub mod bank_accounts;
pub mod bank_transactions;
pub mod health;
pub mod journal_entries;
pub mod vouchers;

/// Creates the API router: public health check plus the authenticated routes.
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(vouchers::routes())
        .merge(bank_accounts::routes())
        .merge(bank_transactions::routes())
        .merge(journal_entries::routes())
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}

/// Builds a page request from optional query parameters.
pub(crate) fn page_request(page: Option<u32>, per_page: Option<u32>) -> PageRequest {
    let defaults = PageRequest::default();
    PageRequest {
        page: page.unwrap_or(defaults.page).max(1),
        per_page: per_page
            .unwrap_or(defaults.per_page)
            .clamp(1, PageRequest::MAX_PER_PAGE),
    }
}
