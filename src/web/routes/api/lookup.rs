use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::info;

use crate::{
    model::Record,
    store::{StoreError, SubscriptionStore},
    web::{
        types::{DataParsingError, LookupQuery},
        WebResult,
    },
    AppState,
};

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("data parsing error: {0}")]
    DataParsing(#[from] DataParsingError),
    #[error("failed to query the store: {0}")]
    Store(#[from] StoreError),
}

// ###################################
// ->   API
// ###################################
/// A lookup that went through. An email without records is an answer, not an error.
#[derive(Debug, PartialEq, Eq)]
pub enum LookupResponse {
    Found(Vec<Record>),
    NotFound,
}

impl IntoResponse for LookupResponse {
    fn into_response(self) -> Response {
        match self {
            LookupResponse::Found(records) => (
                StatusCode::OK,
                Json(json!({ "message": "Records found", "records": records })),
            )
                .into_response(),
            LookupResponse::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": "Email not found" })),
            )
                .into_response(),
        }
    }
}

/// Returns every record stored for the `email` query parameter, oldest first.
#[tracing::instrument(name = "Looking up subscriptions", skip(app_state, query))]
pub async fn lookup(
    State(app_state): State<AppState>,
    query: Result<Query<LookupQuery>, QueryRejection>,
) -> WebResult<LookupResponse> {
    // A query string that can't be deserialized has no usable email either.
    let query = query.map(|Query(q)| q).unwrap_or_default();
    let response = find_records(app_state.store.as_ref(), &query).await?;

    Ok(response)
}

async fn find_records(
    store: &dyn SubscriptionStore,
    query: &LookupQuery,
) -> Result<LookupResponse, LookupError> {
    let email = query.email()?;

    let records = store.query(email).await?;
    info!(subscriber_email = %email, "FOUND {} record(s)", records.len());

    if records.is_empty() {
        Ok(LookupResponse::NotFound)
    } else {
        Ok(LookupResponse::Found(records))
    }
}
