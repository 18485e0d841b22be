use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    model::Record,
    store::{StoreError, SubscriptionStore},
    web::{
        types::{DataParsingError, SubscribeRequest, SubscriberEmail},
        WebResult,
    },
    AppState,
};

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum SubscribeError {
    #[error("data parsing error: {0}")]
    DataParsing(#[from] DataParsingError),
    #[error("failed to store the subscription: {0}")]
    Store(#[from] StoreError),
}

// ###################################
// ->   API
// ###################################
#[derive(Debug, Serialize)]
pub struct Subscribed {
    message: &'static str,
    email: String,
}

impl From<SubscriberEmail> for Subscribed {
    fn from(email: SubscriberEmail) -> Self {
        Subscribed {
            message: "Email subscription successful",
            email: email.as_ref().to_string(),
        }
    }
}

/// Validates the email in the JSON body and stores a new subscription record for it.
/// The body is taken as raw bytes, a missing or wrong `Content-Type` is not a reason to reject it.
/// A body that can't be buffered (e.g. over the size limit) is rejected like any other bad input.
#[tracing::instrument(name = "Collecting a subscription", skip(app_state, body))]
pub async fn subscribe(
    State(app_state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> WebResult<Json<Subscribed>> {
    let body = body
        .map_err(|rej| SubscribeError::from(DataParsingError::UnreadableBody(rej.body_text())))
        .inspect_err(|er| warn!("REJECTED: {er}"))?;
    let email = store_subscription(app_state.store.as_ref(), &body).await?;

    Ok(Json(email.into()))
}

/// Exactly one write on success, none when the input is rejected.
async fn store_subscription(
    store: &dyn SubscriptionStore,
    body: &[u8],
) -> Result<SubscriberEmail, SubscribeError> {
    let email = SubscribeRequest::parse_body(body).inspect_err(|er| warn!("REJECTED: {er}"))?;

    let record = Record::new(&email);
    store.put(&record).await?;
    info!(subscriber_email = %email, id = %record.id, "STORED");

    Ok(email)
}
