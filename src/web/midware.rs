use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, Method, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{
    web::{log, Error, REQUEST_ID_HEADER},
    AppState,
};

/// Turns a handler `Error` stored in the response extensions into the client facing `{"message": ..}` body,
/// logs the request and sets the cross-origin header on every response.
pub async fn response_mapper(
    State(app_state): State<AppState>,
    req_method: Method,
    uri: Uri,
    resp: Response,
) -> Response {
    let req_id = resp.headers().get(REQUEST_ID_HEADER).cloned();

    let web_error = resp.extensions().get::<Arc<Error>>().map(|er| &**er);
    let client_status_and_error = web_error.map(Error::status_code_and_client_error);

    log::log_request(
        req_id
            .as_ref()
            .and_then(|id| id.to_str().ok())
            .map(str::to_string),
        req_method,
        uri,
        resp.status(),
        web_error,
        client_status_and_error.as_ref(),
    );

    let mut resp = match client_status_and_error {
        Some((status, client_error)) => {
            let client_error_body = json!({ "message": client_error.to_string() });
            let mut err_resp = (status, Json(client_error_body)).into_response();
            // The propagated request id was set on the replaced response.
            if let Some(req_id) = req_id {
                err_resp.headers_mut().insert(REQUEST_ID_HEADER, req_id);
            }
            err_resp
        }
        None => resp,
    };

    resp.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        app_state.allow_origin.clone(),
    );

    resp
}
