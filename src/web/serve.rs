use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderName, Request, Response},
    middleware, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{MakeSpan, OnRequest, OnResponse, TraceLayer},
};
use tracing::Span;

use super::{midware, routes::routes, REQUEST_ID_HEADER};
use crate::{App, AppState};

/// Serves the application on the listener held by `App` until the server stops.
///
/// Might return an IO error from `axum::serve`.
pub async fn serve(app: App) -> std::io::Result<()> {
    let App {
        app_state,
        listener,
    } = app;

    axum::serve(listener, router(app_state)).await
}

/// All routes wrapped in the middleware stack.
///
/// Requests pass the layers top to bottom, responses bottom to top:
/// the request id is propagated to the response before the response mapper runs,
/// so the mapper can log it and copy it onto the error responses it builds.
pub fn router(app_state: AppState) -> Router {
    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new().merge(routes(app_state.clone())).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(
                x_request_id.clone(),
                MakeRequestUuid,
            ))
            .layer(build_trace_layer())
            .layer(middleware::map_response_with_state(
                app_state,
                midware::response_mapper,
            ))
            .layer(PropagateRequestIdLayer::new(x_request_id)),
    )
}

/// Console logging for every request: one span per request plus START and END lines.
fn build_trace_layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    impl MakeSpan<Body> + Clone,
    impl OnRequest<Body> + Clone,
    impl OnResponse<Body> + Clone,
> {
    TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            let req_id = req
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|id| id.to_str().ok())
                .unwrap_or_default()
                .to_string();

            tracing::error_span!(
                "request",
                id = %req_id,
                method = %req.method(),
                path = req.uri().path()
            )
        })
        .on_request(|req: &Request<Body>, _s: &Span| tracing::info!("START @ {}", req.uri()))
        .on_response(|res: &Response<Body>, latency: Duration, _s: &Span| {
            let status = res.status();

            if status.is_client_error() || status.is_server_error() {
                tracing::warn!("END in: {latency:?} - STATUS: {}", status.as_u16())
            } else {
                tracing::info!("END in: {latency:?} - STATUS: {}", status.as_u16())
            }
        })
}
