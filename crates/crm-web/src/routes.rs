use crate::{
    application::dashboard,
    customer::{api, form},
    error::{ApiError, ErrorKind},
    AppState,
};
use axum::{
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::any::Any;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

pub fn setup(app_state: AppState) -> axum::routing::Router {
    axum::Router::new()
        .route("/", get(dashboard::get))
        .route("/customers/new", get(form::get).post(form::post))
        .route("/api/customers", post(api::create))
        .fallback(fallback)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

pub async fn fallback(uri: axum::http::Uri) -> impl IntoResponse {
    ApiError::new(ErrorKind::NotFound).with_log(uri)
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else {
        "unknown panic payload"
    };
    ApiError::internal(format!("handler panicked: {detail}"))
        .with_message(api::INTERNAL_SERVER_ERROR)
        .into_response()
}
