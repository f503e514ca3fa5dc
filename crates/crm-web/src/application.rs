use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

pub mod dashboard {
    use super::*;

    #[derive(Template)]
    #[template(path = "dashboard.html")]
    pub struct DashboardTemplate;

    pub async fn get() -> Response {
        match DashboardTemplate.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => {
                tracing::error!("Rendering dashboard: {err}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
