//! HTTP surface: REST handlers, OpenAPI document, and router composition.
//!
//! REST endpoints are mounted under `/api/v1`; `/health` and the
//! WebSocket upgrade routes sit at the root. Every other path answers
//! `200 Room relay ready`.

pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::room::RoomStats;

/// OpenAPI description of the REST endpoints.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "room-relay", description = "WebSocket presence relay"),
    paths(
        handlers::system::health_handler,
        handlers::rooms::list_rooms,
        handlers::rooms::get_room,
    ),
    components(schemas(handlers::system::HealthResponse, RoomStats)),
    tags(
        (name = "System", description = "Liveness and readiness"),
        (name = "Rooms", description = "Room inspection"),
    )
)]
pub struct ApiDoc;

/// Builds the complete router: REST, WebSocket, docs, and fallback.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
        .merge(crate::ws::routes())
        .fallback(handlers::system::ready_handler);
    with_docs(router)
}

/// Serves Swagger UI at `/swagger-ui` and the document at
/// `/api-docs/openapi.json`.
#[cfg(feature = "swagger-ui")]
fn with_docs(router: Router<AppState>) -> Router<AppState> {
    router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
}

/// Serves only the raw document at `/api-docs/openapi.json`.
#[cfg(not(feature = "swagger-ui"))]
fn with_docs(router: Router<AppState>) -> Router<AppState> {
    router.route(
        "/api-docs/openapi.json",
        axum::routing::get(|| async { axum::Json(ApiDoc::openapi()) }),
    )
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::config::RelayConfig;

    fn app() -> Router {
        build_router().with_state(AppState::new(RelayConfig::default()))
    }

    async fn body_text(response: axum::response::Response) -> String {
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), 64 * 1024).await else {
            panic!("body should be readable");
        };
        String::from_utf8_lossy(&bytes).into_owned()
    }

    fn get(uri: &str) -> Request<Body> {
        let Ok(request) = Request::builder().uri(uri).body(Body::empty()) else {
            panic!("valid request");
        };
        request
    }

    #[tokio::test]
    async fn plain_get_on_ws_path_is_426() {
        let Ok(response) = app().oneshot(get("/ws")).await;
        assert_eq!(response.status(), StatusCode::UPGRADE_REQUIRED);
        assert!(body_text(response).await.contains("Expected protocol upgrade"));
    }

    #[tokio::test]
    async fn plain_post_on_room_ws_path_is_426() {
        let Ok(request) = Request::builder()
            .method("POST")
            .uri("/rooms/lobby/ws")
            .body(Body::empty())
        else {
            panic!("valid request");
        };
        let Ok(response) = app().oneshot(request).await;
        assert_eq!(response.status(), StatusCode::UPGRADE_REQUIRED);
    }

    #[tokio::test]
    async fn unknown_path_reports_ready() {
        let Ok(response) = app().oneshot(get("/anything/else")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, handlers::system::READY_BODY);
    }

    #[tokio::test]
    async fn health_reports_no_rooms_initially() {
        let Ok(response) = app().oneshot(get("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let Ok(body) = serde_json::from_str::<serde_json::Value>(&body_text(response).await)
        else {
            panic!("health body is json");
        };
        assert_eq!(body.get("status"), Some(&serde_json::json!("healthy")));
        assert_eq!(body.get("rooms"), Some(&serde_json::json!(0)));
    }

    #[tokio::test]
    async fn unknown_room_is_404_and_bad_name_is_400() {
        let Ok(response) = app().oneshot(get("/api/v1/rooms/nobody-here")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let Ok(response) = app().oneshot(get("/api/v1/rooms/bad%20name")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn room_list_is_empty_initially() {
        let Ok(response) = app().oneshot(get("/api/v1/rooms")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "[]");
    }
}
