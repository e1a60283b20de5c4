use axum::Router;
use axum::body::Body;
use axum::extract::Extension;
use axum::http::{Request, StatusCode};
use axum::middleware;
use axum::routing::get;
use tower::ServiceExt;

use diktat::infrastructure::observability::{REQUEST_ID_HEADER, RequestId, request_id_middleware};

async fn echo(Extension(id): Extension<RequestId>) -> String {
    id.0
}

fn app() -> Router {
    Router::new()
        .route("/echo", get(echo))
        .layer(middleware::from_fn(request_id_middleware))
}

#[tokio::test]
async fn given_incoming_request_id_when_handled_then_it_is_propagated_and_echoed() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/echo")
                .header(REQUEST_ID_HEADER, "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-42");
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"req-42");
}

#[tokio::test]
async fn given_no_request_id_when_handled_then_a_uuid_is_minted() {
    let response = app()
        .oneshot(Request::builder().uri("/echo").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let minted = response.headers()[REQUEST_ID_HEADER].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(minted).is_ok());
}

#[tokio::test]
async fn given_blank_request_id_when_handled_then_it_is_replaced() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/echo")
                .header(REQUEST_ID_HEADER, "  ")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let minted = response.headers()[REQUEST_ID_HEADER].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(minted).is_ok());
}
