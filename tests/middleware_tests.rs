//! Request ID and timing middleware

use std::time::Duration;

use actix_web::{App, HttpResponse, test, web};

use snaplink::api::middleware::{RequestId, RequestIdMiddleware, TimingMiddleware};

async fn echo_request_id(id: RequestId) -> HttpResponse {
    HttpResponse::Ok().body(id.0)
}

#[actix_web::test]
async fn test_generates_request_id() {
    let app = test::init_service(
        App::new()
            .wrap(RequestIdMiddleware)
            .route("/", web::get().to(echo_request_id)),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    let header = resp
        .headers()
        .get("x-request-id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let body = test::read_body(resp).await;

    assert_eq!(header.len(), 36);
    assert_eq!(body, header.as_bytes());
}

#[actix_web::test]
async fn test_reuses_well_formed_inbound_id() {
    let app = test::init_service(
        App::new()
            .wrap(RequestIdMiddleware)
            .route("/", web::get().to(echo_request_id)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/")
        .insert_header(("X-Request-ID", "edge-42_abc"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "edge-42_abc");

    let req = test::TestRequest::get()
        .uri("/")
        .insert_header(("X-Request-ID", "bad id; drop table"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_ne!(
        resp.headers().get("x-request-id").unwrap(),
        "bad id; drop table"
    );
}

#[actix_web::test]
async fn test_request_id_empty_without_middleware() {
    let app = test::init_service(App::new().route("/", web::get().to(echo_request_id))).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert!(!resp.headers().contains_key("x-request-id"));
    assert!(test::read_body(resp).await.is_empty());
}

#[actix_web::test]
async fn test_timing_passes_response_through() {
    let app = test::init_service(
        App::new()
            .wrap(TimingMiddleware::new(Duration::from_millis(1)))
            .route(
                "/slow",
                web::get().to(|| async {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    HttpResponse::Accepted().finish()
                }),
            ),
    )
    .await;

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/slow").to_request()).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::ACCEPTED);
}
