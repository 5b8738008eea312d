//! End-to-end test driving the whole surface through the umbrella crate:
//! declaration, matching, dispatch, fallback responses and the generated
//! document.

use futures_executor::block_on;
use waypoint::prelude::*;
use waypoint::{not_found_response, ResponseBody};

fn api() -> Router {
    let items = Router::builder()
        .route(
            Route::get(Pattern::root().literal("items").capture::<i64>("id"))
                .summary("Fetch one item")
                .tag("items")
                .bind1(|id: i64| async move { Response::ok().body_text(format!("#{id}")) })
                .unwrap(),
        )
        .route(
            Route::get(Pattern::parse("/items").unwrap())
                .guard(OptionalQuery::<u32>::new("limit"))
                .tag("items")
                .bind1(|limit: Option<u32>| async move {
                    Response::ok().body_text(format!("limit={}", limit.unwrap_or(20)))
                })
                .unwrap(),
        );

    Router::builder()
        .route(
            Route::get(Pattern::parse("/health").unwrap())
                .bind0(|| async { Response::ok() })
                .unwrap(),
        )
        .include_with_prefix("/api/v1", items)
        .unwrap()
        .build()
}

fn body_text(response: Response) -> String {
    let (_, _, body) = response.into_parts();
    match body {
        ResponseBody::Bytes(bytes) => String::from_utf8(bytes).unwrap(),
        ResponseBody::Empty => String::new(),
    }
}

#[test]
fn test_request_lifecycle() {
    let router = api();

    let parts = RequestParts::new(Method::Get, "/api/v1/items/42");
    let response = block_on(router.handle(&parts).expect("route is defined"));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response), "#42");

    let parts = RequestParts::new(Method::Get, "/api/v1/items?limit=5");
    let response = block_on(router.handle(&parts).expect("route is defined"));
    assert_eq!(body_text(response), "limit=5");

    let parts = RequestParts::new(Method::Get, "/api/v1/items");
    let response = block_on(router.handle(&parts).expect("route is defined"));
    assert_eq!(body_text(response), "limit=20");
}

#[test]
fn test_embedder_owns_not_found() {
    let router = api();
    let parts = RequestParts::new(Method::Get, "/api/v2/items");
    assert!(router.handle(&parts).is_none(), "foreign path is not handled");

    let fallback = not_found_response();
    assert_eq!(fallback.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_bad_input_is_answered_not_disowned() {
    let router = api();
    let parts = RequestParts::new(Method::Get, "/api/v1/items/oops");
    let response = block_on(router.handle(&parts).expect("parse failures are answered"));
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn test_allowed_methods_probe() {
    let router = api();
    let allowed = router.allowed_methods("/api/v1/items");
    assert_eq!(allowed.header_value(), "GET, HEAD");
    assert!(router.allowed_methods("/nope").is_empty());
}

#[test]
fn test_generated_document_matches_declarations() {
    let router = api();
    let document = router.openapi_with("Demo API", "1.0.0", |builder| {
        builder.tag("items", "Item management")
    });
    let json = serde_json::to_value(&document).unwrap();

    assert!(json["paths"]["/health"]["get"].is_object());
    assert!(json["paths"]["/api/v1/items"]["get"].is_object());
    let operation = &json["paths"]["/api/v1/items/{id}"]["get"];
    assert_eq!(operation["operationId"], "get_api_v1_items_id");
    assert_eq!(operation["parameters"][0]["name"], "id");
    assert_eq!(json["tags"][0]["description"], "Item management");
}
