mod common;

use api_kit::{ApiConfig, ApiEndpoint, MethodRouter, RouteTable};
use axum::http::{header, Method, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use common::{body_bytes, call, get, post_json, request, send};

#[derive(Serialize, ToSchema)]
struct Verb {
    verb: String,
}

fn verb_endpoint(method: Method) -> ApiEndpoint {
    let builder = match method {
        Method::GET => ApiEndpoint::get("get_thing"),
        Method::POST => ApiEndpoint::post("create_thing"),
        Method::DELETE => ApiEndpoint::delete("delete_thing"),
        other => panic!("unexpected method {other}"),
    };
    let verb = method.as_str().to_string();
    builder.handler(move |_req| {
        let verb = verb.clone();
        async move { Ok(Verb { verb }) }
    })
}

fn app(methods: MethodRouter) -> Router {
    RouteTable::new()
        .methods("things", methods)
        .into_router(&ApiConfig::default())
        .unwrap()
}

#[tokio::test]
async fn each_verb_dispatches_to_its_own_endpoint() {
    let methods = MethodRouter::builder()
        .route(verb_endpoint(Method::GET))
        .route(verb_endpoint(Method::POST))
        .build()
        .unwrap();
    let app = app(methods);

    let (status, body) = send(app.clone(), get("/things")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"verb": "GET"}));

    let (status, body) = send(app, post_json("/things", "{}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"verb": "POST"}));
}

#[tokio::test]
async fn unmapped_verb_is_a_405_with_allow() {
    let methods = MethodRouter::builder()
        .route(verb_endpoint(Method::GET))
        .build()
        .unwrap();
    let response = call(app(methods), post_json("/things", "{}")).await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()[header::ALLOW], "GET");
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn allow_header_lists_every_mapped_verb() {
    let methods = MethodRouter::builder()
        .route(verb_endpoint(Method::GET))
        .route(verb_endpoint(Method::POST))
        .route(verb_endpoint(Method::DELETE))
        .build()
        .unwrap();
    let response = call(app(methods), request("PATCH", "/things")).await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()[header::ALLOW], "DELETE, GET, POST");
}
