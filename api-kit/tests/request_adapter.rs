mod common;

use api_kit::{ApiConfig, ApiEndpoint, ParamType, RouteTable};
use axum::http::StatusCode;
use axum::Router;
use pretty_assertions::assert_eq;
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use common::{get, post_json, send};

#[derive(Serialize, ToSchema)]
struct Echo {
    num: i64,
    opt_num: Option<i64>,
}

fn echo_router() -> Router {
    let endpoint = ApiEndpoint::get("echo_params")
        .query_param("num", ParamType::Int)
        .optional_query_param("opt_num", ParamType::Int)
        .handler(|req| async move {
            Ok(Echo {
                num: req.int("num").unwrap_or(0),
                opt_num: req.int("opt_num"),
            })
        });
    RouteTable::new()
        .route("echo", endpoint)
        .into_router(&ApiConfig::default())
        .unwrap()
}

#[tokio::test]
async fn numeric_query_param_reaches_the_handler() {
    let (status, body) = send(echo_router(), get("/echo?num=5")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"num": 5, "opt_num": null}));
}

#[tokio::test]
async fn non_numeric_query_param_is_a_400() {
    let (status, body) = send(echo_router(), get("/echo?num=abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"], json!(["num must be an integer"]));
    assert_eq!(body["field_errors"]["num"]["code"], json!("invalid"));
}

#[tokio::test]
async fn missing_required_query_param_is_a_400() {
    let (status, body) = send(echo_router(), get("/echo")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"], json!(["Query parameter num must be specified"]));
    assert_eq!(body["field_errors"]["num"]["code"], json!("required"));
}

#[tokio::test]
async fn underscored_params_are_read_from_dashed_names() {
    let (status, body) = send(echo_router(), get("/echo?num=2&opt-num=7")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"num": 2, "opt_num": 7}));
}

#[tokio::test]
async fn all_failures_are_reported_at_once() {
    let endpoint = ApiEndpoint::get("multi")
        .query_param("a", ParamType::Int)
        .query_param("b", ParamType::Bool)
        .handler(|_req| async { Ok(0i64) });
    let app = RouteTable::new()
        .route("multi", endpoint)
        .into_router(&ApiConfig::default())
        .unwrap();

    let (status, body) = send(app, get("/multi?a=x&b=maybe")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["errors"],
        json!(["a must be an integer", "b must be a boolean"])
    );
}

#[tokio::test]
async fn date_params_are_decoded() {
    let endpoint = ApiEndpoint::get("since")
        .optional_query_param("since", ParamType::Date)
        .handler(|req| async move { Ok(req.date("since").map(|d| d.to_string())) });
    let app = RouteTable::new()
        .route("since", endpoint)
        .into_router(&ApiConfig::default())
        .unwrap();

    let (status, body) = send(app.clone(), get("/since?since=2024-05-01")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("2024-05-01"));

    let (status, _body) = send(app, get("/since?since=05/01/2024")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[derive(Serialize, ToSchema)]
struct Sum {
    sum: i64,
}

fn sum_router() -> Router {
    let endpoint = ApiEndpoint::post("sum_numbers")
        .body::<Vec<i64>>()
        .handler(|req| async move {
            let numbers: Vec<i64> = req.body()?;
            Ok(Sum {
                sum: numbers.iter().sum(),
            })
        });
    RouteTable::new()
        .route("sum", endpoint)
        .into_router(&ApiConfig::default())
        .unwrap()
}

#[tokio::test]
async fn list_of_integers_body_reaches_the_handler() {
    let (status, body) = send(sum_router(), post_json("/sum", "[1,2,3]")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"sum": 6}));
}

#[tokio::test]
async fn mistyped_body_is_a_400() {
    let (status, body) = send(sum_router(), post_json("/sum", "[\"a\"]")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"][0].as_str().unwrap().starts_with("body:"));
}

#[tokio::test]
async fn unparseable_body_is_invalid_json() {
    let (status, body) = send(sum_router(), post_json("/sum", "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"], json!(["Invalid JSON"]));
}

#[tokio::test]
async fn path_params_are_passed_through_as_strings() {
    let endpoint = ApiEndpoint::get("show_id")
        .handler(|req| async move { Ok(req.path_param("id").map(String::from)) });
    let app = RouteTable::new()
        .route("notes/{id:int}", endpoint)
        .into_router(&ApiConfig::default())
        .unwrap();

    let (status, body) = send(app, get("/notes/7")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("7"));
}
