#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, Response, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt;

use sentinel_comments::{
    app::{build_application, Application},
    config::Config,
};

pub const USER_HEADER: &str = "x-remote-user";

pub async fn spawn_app() -> Application {
    build_application(Config::for_tests())
        .await
        .expect("application should start")
}

fn request(method: Method, uri: &str, user: Option<i64>, body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method.clone()).uri(uri);
    if let Some(user) = user {
        builder = builder.header(USER_HEADER, user.to_string());
    }
    if method == Method::POST {
        builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    }
    builder.body(body).expect("valid request")
}

pub async fn send(app: &Application, req: Request<Body>) -> Response<Body> {
    app.router.clone().oneshot(req).await.expect("infallible router")
}

pub async fn get(app: &Application, uri: &str, user: Option<i64>) -> Response<Body> {
    send(app, request(Method::GET, uri, user, Body::empty())).await
}

pub async fn post_form(
    app: &Application,
    uri: &str,
    user: Option<i64>,
    form: &str,
) -> Response<Body> {
    send(app, request(Method::POST, uri, user, Body::from(form.to_string()))).await
}

pub async fn delete(app: &Application, uri: &str, user: Option<i64>) -> Response<Body> {
    send(app, request(Method::DELETE, uri, user, Body::empty())).await
}

pub async fn json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub async fn json_ok(response: Response<Body>) -> Value {
    assert_eq!(response.status(), StatusCode::OK);
    json(response).await
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("location header")
}

/// Create a comment as `user` through the HTTP surface and return its id.
pub async fn create_comment(
    app: &Application,
    submission_url: &str,
    user: i64,
    form: &str,
) -> String {
    let body = json_ok(post_form(app, submission_url, Some(user), form).await).await;
    body["inserted"]["comment"]["id"]
        .as_str()
        .expect("comment id")
        .to_string()
}
