// HTTPレスポンス生成ヘルパー
//
// クライアントエラー・サーバーエラー・JSONレスポンスを組み立てる。
// ボディはステータスの標準理由句（例: "Not Found"）とする。

use lambda_http::http::header::{CONTENT_TYPE, LOCATION};
use lambda_http::http::{HeaderValue, StatusCode};
use lambda_http::{Body, Response};
use tracing::error;

/// 指定ステータスと理由句ボディのレスポンスを生成
pub fn client_error(status: StatusCode) -> Response<Body> {
    let reason = status.canonical_reason().unwrap_or_default();

    let mut response = Response::new(Body::from(reason));
    *response.status_mut() = status;
    response
}

/// サーバー側の失敗をログに残してレスポンスを生成
///
/// ステータスは400を返す。
pub fn server_error(err: &dyn std::error::Error) -> Response<Body> {
    error!(error = %err, "サーバーエラー");
    client_error(StatusCode::BAD_REQUEST)
}

/// JSONボディ付きの200レスポンスを生成
pub fn json_ok(json: String) -> Response<Body> {
    let mut response = Response::new(Body::Text(json));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

/// Locationヘッダー付き、空ボディの201レスポンスを生成
pub fn created(location: HeaderValue) -> Response<Body> {
    let mut response = Response::new(Body::Empty);
    *response.status_mut() = StatusCode::CREATED;
    response.headers_mut().insert(LOCATION, location);
    response
}
