// メッセージリソースのHTTPハンドラー
//
// HTTPメソッドでGET/POSTを振り分け、入力検証・ストア操作・
// エラーからステータスコードへの変換を行う。

use chrono::Utc;
use lambda_http::http::{HeaderValue, Method, StatusCode};
use lambda_http::{Body, Request, RequestExt, Response};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::http_response::{client_error, created, json_ok, server_error};
use crate::domain::{has_ksuid_suffix, new_ksuid, Message, MessageValidationError, PostMessage};
use crate::infrastructure::{MessageRepository, RepositoryError};

/// GETで識別子を受け取るクエリパラメータ名
pub const KSUID_PARAM: &str = "ksuid";

/// メッセージハンドラーのエラー型
#[derive(Debug, Error)]
pub enum MessageHandlerError {
    /// GET/POST以外のメソッド
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// 識別子が末尾27文字の単語文字になっていない
    #[error("Invalid ksuid: {0:?}")]
    InvalidKsuid(String),

    /// リクエストボディがJSONとして解釈できない
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    /// 必須フィールドが空
    #[error("Invalid message: {0}")]
    Validation(#[from] MessageValidationError),

    /// 該当するメッセージがない
    #[error("Message not found: {0}")]
    NotFound(String),

    /// ストア操作に失敗
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// レスポンスJSONの生成に失敗
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Locationヘッダー値の生成に失敗
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}

impl MessageHandlerError {
    /// サーバー側の失敗かどうか
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Repository(_) | Self::Serialization(_) | Self::InvalidHeader(_)
        )
    }

    /// レスポンスのステータスコード
    ///
    /// サーバー側の失敗も400として返す。
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidKsuid(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::MalformedBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Repository(_) | Self::Serialization(_) | Self::InvalidHeader(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }

    /// エラーをHTTPレスポンスに変換
    pub fn into_response(self) -> Response<Body> {
        if self.is_server_error() {
            server_error(&self)
        } else {
            client_error(self.status())
        }
    }
}

/// メッセージリソースへのリクエストを処理するハンドラー
///
/// リクエスト間で状態を持たず、ストアへの参照のみを保持する。
pub struct MessageHandler<MR>
where
    MR: MessageRepository,
{
    /// メッセージリポジトリ
    message_repo: MR,
}

impl<MR> MessageHandler<MR>
where
    MR: MessageRepository,
{
    /// 新しいMessageHandlerを作成
    pub fn new(message_repo: MR) -> Self {
        Self { message_repo }
    }

    /// HTTPメソッドでリクエストを振り分ける
    ///
    /// GETは取得、POSTは作成、その他は405を返す。
    pub async fn handle(&self, request: Request) -> Response<Body> {
        let method = request.method().clone();

        let result = match method {
            Method::GET => self.get(&request).await,
            Method::POST => self.create(&request).await,
            _ => Err(MessageHandlerError::MethodNotAllowed(method.to_string())),
        };

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                if !err.is_server_error() {
                    debug!(method = %method, error = %err, "クライアントエラー");
                }
                err.into_response()
            }
        };

        info!(
            method = %method,
            status = response.status().as_u16(),
            "レスポンス送信"
        );

        response
    }

    /// GET: クエリパラメータの識別子でメッセージを取得し、JSONで返す
    pub async fn get(&self, request: &Request) -> Result<Response<Body>, MessageHandlerError> {
        let params = request.query_string_parameters();
        let ksuid = params.first(KSUID_PARAM).unwrap_or_default();

        let message = self.fetch_message(ksuid).await?;

        let json = serde_json::to_string(&message)
            .map_err(|e| MessageHandlerError::Serialization(e.to_string()))?;

        Ok(json_ok(json))
    }

    /// POST: ボディからメッセージを作成して保存し、Locationを返す
    pub async fn create(&self, request: &Request) -> Result<Response<Body>, MessageHandlerError> {
        let message = self.create_message(request.body().as_ref()).await?;

        let location = HeaderValue::from_str(&message.location())
            .map_err(|e| MessageHandlerError::InvalidHeader(e.to_string()))?;

        Ok(created(location))
    }

    /// 識別子を検証してストアから取得
    ///
    /// 形式が不正な場合はストアに問い合わせない。
    pub async fn fetch_message(&self, ksuid: &str) -> Result<Message, MessageHandlerError> {
        if !has_ksuid_suffix(ksuid) {
            return Err(MessageHandlerError::InvalidKsuid(ksuid.to_string()));
        }

        match self.message_repo.fetch(ksuid).await {
            Ok(Some(message)) => Ok(message),
            Ok(None) => Err(MessageHandlerError::NotFound(ksuid.to_string())),
            Err(err) => {
                warn!(ksuid = ksuid, error = %err, "メッセージ取得失敗");
                Err(err.into())
            }
        }
    }

    /// ボディをパース・検証し、識別子と作成日時を付与して保存
    pub async fn create_message(&self, body: &[u8]) -> Result<Message, MessageHandlerError> {
        let text = std::str::from_utf8(body)
            .map_err(|e| MessageHandlerError::MalformedBody(e.to_string()))?;

        let input = PostMessage::from_json(text)
            .map_err(|e| MessageHandlerError::MalformedBody(e.to_string()))?;

        input.validate()?;

        let message = Message::create(input, new_ksuid(), Utc::now());

        if let Err(err) = self.message_repo.persist(&message).await {
            warn!(ksuid = %message.ksuid, error = %err, "メッセージ保存失敗");
            return Err(err.into());
        }

        info!(ksuid = %message.ksuid, "メッセージ作成");

        Ok(message)
    }
}
