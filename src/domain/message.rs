/// メッセージのドメインモデル
///
/// 永続化されるメッセージレコードと、POSTで受け付ける入力形を定義する。
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// 作成日時の文字列フォーマット（YYYYMMDDHHMMSS）
pub const DATE_FORMAT: &str = "%Y%m%d%H%M%S";

/// 永続化されるメッセージレコード
///
/// 識別子と作成日時はサーバー側で付与され、作成後に変更されない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// 27文字のKSUID
    pub ksuid: String,
    /// 投稿者
    pub user: String,
    /// 本文
    pub message: String,
    /// 作成日時（YYYYMMDDHHMMSS）
    pub date: String,
}

impl Message {
    /// 入力から新しいメッセージを作成
    ///
    /// 識別子と作成日時は呼び出し側から与える。
    pub fn create(input: PostMessage, ksuid: String, created_at: DateTime<Utc>) -> Self {
        Self {
            ksuid,
            user: input.user,
            message: input.message,
            date: format_date(created_at),
        }
    }

    /// 作成済みメッセージを参照するLocationヘッダー値
    pub fn location(&self) -> String {
        format!("/messages?Ksuid={}", self.ksuid)
    }
}

/// POSTリクエストボディの入力形
///
/// 欠落したフィールドは空文字列として扱い、未知のフィールドは無視する。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostMessage {
    pub user: String,
    pub message: String,
}

/// 入力検証のエラー型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageValidationError {
    #[error("user must not be empty")]
    EmptyUser,

    #[error("message must not be empty")]
    EmptyMessage,
}

/// POSTボディのパースエラー型
#[derive(Debug, Error)]
pub enum PostMessageParseError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Field {0} must be a string")]
    InvalidField(String),
}

impl PostMessage {
    /// JSON文字列からパース
    ///
    /// - オブジェクト以外（配列・文字列・数値など）は拒否する
    /// - `null`は空の入力として扱う（後段の必須チェックで弾かれる）
    /// - キーは大文字小文字を区別せずに照合し、重複キーは後の値が優先される
    /// - フィールド値の`null`は無視する
    pub fn from_json(json: &str) -> Result<Self, PostMessageParseError> {
        let fields = match serde_json::from_str::<Value>(json)? {
            Value::Null => return Ok(Self::default()),
            Value::Object(fields) => fields,
            _ => return Err(PostMessageParseError::NotAnObject),
        };

        let mut input = Self::default();

        for (key, value) in fields {
            let target = if key.eq_ignore_ascii_case("user") {
                &mut input.user
            } else if key.eq_ignore_ascii_case("message") {
                &mut input.message
            } else {
                continue;
            };

            match value {
                Value::String(text) => *target = text,
                Value::Null => {}
                _ => return Err(PostMessageParseError::InvalidField(key)),
            }
        }

        Ok(input)
    }

    /// 必須フィールドが空でないことを検証
    pub fn validate(&self) -> Result<(), MessageValidationError> {
        if self.user.is_empty() {
            return Err(MessageValidationError::EmptyUser);
        }
        if self.message.is_empty() {
            return Err(MessageValidationError::EmptyMessage);
        }
        Ok(())
    }
}

/// 作成日時をYYYYMMDDHHMMSS形式に整形
pub fn format_date(at: DateTime<Utc>) -> String {
    at.format(DATE_FORMAT).to_string()
}
