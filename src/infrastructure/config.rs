/// メッセージテーブルへの接続設定
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use thiserror::Error;

/// メッセージテーブル名を指定する環境変数
pub const MESSAGES_TABLE_ENV: &str = "MESSAGES_TABLE";

/// DynamoDBのリージョンを明示する環境変数（未設定時はAWSのデフォルト解決）
pub const MESSAGES_REGION_ENV: &str = "MESSAGES_REGION";

/// 設定読み込みのエラー型
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// テーブル名とクライアントを持つメッセージストア設定
///
/// プロセス起動時に一度だけ構築し、各リクエストのハンドラーから参照する。
#[derive(Debug, Clone)]
pub struct MessagesConfig {
    /// DynamoDBクライアントインスタンス
    client: DynamoDbClient,
    /// メッセージテーブル名
    table_name: String,
}

impl MessagesConfig {
    /// 環境変数からテーブル名とリージョンを読み込み、DynamoDBクライアントを構築
    ///
    /// 環境変数:
    /// - MESSAGES_TABLE: メッセージテーブル名（必須）
    /// - MESSAGES_REGION: リージョン（任意）
    /// - AWS認証情報: aws-configにより自動読み込み
    pub async fn from_env() -> Result<Self, ConfigError> {
        // テーブル名が無ければAWS設定を読みに行く前に失敗させる
        let table_name = read_env(MESSAGES_TABLE_ENV)
            .ok_or_else(|| ConfigError::MissingEnvVar(MESSAGES_TABLE_ENV.to_string()))?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = read_env(MESSAGES_REGION_ENV) {
            loader = loader.region(Region::new(region));
        }
        let aws_config = loader.load().await;

        Ok(Self {
            client: DynamoDbClient::new(&aws_config),
            table_name,
        })
    }

    /// 明示的な値で新しいMessagesConfigを作成（テスト用）
    #[cfg(test)]
    pub(crate) fn new(client: DynamoDbClient, table_name: String) -> Self {
        Self { client, table_name }
    }

    /// DynamoDBクライアントへの参照を取得
    pub fn client(&self) -> &DynamoDbClient {
        &self.client
    }

    /// メッセージテーブル名を取得
    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

/// 環境変数を読み込む（空白のみの値は未設定扱い）
fn read_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
