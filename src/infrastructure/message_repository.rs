/// DynamoDBでメッセージレコードを永続化するためのメッセージリポジトリ
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::domain::Message;

/// パーティションキーの属性名
pub const KEY_ATTRIBUTE: &str = "Ksuid";

/// リポジトリ操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RepositoryError {
    /// DynamoDBからの読み取りに失敗
    #[error("Read error: {0}")]
    ReadError(String),

    /// DynamoDBへの書き込みに失敗
    #[error("Write error: {0}")]
    WriteError(String),

    /// アイテムとメッセージ間の変換に失敗
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// メッセージ永続化用トレイト
///
/// キーによる取得と上書き保存の2操作のみを提供する。
/// 実際のDynamoDB実装とテスト用モックを差し替え可能にする。
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// KSUIDでメッセージを取得
    ///
    /// # 戻り値
    /// * 見つかった場合は`Ok(Some(Message))`
    /// * 見つからなかった場合は`Ok(None)`
    /// * 失敗時は`Err(RepositoryError)`
    async fn fetch(&self, ksuid: &str) -> Result<Option<Message>, RepositoryError>;

    /// メッセージを保存（同じKSUIDのアイテムは上書き）
    async fn persist(&self, message: &Message) -> Result<(), RepositoryError>;
}

/// テーブル上のアイテム表現
///
/// 属性名はPascalCase、すべて文字列型。欠落した属性は空文字列として読む。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct MessageItem {
    ksuid: String,
    message: String,
    user: String,
    date: String,
}

impl From<&Message> for MessageItem {
    fn from(message: &Message) -> Self {
        Self {
            ksuid: message.ksuid.clone(),
            message: message.message.clone(),
            user: message.user.clone(),
            date: message.date.clone(),
        }
    }
}

impl From<MessageItem> for Message {
    fn from(item: MessageItem) -> Self {
        Self {
            ksuid: item.ksuid,
            user: item.user,
            message: item.message,
            date: item.date,
        }
    }
}

/// メッセージをDynamoDBアイテムに変換
pub fn message_to_item(
    message: &Message,
) -> Result<HashMap<String, AttributeValue>, RepositoryError> {
    serde_dynamo::to_item(MessageItem::from(message))
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

/// DynamoDBアイテムをメッセージに変換
pub fn item_to_message(item: HashMap<String, AttributeValue>) -> Result<Message, RepositoryError> {
    let item: MessageItem = serde_dynamo::from_item(item)
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;
    Ok(item.into())
}

/// MessageRepositoryのDynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoMessageRepository {
    /// DynamoDBクライアント
    client: DynamoDbClient,
    /// メッセージテーブル名
    table_name: String,
}

impl DynamoMessageRepository {
    /// 新しいDynamoMessageRepositoryを作成
    ///
    /// # 引数
    /// * `client` - DynamoDBクライアント
    /// * `table_name` - メッセージテーブルの名前
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        Self { client, table_name }
    }
}

#[async_trait]
impl MessageRepository for DynamoMessageRepository {
    async fn fetch(&self, ksuid: &str) -> Result<Option<Message>, RepositoryError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(KEY_ATTRIBUTE, AttributeValue::S(ksuid.to_string()))
            .send()
            .await
            .map_err(|e| RepositoryError::ReadError(DisplayErrorContext(&e).to_string()))?;

        match result.item {
            Some(item) => {
                trace!(ksuid = ksuid, "アイテム取得成功");
                item_to_message(item).map(Some)
            }
            None => {
                trace!(ksuid = ksuid, "アイテムなし");
                Ok(None)
            }
        }
    }

    async fn persist(&self, message: &Message) -> Result<(), RepositoryError> {
        let item = message_to_item(message)?;

        // 条件式なしのPutItem（既存アイテムは上書き）
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(DisplayErrorContext(&e).to_string()))?;

        trace!(ksuid = %message.ksuid, "アイテム保存成功");

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn sample_message() -> Message {
        Message {
            ksuid: "0ujtsYcgvSTl8PAuAdqWYSMnLOv".to_string(),
            user: "alice".to_string(),
            message: "hello".to_string(),
            date: "20240101123456".to_string(),
        }
    }

    // ==================== エラー型 ====================

    #[test]
    fn test_repository_error_display() {
        assert_eq!(
            RepositoryError::ReadError("timeout".to_string()).to_string(),
            "Read error: timeout"
        );
        assert_eq!(
            RepositoryError::WriteError("throttled".to_string()).to_string(),
            "Write error: throttled"
        );
        assert_eq!(
            RepositoryError::SerializationError("bad item".to_string()).to_string(),
            "Serialization error: bad item"
        );
    }

    // ==================== アイテム変換 ====================

    #[test]
    fn test_message_to_item_uses_string_attributes() {
        let item = message_to_item(&sample_message()).unwrap();

        assert_eq!(item.len(), 4);
        assert_eq!(
            item.get("Ksuid"),
            Some(&AttributeValue::S("0ujtsYcgvSTl8PAuAdqWYSMnLOv".to_string()))
        );
        assert_eq!(item.get("User"), Some(&AttributeValue::S("alice".to_string())));
        assert_eq!(item.get("Message"), Some(&AttributeValue::S("hello".to_string())));
        assert_eq!(
            item.get("Date"),
            Some(&AttributeValue::S("20240101123456".to_string()))
        );
    }

    #[test]
    fn test_item_to_message_reads_all_fields() {
        let item = message_to_item(&sample_message()).unwrap();
        let message = item_to_message(item).unwrap();

        assert_eq!(message, sample_message());
    }

    #[test]
    fn test_item_to_message_missing_attribute_is_empty() {
        let mut item = HashMap::new();
        item.insert(
            "Ksuid".to_string(),
            AttributeValue::S("0ujtsYcgvSTl8PAuAdqWYSMnLOv".to_string()),
        );
        item.insert("User".to_string(), AttributeValue::S("alice".to_string()));

        let message = item_to_message(item).unwrap();

        assert_eq!(message.user, "alice");
        assert_eq!(message.message, "");
        assert_eq!(message.date, "");
    }

    #[test]
    fn test_item_to_message_rejects_non_string_attribute() {
        let mut item = HashMap::new();
        item.insert(
            "Ksuid".to_string(),
            AttributeValue::S("0ujtsYcgvSTl8PAuAdqWYSMnLOv".to_string()),
        );
        item.insert("User".to_string(), AttributeValue::Bool(true));

        let result = item_to_message(item);

        assert!(matches!(result, Err(RepositoryError::SerializationError(_))));
    }

    // ==================== モック ====================

    /// ユニットテスト用のモックMessageRepository
    #[derive(Debug, Clone, Default)]
    pub struct MockMessageRepository {
        /// 保存されたメッセージ: ksuid -> Message
        messages: Arc<Mutex<HashMap<String, Message>>>,
        /// 次の操作で返すエラー（エラーパスのテスト用）
        next_error: Arc<Mutex<Option<RepositoryError>>>,
        /// fetch呼び出し回数
        fetch_calls: Arc<Mutex<usize>>,
        /// persist呼び出し回数
        persist_calls: Arc<Mutex<usize>>,
    }

    impl MockMessageRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_next_error(&self, error: RepositoryError) {
            *self.next_error.lock().unwrap() = Some(error);
        }

        pub fn insert(&self, message: Message) {
            self.messages
                .lock()
                .unwrap()
                .insert(message.ksuid.clone(), message);
        }

        pub fn get_message(&self, ksuid: &str) -> Option<Message> {
            self.messages.lock().unwrap().get(ksuid).cloned()
        }

        pub fn message_count(&self) -> usize {
            self.messages.lock().unwrap().len()
        }

        pub fn fetch_calls(&self) -> usize {
            *self.fetch_calls.lock().unwrap()
        }

        pub fn persist_calls(&self) -> usize {
            *self.persist_calls.lock().unwrap()
        }

        fn take_error(&self) -> Option<RepositoryError> {
            self.next_error.lock().unwrap().take()
        }
    }

    #[async_trait]
    impl MessageRepository for MockMessageRepository {
        async fn fetch(&self, ksuid: &str) -> Result<Option<Message>, RepositoryError> {
            *self.fetch_calls.lock().unwrap() += 1;

            if let Some(error) = self.take_error() {
                return Err(error);
            }

            Ok(self.messages.lock().unwrap().get(ksuid).cloned())
        }

        async fn persist(&self, message: &Message) -> Result<(), RepositoryError> {
            *self.persist_calls.lock().unwrap() += 1;

            if let Some(error) = self.take_error() {
                return Err(error);
            }

            self.insert(message.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_mock_repo_persist_then_fetch() {
        let repo = MockMessageRepository::new();
        let message = sample_message();

        repo.persist(&message).await.unwrap();
        let fetched = repo.fetch(&message.ksuid).await.unwrap();

        assert_eq!(fetched, Some(message));
        assert_eq!(repo.persist_calls(), 1);
        assert_eq!(repo.fetch_calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_repo_fetch_missing_returns_none() {
        let repo = MockMessageRepository::new();

        let fetched = repo.fetch("0ujtsYcgvSTl8PAuAdqWYSMnLOv").await.unwrap();

        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn test_mock_repo_persist_overwrites() {
        let repo = MockMessageRepository::new();
        let mut message = sample_message();
        repo.persist(&message).await.unwrap();

        message.message = "updated".to_string();
        repo.persist(&message).await.unwrap();

        assert_eq!(repo.message_count(), 1);
        assert_eq!(repo.get_message(&message.ksuid).unwrap().message, "updated");
    }

    #[tokio::test]
    async fn test_mock_repo_error_injection() {
        let repo = MockMessageRepository::new();
        repo.set_next_error(RepositoryError::WriteError("boom".to_string()));

        let result = repo.persist(&sample_message()).await;

        assert_eq!(result, Err(RepositoryError::WriteError("boom".to_string())));
        assert_eq!(repo.message_count(), 0);

        // エラーは一度だけ返される
        assert!(repo.persist(&sample_message()).await.is_ok());
    }
}
