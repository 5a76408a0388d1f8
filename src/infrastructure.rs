// Infrastructure layer modules
pub mod config;
pub mod logging;
pub mod message_repository;

// Re-exports
pub use config::{ConfigError, MessagesConfig, MESSAGES_REGION_ENV, MESSAGES_TABLE_ENV};
pub use logging::init_logging;
pub use message_repository::{DynamoMessageRepository, MessageRepository, RepositoryError};
