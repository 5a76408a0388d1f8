// アプリケーション層モジュール
pub mod http_response;
pub mod message_handler;

// 再エクスポート
pub use http_response::{client_error, server_error};
pub use message_handler::{MessageHandler, MessageHandlerError, KSUID_PARAM};
