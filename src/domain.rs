// Domain layer modules
pub mod ksuid;
pub mod message;

// Re-exports
pub use ksuid::{has_ksuid_suffix, new_ksuid, KSUID_STRING_LENGTH};
pub use message::{
    format_date, Message, MessageValidationError, PostMessage, PostMessageParseError, DATE_FORMAT,
};
