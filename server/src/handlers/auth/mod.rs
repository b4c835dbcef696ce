pub mod firebase_handlers;

pub use firebase_handlers::{auth_status, validate_session_token, verify_firebase_token};
