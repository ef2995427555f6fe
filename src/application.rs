// アプリケーション層モジュール
pub mod audit_context;
pub mod insert_handler;

// 再エクスポート
pub use audit_context::AuditContext;
pub use insert_handler::{InsertHandler, InsertHandlerError};
