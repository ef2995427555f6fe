// Domain layer modules
pub mod movie;

// Re-exports
pub use movie::{Movie, MovieParseError};
