// Utilities shared by the facade and the adapters
pub mod error;
pub mod path;
