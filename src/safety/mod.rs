pub mod sanitizer;

pub use sanitizer::{is_suspicious, sanitize, Sanitizer};
