pub mod moltbook;

pub use moltbook::{MoltbookApi, MoltbookClient};
