pub mod actions;
pub mod llm;
pub mod moltbook;
