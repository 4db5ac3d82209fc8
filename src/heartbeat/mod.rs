pub mod service;

pub use service::HeartbeatService;
