#![warn(clippy::pedantic)]
// Noisy doc/signature lints — would require annotating most pub functions
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
// Style preference — keeping format!("{}", x) over format!("{x}") for readability with complex exprs
#![allow(clippy::uninlined_format_args)]
// Intentional casts in budget/count handling
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]

pub mod agent;
pub mod client;
pub mod config;
pub mod errors;
pub mod heartbeat;
pub mod models;
pub mod prompts;
pub mod providers;
pub mod safety;
pub mod services;
pub mod state;
pub mod utils;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
