//! CLI command implementations.

mod config;
mod doctor;
mod list;
mod summarize;

pub use config::run_config;
pub use doctor::run_doctor;
pub use list::run_list;
pub use summarize::run_summarize;
