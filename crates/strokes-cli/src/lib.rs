#![forbid(unsafe_code)]

pub mod cli;
pub mod error;
pub mod inspect;
pub mod logging;
pub mod replay;

pub use cli::run_from_env;
pub use error::{CliError, Result};
