pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{Cli, Environment, ServiceConfig};
pub use crate::core::{RekognizerService, ServiceSettings};
pub use utils::error::{RekognizerError, Result};
