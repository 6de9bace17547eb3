pub mod args;
pub mod commands;
mod config;
pub mod engine;
mod error;
pub mod model;
pub mod mutation;
pub mod server;
pub mod source;
pub mod tree;
mod utils;
pub mod view;

pub use config::Config;
pub use error::Error;
pub use error::Result;
pub use tree::{Applied, Edit, Tree};
