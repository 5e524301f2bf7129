#[macro_use]
extern crate log;

pub mod config;
pub mod features;
pub mod replay;

pub use config::StoreConfig;
pub use features::*;
