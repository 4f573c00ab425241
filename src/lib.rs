pub mod cli;
pub mod config;
pub mod github;
pub mod model;
pub mod server;
pub mod upsert;

mod api;

pub use api::{ReadmeUpserter, ReadmeUpserterBuilder};
