pub mod analyzers;
pub mod config;
pub mod directory;
pub mod fetch;
pub mod infra;
pub mod output;
pub mod readings;
pub mod services;
