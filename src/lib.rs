pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod refresh;
pub mod report;
pub mod source;
