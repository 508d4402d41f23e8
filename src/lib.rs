pub mod aggregate;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod feed;
pub mod logging;
pub mod present;
pub mod range;
pub mod types;
