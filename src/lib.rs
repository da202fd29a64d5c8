// Library exports for cloudtail

pub mod cli;
pub mod config;
pub mod error;
pub mod logs;
pub mod source;
