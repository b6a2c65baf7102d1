pub mod config;
pub mod inputs;
pub mod logger;
pub mod validation;
