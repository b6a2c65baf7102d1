pub mod merge;
pub mod redact;
pub mod sanitize;
