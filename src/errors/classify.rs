use super::DeployError;
use crate::constants::markers::{ALREADY_EXISTS, NOT_FOUND};

/// Recovery paths a failed remote call can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    NotFound,
    AlreadyExists,
    Unclassified,
}

/// Maps an error onto a recovery path by its message text.
///
/// The gateway exposes no structured error code, so this is a case-sensitive
/// substring match. "not found" is checked before "already exists": a message
/// carrying both phrases classifies as `NotFound` on every path.
pub fn classify(err: &DeployError) -> ErrorClass {
    classify_message(&err.message)
}

pub fn classify_message(message: &str) -> ErrorClass {
    if message.contains(NOT_FOUND) {
        ErrorClass::NotFound
    } else if message.contains(ALREADY_EXISTS) {
        ErrorClass::AlreadyExists
    } else {
        ErrorClass::Unclassified
    }
}
