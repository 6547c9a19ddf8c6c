use serde::Serialize;

use crate::knowledge::{self, Remedy, EMERGENCY_CONTACT};

pub const NOT_FOUND_MESSAGE: &str =
    "Solution not found. For serious issues, contact a professional.";

#[derive(Debug, Clone, Serialize)]
pub struct Assistance {
    pub issue: String,
    pub solution: &'static Remedy,
}

#[derive(Debug, Clone, Serialize)]
pub struct NoAssistance {
    pub issue: String,
    pub error: &'static str,
    pub emergency_contact: &'static str,
}

pub fn assist(issue: &str) -> Result<Assistance, NoAssistance> {
    let issue = knowledge::normalize_key(issue);
    match knowledge::remedy(&issue) {
        Some(solution) => Ok(Assistance { issue, solution }),
        None => Err(NoAssistance {
            issue,
            error: NOT_FOUND_MESSAGE,
            emergency_contact: EMERGENCY_CONTACT,
        }),
    }
}
