//! Human-shareable entity codes.
//!
//! Codes are the out-of-band identifiers users pass around ("give this code to
//! a teammate so they can request access"), distinct from the internal row ids.
//! They are stored uppercase; [`TaskCode::parse`] and [`ProjectCode::parse`]
//! normalize caller input before any lookup.

use std::fmt;

/// Unique project code (`PROJ-####` or a timestamp-derived fallback).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProjectCode(pub String);

impl ProjectCode {
    /// Normalize caller-supplied input: trim whitespace, uppercase.
    pub fn parse(input: &str) -> Self {
        ProjectCode(input.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique task code (`TASK-####` or a timestamp-derived fallback).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TaskCode(pub String);

impl TaskCode {
    /// Normalize caller-supplied input: trim whitespace, uppercase.
    pub fn parse(input: &str) -> Self {
        TaskCode(input.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        let code = TaskCode::parse("  task-1234 ");
        assert_eq!(code.as_str(), "TASK-1234");

        let code = ProjectCode::parse("proj-9001");
        assert_eq!(code.as_str(), "PROJ-9001");
    }

    #[test]
    fn parse_is_idempotent_on_canonical_input() {
        let code = TaskCode::parse("TASK-1234");
        assert_eq!(TaskCode::parse(code.as_str()), code);
    }
}
