//! State of one generation pass

use tracing::warn;

use crate::params::Variables;
use crate::warning::Warning;

/// Everything that changes while one document is generated. A fresh context
/// is created for every `generate` call.
#[derive(Debug, Default)]
pub struct GenerationContext {
    timer_count: usize,
    remaining_checks: usize,
    /// Variables assigned by `store*` commands so far
    pub variables: Variables,
    warnings: Vec<Warning>,
}

impl GenerationContext {
    /// Start a pass for a document containing `checks` verifications
    pub fn new(checks: usize) -> Self {
        Self {
            remaining_checks: checks,
            ..Default::default()
        }
    }

    /// Allocate a document-unique timer variable
    pub fn next_timer(&mut self) -> String {
        self.timer_count += 1;
        format!("t_timer{}", self.timer_count)
    }

    /// Consume one verification; true when it was the last one of the
    /// document
    pub fn is_last_check(&mut self) -> bool {
        match self.remaining_checks.checked_sub(1) {
            Some(remaining) => {
                self.remaining_checks = remaining;
                remaining == 0
            }
            None => false,
        }
    }

    pub fn warn(&mut self, warning: Warning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}
