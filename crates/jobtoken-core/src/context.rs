//! Execution context of a running job

use serde::{Deserialize, Serialize};

/// A running job on whose behalf a token is requested.
///
/// Only `subject` and `build_number` end up in tokens. `scope` names the
/// URI of the folder enclosing the job (`""` for the root) and is read by
/// issuer factories to find the issuers visible to the job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Absolute URL of the job
    pub subject: String,

    /// Sequence number of this run
    pub build_number: u64,

    /// URI of the enclosing scope
    #[serde(default)]
    pub scope: String,
}

impl ExecutionContext {
    pub fn new(subject: impl Into<String>, build_number: u64) -> Self {
        Self {
            subject: subject.into(),
            build_number,
            scope: String::new(),
        }
    }

    /// Place the job inside a scope
    pub fn in_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Stable identifier used in log and error messages
    pub fn externalizable_id(&self) -> String {
        format!("{}#{}", self.subject, self.build_number)
    }
}
