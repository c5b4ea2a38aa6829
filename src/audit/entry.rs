//! Audit entry data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Envelope operations that get audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Encrypt,
    Decrypt,
    Seal,
    Unseal,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Encrypt => write!(f, "ENCRYPT"),
            Operation::Decrypt => write!(f, "DECRYPT"),
            Operation::Seal => write!(f, "SEAL"),
            Operation::Unseal => write!(f, "UNSEAL"),
        }
    }
}

/// How the operation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditResult {
    Success,
    /// The file was already in the target state
    Skipped,
    Failed,
}

impl std::fmt::Display for AuditResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditResult::Success => write!(f, "ok"),
            AuditResult::Skipped => write!(f, "skipped"),
            AuditResult::Failed => write!(f, "failed"),
        }
    }
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the operation occurred (UTC)
    pub timestamp: DateTime<Utc>,

    pub operation: Operation,

    /// File the operation was run against
    pub path: String,

    /// Header tag of the cipher suite in use
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suite: Option<String>,

    pub result: AuditResult,

    /// Error message or destination path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl AuditEntry {
    pub fn new(
        operation: Operation,
        path: impl Into<String>,
        suite: Option<String>,
        result: AuditResult,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            path: path.into(),
            suite,
            result,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.path,
            self.result
        );

        if let Some(suite) = &self.suite {
            output.push_str(&format!(" ({})", suite));
        }

        if let Some(detail) = &self.detail {
            output.push_str(&format!("\n  {}", detail));
        }

        output
    }
}
