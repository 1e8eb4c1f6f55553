//! Structured, non-fatal error reports attributable to one operation.
//!
//! A [`Diagnostic`] never aborts the process: the caller (the apply driver or the CLI)
//! decides whether to halt or continue with other entities.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Reconciler lifecycle operation a diagnostic is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Import,
    Lookup,
    Configure,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Import => "import",
            Operation::Lookup => "lookup",
            Operation::Configure => "configure",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    /// The `id` attribute did not parse as a non-negative integer. No remote call was made.
    #[error("({operation}) invalid identifier {id:?}: {detail}")]
    InvalidIdentifier {
        operation: Operation,
        id: String,
        detail: String,
    },

    /// A user-supplied attribute was rejected before any remote call.
    #[error("({operation}) invalid attribute {attribute:?}: {detail}")]
    InvalidAttribute {
        operation: Operation,
        attribute: String,
        detail: String,
    },

    /// Import targeted an address that already tracks a person.
    #[error("(import) resource {address:?} is already managed")]
    AlreadyManaged { address: String },

    /// The remote client returned an error.
    #[error("unable to {operation} person: {detail}")]
    RemoteCall { operation: Operation, detail: String },

    /// Provider setup failed; no entity operation can run.
    #[error("provider configuration error: {summary}: {detail}")]
    Configuration { summary: String, detail: String },
}

impl Diagnostic {
    pub fn remote(operation: Operation, err: impl fmt::Display) -> Self {
        Diagnostic::RemoteCall {
            operation,
            detail: err.to_string(),
        }
    }

    pub fn configuration(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Diagnostic::Configuration {
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Error
    }

    /// Short, human-readable headline.
    pub fn summary(&self) -> String {
        match self {
            Diagnostic::InvalidIdentifier { operation, .. } => {
                format!("({operation}) Error converting id to int")
            }
            Diagnostic::InvalidAttribute { attribute, .. } => {
                format!("Invalid value for attribute {attribute:?}")
            }
            Diagnostic::AlreadyManaged { address } => {
                format!("Resource {address:?} already managed")
            }
            Diagnostic::RemoteCall { operation, .. } => remote_summary(*operation).to_string(),
            Diagnostic::Configuration { summary, .. } => summary.clone(),
        }
    }

    /// Underlying error text.
    pub fn detail(&self) -> &str {
        match self {
            Diagnostic::InvalidIdentifier { detail, .. }
            | Diagnostic::InvalidAttribute { detail, .. }
            | Diagnostic::RemoteCall { detail, .. }
            | Diagnostic::Configuration { detail, .. } => detail,
            Diagnostic::AlreadyManaged { .. } => {
                "remove it from the state file before importing another person under this address"
            }
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Diagnostic::InvalidIdentifier { operation, .. }
            | Diagnostic::InvalidAttribute { operation, .. }
            | Diagnostic::RemoteCall { operation, .. } => *operation,
            Diagnostic::AlreadyManaged { .. } => Operation::Import,
            Diagnostic::Configuration { .. } => Operation::Configure,
        }
    }
}

fn remote_summary(operation: Operation) -> &'static str {
    match operation {
        Operation::Create => "Error creating person",
        Operation::Read | Operation::Lookup | Operation::Import => "Error getting person",
        Operation::Update => "Error updating person",
        Operation::Delete => "Error deleting person",
        Operation::Configure => "Error configuring client",
    }
}

/// A diagnostic tagged with the address of the entity it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressedDiagnostic {
    pub address: String,
    pub diagnostic: Diagnostic,
}

/// All diagnostics produced during one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<AddressedDiagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, address: impl Into<String>, diagnostic: Diagnostic) {
        self.entries.push(AddressedDiagnostic {
            address: address.into(),
            diagnostic,
        });
    }

    pub fn has_error(&self) -> bool {
        self.entries
            .iter()
            .any(|d| d.diagnostic.severity() == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AddressedDiagnostic> {
        self.entries.iter()
    }
}
