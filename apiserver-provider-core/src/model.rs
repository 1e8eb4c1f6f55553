//! In-memory representation of one managed person (resource) and one person lookup
//! (data source), plus the helpers shared by every operation that touches them.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::contract::Person;
use crate::diagnostics::{Diagnostic, Operation};

/// Desired or known state of a managed person.
///
/// `id` and `last_updated` are computed: unknown until the first create (or import).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonResourceModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub age: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl PersonResourceModel {
    /// A planned (not yet created) person.
    pub fn planned(name: impl Into<String>, age: i64, description: Option<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            age,
            description: description.unwrap_or_default(),
            last_updated: None,
        }
    }

    /// Only the identifier is known, as after an import.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Request body for create/update calls.
    pub fn to_person(&self) -> Person {
        Person {
            id: 0,
            name: self.name.clone(),
            age: self.age,
            description: self.description.clone(),
        }
    }

    /// Overwrite the user-facing attributes with the server's authoritative values.
    pub fn apply_person(&mut self, person: &Person) {
        self.name = person.name.clone();
        self.age = person.age;
        self.description = person.description.clone();
    }

    /// Set `last_updated` only if it is currently unset.
    pub fn backfill_last_updated(&mut self) {
        if self.last_updated.as_deref().map_or(true, str::is_empty) {
            self.last_updated = Some(now_rfc3339());
        }
    }

    /// Reject planned values the server must never see.
    pub fn validate(&self, operation: Operation) -> Result<(), Diagnostic> {
        if self.name.is_empty() {
            return Err(Diagnostic::InvalidAttribute {
                operation,
                attribute: "name".to_string(),
                detail: "name must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// The identifier as an integer, or an "invalid identifier" diagnostic.
    pub fn numeric_id(&self, operation: Operation) -> Result<i64, Diagnostic> {
        parse_id(self.id.as_deref().unwrap_or_default(), operation)
    }
}

/// Configuration and result of a person lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonDataSourceModel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: i64,
    #[serde(default)]
    pub description: String,
}

impl PersonDataSourceModel {
    pub fn lookup(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// Parse a string-encoded identifier into a non-negative integer.
pub fn parse_id(raw: &str, operation: Operation) -> Result<i64, Diagnostic> {
    let invalid = |detail: String| Diagnostic::InvalidIdentifier {
        operation,
        id: raw.to_string(),
        detail,
    };
    let id = raw.parse::<i64>().map_err(|e| invalid(e.to_string()))?;
    if id < 0 {
        return Err(invalid("identifier must be non-negative".to_string()));
    }
    Ok(id)
}

/// Current time as an RFC3339 string (second precision, UTC).
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
