//! Declarative attribute schemas for the provider, the `person` resource and the
//! `person` data source.
//!
//! Schemas are plain data: the apply driver consults them to decide whether a change can be
//! applied in place, and the CLI prints them as JSON.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Int64,
}

/// How a value for the attribute is supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Required,
    Optional,
    Computed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanModifier {
    /// A change to this attribute is applied as delete followed by create.
    RequiresReplace,
    /// Keep the prior state's value instead of marking it unknown in a plan.
    UseStateForUnknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: AttributeType,
    pub presence: Presence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plan_modifiers: Vec<PlanModifier>,
}

impl Attribute {
    fn new(name: &'static str, kind: AttributeType, presence: Presence) -> Self {
        Self {
            name,
            kind,
            presence,
            description: None,
            plan_modifiers: Vec::new(),
        }
    }

    fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    fn modifier(mut self, modifier: PlanModifier) -> Self {
        self.plan_modifiers.push(modifier);
        self
    }

    pub fn requires_replace(&self) -> bool {
        self.plan_modifiers.contains(&PlanModifier::RequiresReplace)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub description: &'static str,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Names of the attributes whose change forces a replacement.
    pub fn replacement_attributes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.attributes
            .iter()
            .filter(|a| a.requires_replace())
            .map(|a| a.name)
    }
}

pub fn provider_schema() -> Schema {
    Schema {
        description: "api-server provider",
        attributes: vec![Attribute::new("endpoint", AttributeType::String, Presence::Required)
            .describe("Base URL of the api-server")],
    }
}

pub fn person_resource_schema() -> Schema {
    Schema {
        description: "Person resource",
        attributes: vec![
            Attribute::new("id", AttributeType::String, Presence::Computed)
                .describe("Person identifier")
                .modifier(PlanModifier::UseStateForUnknown),
            Attribute::new("name", AttributeType::String, Presence::Required)
                .describe("Person name")
                .modifier(PlanModifier::RequiresReplace),
            Attribute::new("age", AttributeType::Int64, Presence::Required).describe("Person age"),
            Attribute::new("description", AttributeType::String, Presence::Optional)
                .describe("Person description"),
            Attribute::new("last_updated", AttributeType::String, Presence::Computed)
                .modifier(PlanModifier::UseStateForUnknown),
        ],
    }
}

pub fn person_data_source_schema() -> Schema {
    Schema {
        description: "Person data source",
        attributes: vec![
            Attribute::new("id", AttributeType::String, Presence::Required)
                .describe("Person identifier"),
            Attribute::new("name", AttributeType::String, Presence::Computed)
                .describe("Person name"),
            Attribute::new("age", AttributeType::Int64, Presence::Computed).describe("Person age"),
            Attribute::new("description", AttributeType::String, Presence::Computed)
                .describe("Person description"),
        ],
    }
}
