//! Blueprint extracted by the document-understanding stage.

use serde::{Deserialize, Serialize};

/// High-level architectural pattern of the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArchitectureStyle {
    /// Single deployable.
    Monolith,
    /// Independently deployed services.
    Microservices,
    /// Managed functions.
    Serverless,
    /// A mix of the above.
    Hybrid,
}

/// Whether a component keeps state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statefulness {
    /// Keeps state.
    Stateful,
    /// Keeps no state.
    Stateless,
    /// Not stated in the document.
    Unknown,
}

/// Whether an interaction blocks the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionNature {
    /// Request/response.
    Synchronous,
    /// Fire and forget, queues, events.
    Asynchronous,
}

/// Identity of the analysed system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemIdentity {
    /// System name.
    pub name: String,
    /// Architectural pattern.
    pub primary_style: ArchitectureStyle,
    /// Where the system is hosted.
    pub deployment_target: String,
    /// Primary objectives.
    #[serde(default)]
    pub stated_goals: Vec<String>,
}

/// A component in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Component name.
    pub name: String,
    /// Category such as Database or Queue.
    #[serde(rename = "type")]
    pub kind: String,
    /// Technology used.
    #[serde(default = "unknown")]
    pub technology: String,
    /// Hosting environment.
    pub hosting: String,
    /// Statefulness.
    pub statefulness: Statefulness,
}

/// A link between two components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// Calling component.
    pub source: String,
    /// Called component.
    pub destination: String,
    /// Wire protocol.
    #[serde(default = "unknown")]
    pub protocol: String,
    /// Payload description.
    pub data_exchanged: String,
    /// Sync or async.
    pub nature: InteractionNature,
}

/// Non-functional constraints stated in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalConstraints {
    /// Expected load.
    pub traffic_expectations: String,
    /// Latency and throughput targets.
    #[serde(default)]
    pub performance_requirements: Vec<String>,
    /// Security requirements.
    #[serde(default)]
    pub security_requirements: Vec<String>,
}

/// Gaps between the diagram and the prose.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Omission {
    /// Mentioned in text but not drawn.
    #[serde(default)]
    pub missing_from_diagram: Vec<String>,
    /// Drawn but not described.
    #[serde(default)]
    pub missing_from_text: Vec<String>,
}

/// Output schema of the document-understanding stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocBlueprint {
    /// True if the document meets the technical requirements.
    pub is_valid: bool,
    /// Missing requirements.
    #[serde(default)]
    pub validation_errors: Vec<String>,
    /// System identity.
    pub system_identity: SystemIdentity,
    /// Components.
    pub component_registry: Vec<Component>,
    /// Interactions.
    pub interaction_map: Vec<Interaction>,
    /// Constraints.
    pub technical_constraints: TechnicalConstraints,
    /// Gaps.
    pub omission: Omission,
}

fn unknown() -> String {
    "unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_component_defaults() {
        let component: Component = serde_json::from_value(json!({
            "name": "orders-db",
            "type": "Database",
            "hosting": "RDS",
            "statefulness": "Stateful"
        }))
        .unwrap();

        assert_eq!(component.technology, "unknown");
        assert_eq!(component.kind, "Database");
    }

    #[test]
    fn test_rejects_unknown_style() {
        let result: Result<SystemIdentity, _> = serde_json::from_value(json!({
            "name": "shop",
            "primary_style": "Mainframe",
            "deployment_target": "EC2"
        }));
        assert!(result.is_err());
    }
}
