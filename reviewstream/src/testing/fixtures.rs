//! Sample documents and stage payloads.

use super::ScriptedStage;
use crate::core::Capability;
use crate::stages::Stage;
use serde_json::{json, Value};
use std::sync::Arc;

/// A design document long enough to pass the default pre-flight check.
pub const SAMPLE_DOCUMENT: &str = "\
Checkout Platform Design

The checkout platform lets shoppers pay for their basket on web and mobile. \
It is deployed on Kubernetes in a single AWS region and is expected to handle \
2,000 orders per minute at peak, with a p99 checkout latency under 300 ms.

Components: an API gateway terminates TLS and routes requests. The checkout \
service (Go, stateless) validates the basket, reserves inventory and calls the \
payment service. The payment service (Java, stateful) stores payment intents in \
PostgreSQL and talks to an external card processor over HTTPS. The inventory \
service (Node.js) keeps stock counts in Redis. Order events are published to \
Kafka and consumed by the notification worker, which sends receipts by email.

Interactions: gateway to checkout over REST; checkout to payment and inventory \
over gRPC; payment to the card processor over HTTPS with a 10 second timeout; \
checkout publishes OrderPlaced events to Kafka asynchronously.

Security: customers authenticate with OAuth2 tokens validated at the gateway. \
Card data never touches our services; the processor returns a token. Internal \
traffic is not encrypted today.";

/// A document below the default minimum length (ten characters).
pub const SHORT_DOCUMENT: &str = "too short!";

/// A blueprint that passes the post-stage check.
#[must_use]
pub fn valid_blueprint() -> Value {
    json!({
        "is_valid": true,
        "validation_errors": [],
        "system_identity": {
            "name": "Checkout Platform",
            "primary_style": "Microservices",
            "deployment_target": "Kubernetes on AWS",
            "stated_goals": ["2,000 orders per minute", "p99 under 300 ms"]
        },
        "component_registry": [
            {"name": "API Gateway", "type": "Gateway", "hosting": "Kubernetes", "statefulness": "Stateless"},
            {"name": "Checkout Service", "type": "Service", "technology": "Go", "hosting": "Kubernetes", "statefulness": "Stateless"},
            {"name": "Payment Service", "type": "Service", "technology": "Java", "hosting": "Kubernetes", "statefulness": "Stateful"},
            {"name": "Orders Topic", "type": "Queue", "technology": "Kafka", "hosting": "Managed", "statefulness": "Stateful"}
        ],
        "interaction_map": [
            {"source": "API Gateway", "destination": "Checkout Service", "protocol": "REST", "data_exchanged": "basket", "nature": "Synchronous"},
            {"source": "Checkout Service", "destination": "Orders Topic", "protocol": "Kafka", "data_exchanged": "OrderPlaced", "nature": "Asynchronous"}
        ],
        "technical_constraints": {
            "traffic_expectations": "2,000 orders per minute at peak",
            "performance_requirements": ["p99 checkout latency under 300 ms"],
            "security_requirements": ["OAuth2 at the gateway"]
        },
        "omission": {
            "missing_from_diagram": [],
            "missing_from_text": ["disaster recovery"]
        }
    })
}

/// A well-formed blueprint that reports `is_valid = false`.
#[must_use]
pub fn invalid_blueprint(errors: Vec<String>) -> Value {
    let mut blueprint = valid_blueprint();
    blueprint["is_valid"] = json!(false);
    blueprint["validation_errors"] = json!(errors);
    blueprint
}

/// A performance review scoring 72.
#[must_use]
pub fn performance_review() -> Value {
    json!({
        "summary": "Synchronous payment calls dominate checkout latency.",
        "bottlenecks": [{
            "id": "PERF-1",
            "type": "Network",
            "component": "Payment Service",
            "observation": "10 second timeout on the card processor call",
            "impact": "Threads pile up when the processor slows down",
            "severity": "High",
            "remediation": "Lower the timeout and add a circuit breaker"
        }],
        "scalability_blockers": [{
            "issue": "Single-region deployment",
            "why_it_blocks_scaling": "Regional outages take checkout down"
        }],
        "reliability_score": {"score": 72, "justification": "Sound core, weak failure isolation"}
    })
}

/// A security review with one STRIDE finding.
#[must_use]
pub fn security_review() -> Value {
    json!({
        "summary": "Perimeter is solid; internal traffic is exposed.",
        "vulnerabilities": [{
            "id": "SEC-1",
            "category": "Information Disclosure",
            "owasp_mapping": "A02:2021 Cryptographic Failures",
            "component_impacted": "Checkout Service",
            "threat_description": "Plaintext gRPC between services",
            "attack_vector": "Compromised pod sniffing cluster traffic",
            "severity": "Medium",
            "mitigation_strategy": "Enable mTLS through a service mesh"
        }],
        "trust_boundary_violations": ["Unencrypted east-west traffic"],
        "missing_security_controls": ["mTLS"]
    })
}

/// A final report with data.
#[must_use]
pub fn review_report() -> Value {
    json!({
        "data_available": true,
        "generated_at": "2026-01-01T00:00:00Z",
        "scorecard": {
            "architecture_health": "72/100",
            "primary_risks": "Unencrypted internal traffic",
            "primary_bottleneck": "Card processor timeout"
        },
        "findings": [{
            "priority": "High",
            "category": "Performance",
            "finding": "Long synchronous payment timeout",
            "impact": "Checkout stalls under processor degradation",
            "fix": "Circuit breaker with a 2 second timeout"
        }],
        "deep_dive": "Isolate the payment dependency before scaling out."
    })
}

/// Returns the canned payload for a capability.
#[must_use]
pub fn payload_for(capability: Capability) -> Value {
    match capability {
        Capability::DocumentUnderstanding => valid_blueprint(),
        Capability::PerformanceReview => performance_review(),
        Capability::SecurityReview => security_review(),
        Capability::Synthesis => review_report(),
    }
}

/// One succeeding scripted stage per capability, in pipeline order.
#[must_use]
pub fn happy_stages() -> Vec<Arc<dyn Stage>> {
    Capability::ALL
        .into_iter()
        .map(|capability| Arc::new(ScriptedStage::ok(capability)) as Arc<dyn Stage>)
        .collect()
}
