//! Rule evaluation trace.

use serde::{Deserialize, Serialize};

/// One rule decision recorded by the engine.
///
/// Each step captures the rule that ran, what it looked at, what it decided,
/// and a human-readable explanation, so a disputed comp-off can be traced
/// back to the inputs that produced it.
///
/// # Example
///
/// ```
/// use compoff_engine::models::EvaluationStep;
///
/// let step = EvaluationStep {
///     rule_id: "compoff_session_marker".to_string(),
///     rule_name: "Comp-off Session Marker".to_string(),
///     input: serde_json::json!({"day_type": "non_working"}),
///     output: serde_json::json!({"is_compoff_session": true}),
///     reasoning: "Work on a non-working day earns comp-off".to_string(),
/// };
/// assert_eq!(step.output["is_compoff_session"], true);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationStep {
    /// Stable identifier of the rule.
    pub rule_id: String,
    /// Human-readable rule name.
    pub rule_name: String,
    /// The facts the rule evaluated.
    pub input: serde_json::Value,
    /// The rule's decision.
    pub output: serde_json::Value,
    /// Explanation of the decision.
    pub reasoning: String,
}
