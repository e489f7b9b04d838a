use serde::{Deserialize, Serialize};

/// Identity document served at the API root.
///
/// Callers probe it to make sure they are talking to a Payment Agent
/// before creating payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentInfo {
    pub name: String,
    pub version: String,
}

impl AgentInfo {
    /// The name every Payment Agent reports.
    pub const NAME: &'static str = "Payment Agent";
}
