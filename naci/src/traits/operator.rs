use async_trait::async_trait;
use auto_impl::auto_impl;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which inputs the arbiter is allowed to use.
///
/// `VfhOnly` and `ArucoOnly` are operator-requested downgrades of the default
/// hybrid safety policy.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    #[default]
    Hybrid,
    VfhOnly,
    ArucoOnly,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OperatorEvent {
    SelectPolicy(Policy),
    EmergencyStop,
    Quit,
    Unknown,
}

#[async_trait]
#[auto_impl(Box, Arc)]
pub trait Operator: Send + Sync {
    async fn next_event(&self) -> OperatorEvent;

    fn stop(&self) {}
}
