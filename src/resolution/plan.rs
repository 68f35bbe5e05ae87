// Copyright 2025 Cowboy AI, LLC.

//! Name-only rendering of a resolved composition for tooling

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::context::IntroducedMemberVisibility;

/// Serializable composition decisions for one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CompositionPlan {
    /// Target type name
    pub target_type: String,
    /// Mixin names in composition order
    pub ordered_mixins: Vec<String>,
    /// Mixins removed by suppression
    pub suppressed_mixins: Vec<String>,
    /// Override chains in target member order
    pub override_chains: Vec<OverrideChainPlan>,
    /// Introduced interfaces and their owners
    pub introduced_interfaces: Vec<IntroducedInterfacePlan>,
    /// Interfaces mixins implement that the target already has
    pub non_introduced_interfaces: Vec<String>,
}

/// One member's override chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OverrideChainPlan {
    /// Rendered member signature
    pub member: String,
    /// Overriding mixins in composition order; the last one is called first
    pub chain: Vec<String>,
}

/// One introduced interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IntroducedInterfacePlan {
    /// Interface type name
    pub interface: String,
    /// Owning mixin name
    pub mixin: String,
    /// Whether the members are also public on the composite
    pub public: bool,
}

impl IntroducedInterfacePlan {
    pub(crate) fn new(interface: &str, mixin: &str, visibility: IntroducedMemberVisibility) -> Self {
        Self {
            interface: interface.to_string(),
            mixin: mixin.to_string(),
            public: visibility == IntroducedMemberVisibility::Public,
        }
    }
}

impl CompositionPlan {
    /// Pretty JSON rendering
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// JSON schema describing the plan format
    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(CompositionPlan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_json_shape() {
        let plan = CompositionPlan {
            target_type: "Order".to_string(),
            ordered_mixins: vec!["A".to_string()],
            suppressed_mixins: vec![],
            override_chains: vec![OverrideChainPlan {
                member: "save() -> bool".to_string(),
                chain: vec!["A".to_string()],
            }],
            introduced_interfaces: vec![IntroducedInterfacePlan::new(
                "IAudit",
                "A",
                IntroducedMemberVisibility::Public,
            )],
            non_introduced_interfaces: vec![],
        };

        let value: serde_json::Value = serde_json::from_str(&plan.to_json_pretty().unwrap()).unwrap();
        assert_eq!(value["override_chains"][0]["member"], "save() -> bool");
        assert_eq!(value["introduced_interfaces"][0]["public"], true);

        let back: CompositionPlan = serde_json::from_value(value).unwrap();
        assert_eq!(back, plan);
    }

    #[test]
    fn test_schema_names_fields() {
        let schema = serde_json::to_value(CompositionPlan::json_schema()).unwrap();
        let properties = &schema["properties"];
        assert!(properties.get("ordered_mixins").is_some());
        assert!(properties.get("override_chains").is_some());
    }
}
