use crate::model::issue::Priority;
use crate::model::Result;
use indexmap::IndexMap;
use serde_json::{from_str, Value};
use std::fs;

/// Test case identifiers per module and priority tier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestCaseMapping {
    modules: IndexMap<String, IndexMap<Priority, Vec<String>>>,
}

// Create
impl TestCaseMapping {
    pub fn from_config(path: &str) -> Result<Self> {
        let json_str = fs::read_to_string(path)?;
        Self::parse(&json_str)
    }

    pub fn insert(&mut self, module: impl ToString, priority: Priority, ids: Vec<impl ToString>) {
        self.modules
            .entry(module.to_string())
            .or_default()
            .insert(priority, ids.iter().map(|id| id.to_string()).collect());
    }

    pub fn ids(&self, module: &str, priority: Priority) -> &[String] {
        self.modules
            .get(module)
            .and_then(|tiers| tiers.get(&priority))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

// Parser
impl TestCaseMapping {
    fn parse(json_str: &str) -> Result<Self> {
        let elements: IndexMap<String, Value> = from_str(json_str)?;
        let mut result = Self::default();
        for (module, tiers) in elements {
            let Some(tiers) = tiers.as_object() else {
                return Err(format!("Module '{module}' must map tiers to test case lists").into());
            };
            for (tier, ids) in tiers {
                let Some(priority) = Priority::ALL.into_iter().find(|p| p.label() == tier) else {
                    return Err(format!("Unknown tier '{tier}' for module '{module}'").into());
                };
                let Some(ids) = ids.as_array() else {
                    return Err(format!("Tier '{tier}' of '{module}' must be a list").into());
                };
                let ids = ids
                    .iter()
                    .filter_map(|id| id.as_str().map(String::from))
                    .collect::<Vec<_>>();
                result.insert(&module, priority, ids);
            }
        }
        Ok(result)
    }
}
