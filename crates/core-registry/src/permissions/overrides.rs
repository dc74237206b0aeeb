use super::{PermAction, Permission};
use crate::RegistryError;
use crate::manifest::is_safe_name;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One `[agent:]permission=action` override. `agent: None` applies to every agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideSpec {
    pub agent: Option<String>,
    pub permission: Permission,
    pub action: PermAction,
}

impl OverrideSpec {
    pub fn applies_to(&self, agent: &str) -> bool {
        self.agent.as_deref().is_none_or(|a| a == agent)
    }
}

impl FromStr for OverrideSpec {
    type Err = RegistryError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| RegistryError::InvalidOverride {
            spec: spec.to_string(),
            reason,
        };
        let Some((left, action)) = spec.split_once('=') else {
            return Err(invalid("expected format [agent:]permission=action".into()));
        };
        if left.is_empty() || action.is_empty() {
            return Err(invalid("expected format [agent:]permission=action".into()));
        }
        let action = PermAction::parse(action).ok_or_else(|| {
            invalid(format!(
                "invalid action \"{action}\"; valid actions: allow, ask, deny"
            ))
        })?;
        let (agent, permission) = match left.split_once(':') {
            Some((agent, permission)) => {
                if agent.is_empty() {
                    return Err(invalid("agent name before \":\" is empty".into()));
                }
                if !is_safe_name(agent) {
                    return Err(invalid(format!("invalid agent name \"{agent}\"")));
                }
                (Some(agent.to_string()), permission)
            }
            None => (None, left),
        };
        let permission = Permission::parse(permission)
            .ok_or_else(|| invalid(format!("unknown permission \"{permission}\"")))?;
        Ok(OverrideSpec {
            agent,
            permission,
            action,
        })
    }
}
