use crate::container::BehaviorNodeContainer;
use crate::error::LoadYamlError;
use crate::port::{BlackboardValue, PortType};
use crate::{BBMap, Registry};
use serde_yaml::Value;
use std::collections::HashMap;
use tracing::debug;

type ParseResult = Result<Option<BehaviorNodeContainer>, LoadYamlError>;

fn recurse_parse(value: &Value, reg: &Registry) -> ParseResult {
    let Some(name) = value.get("type").and_then(|value| value.as_str()) else {
        return Ok(None);
    };

    debug!("building node {:?}", name);
    let node = reg
        .build(name)
        .ok_or_else(|| LoadYamlError::MissingNode(name.to_owned()))?;

    let mut child_nodes = vec![];
    if let Some(Value::Sequence(children)) = value.get("children") {
        for child in children {
            if let Some(built_child) = recurse_parse(child, reg)? {
                child_nodes.push(built_child);
            }
        }
    }

    // YAML port entries carry no arrow, so the direction defaults to InOut.
    let blackboard_map = if let Some(Value::Mapping(ports)) = value.get("ports") {
        ports
            .iter()
            .filter_map(|(key, value)| {
                key.as_str().zip(value.as_str()).map(|(key, value)| {
                    (
                        key.into(),
                        BlackboardValue::Ref(value.into(), PortType::InOut),
                    )
                })
            })
            .collect()
    } else {
        BBMap::new()
    };

    Ok(Some(BehaviorNodeContainer::new(
        node,
        blackboard_map,
        child_nodes,
    )))
}

/// Build named executable trees from a YAML document of the shape
/// `behavior_tree: { <name>: { type, ports, children } }`.
///
/// Unlike the DSL front-end, the YAML front-end does not resolve subtree
/// references; every `type` must be a registered node.
pub fn load_yaml(
    yaml: &str,
    reg: &Registry,
) -> Result<HashMap<String, BehaviorNodeContainer>, LoadYamlError> {
    let yaml: Value = serde_yaml::from_str(yaml)?;
    if let Value::Mapping(root) = yaml {
        if let Some(Value::Mapping(roots)) = root.get(&Value::from("behavior_tree")) {
            return roots
                .iter()
                .map(|(name, value)| {
                    Ok((
                        name.as_str().ok_or(LoadYamlError::Missing)?.to_string(),
                        recurse_parse(value, reg)?.ok_or(LoadYamlError::Missing)?,
                    ))
                })
                .collect::<Result<_, LoadYamlError>>();
        }
    }

    Err(LoadYamlError::Missing)
}
