use super::nom_parser::{BlackboardValue, TreeDef, TreeSource};
use crate::container::BehaviorNodeContainer;
use crate::error::LoadError;
use crate::nodes::SubtreeNode;
use crate::{BBMap, PortSpec, Registry};
use tracing::debug;


/// Instantiate an executable tree from the AST of a tree source.
///
/// Subtree references are resolved across all `tree` definitions in the
/// source; a tree name shadows a registered node type of the same name.
/// Returns `Ok(None)` when the source does not define a `main` tree.
pub fn load(
    tree_source: &TreeSource,
    registry: &Registry,
) -> Result<Option<BehaviorNodeContainer>, LoadError> {
    let Some(main) = tree_source
        .tree_defs
        .iter()
        .find(|tree| tree.name == "main")
    else {
        return Ok(None);
    };

    debug!("instantiating tree {:?}", main.name);
    let mut subtree_stack = vec![];
    load_recurse(&main.root, registry, tree_source, &mut subtree_stack).map(Some)
}

fn load_recurse(
    parent: &TreeDef,
    registry: &Registry,
    tree_source: &TreeSource,
    subtree_stack: &mut Vec<String>,
) -> Result<BehaviorNodeContainer, LoadError> {
    let (node, child_nodes) = if let Some(tree) = tree_source
        .tree_defs
        .iter()
        .find(|tree| tree.name == parent.ty)
    {
        if subtree_stack.iter().any(|name| name == tree.name) {
            return Err(LoadError::InfiniteRecursion {
                node: tree.name.to_string(),
            });
        }
        debug!("expanding subtree {:?}", tree.name);
        subtree_stack.push(tree.name.to_string());
        let loaded_subtree = load_recurse(&tree.root, registry, tree_source, subtree_stack)?;
        subtree_stack.pop();
        let params = tree
            .ports
            .iter()
            .map(|port| PortSpec {
                ty: port.direction,
                key: port.name.into(),
            })
            .collect();
        let node: Box<dyn crate::BehaviorNode> = Box::new(SubtreeNode::new(params));
        // A subtree call is a leaf from the caller's structural viewpoint;
        // its only child is the loaded subtree root.
        (node, vec![loaded_subtree])
    } else {
        let mut child_nodes = Vec::with_capacity(parent.children.len());
        for child in &parent.children {
            child_nodes.push(load_recurse(child, registry, tree_source, subtree_stack)?);
        }
        let node = registry
            .build(parent.ty)
            .ok_or_else(|| LoadError::MissingNode(parent.ty.to_owned()))?;
        (node, child_nodes)
    };

    let mut bbmap = BBMap::new();
    for entry in &parent.port_maps {
        // The first mapping of a port name wins.
        bbmap
            .entry(entry.node_port.into())
            .or_insert_with(|| match entry.blackboard_value {
                BlackboardValue::Ref(value) => crate::BlackboardValue::Ref(value.into(), entry.ty),
                BlackboardValue::Literal(value) => {
                    crate::BlackboardValue::Literal(value.to_string())
                }
            });
    }

    Ok(BehaviorNodeContainer::new(node, bbmap, child_nodes))
}
