use crate::{BBMap, BehaviorNode, Context, TickResult};

/// An executable node: the behavior value, the port-map table built from
/// the call site, and the owned children. The tree graph is immutable
/// after load; only node-internal state and the blackboard mutate.
pub struct BehaviorNodeContainer {
    pub(crate) node: Box<dyn BehaviorNode>,
    pub(crate) blackboard_map: BBMap,
    pub(crate) child_nodes: Vec<BehaviorNodeContainer>,
}

impl BehaviorNodeContainer {
    pub fn new(
        node: Box<dyn BehaviorNode>,
        blackboard_map: BBMap,
        child_nodes: Vec<BehaviorNodeContainer>,
    ) -> Self {
        Self {
            node,
            blackboard_map,
            child_nodes,
        }
    }

    pub fn new_node(node: impl BehaviorNode + 'static) -> Self {
        Self {
            node: Box::new(node),
            blackboard_map: BBMap::new(),
            child_nodes: vec![],
        }
    }

    /// Rebind the context to this node's port map and children, tick, and
    /// restore. The result is captured before the swap-back, so the
    /// restoration happens on the error path too.
    pub fn tick(&mut self, ctx: &mut Context) -> TickResult {
        std::mem::swap(&mut self.child_nodes, &mut ctx.child_nodes);
        std::mem::swap(&mut self.blackboard_map, &mut ctx.blackboard_map);
        let res = self.node.tick(ctx);
        std::mem::swap(&mut self.blackboard_map, &mut ctx.blackboard_map);
        std::mem::swap(&mut self.child_nodes, &mut ctx.child_nodes);
        res
    }

    pub fn add_child(&mut self, child: BehaviorNodeContainer) {
        self.child_nodes.push(child);
    }

    pub fn with_blackboard_map(mut self, blackboard_map: BBMap) -> Self {
        self.blackboard_map = blackboard_map;
        self
    }
}
