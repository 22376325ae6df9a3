use crate::nodes::{
    FallbackNode, FalseNode, ForceFailureNode, ForceSuccessNode, IfNode, InverterNode,
    ReactiveFallbackNode, ReactiveSequenceNode, RepeatNode, RetryNode, SequenceNode, SetBoolNode,
    TrueNode,
};
use crate::BehaviorNode;
use std::collections::HashMap;

/// Zero-argument factory producing a fresh stateful node.
pub type Constructor = Box<dyn Fn() -> Box<dyn BehaviorNode>>;

pub fn boxify<T>(cons: impl (Fn() -> T) + 'static) -> Constructor
where
    T: BehaviorNode + 'static,
{
    Box::new(move || Box::new(cons()))
}

/// Mapping from node type names to constructors. Subtree names are not
/// registered here; the loader resolves them against the tree source
/// first, so a tree definition shadows a registered node of the same name.
pub struct Registry {
    node_types: HashMap<String, Constructor>,
}

impl Default for Registry {
    fn default() -> Self {
        let mut ret = Self {
            node_types: HashMap::new(),
        };
        ret.register("Sequence", boxify(SequenceNode::default));
        ret.register("ReactiveSequence", boxify(ReactiveSequenceNode::default));
        ret.register("Fallback", boxify(FallbackNode::default));
        ret.register("ReactiveFallbackStar", boxify(ReactiveFallbackNode::default));
        ret.register("ForceSuccess", boxify(ForceSuccessNode::default));
        ret.register("ForceFailure", boxify(ForceFailureNode::default));
        ret.register("Inverter", boxify(InverterNode::default));
        ret.register("Repeat", boxify(RepeatNode::default));
        ret.register("Retry", boxify(RetryNode::default));
        ret.register("true", boxify(TrueNode::default));
        ret.register("false", boxify(FalseNode::default));
        ret.register("SetBool", boxify(SetBoolNode::default));
        ret.register("if", boxify(IfNode::default));
        ret
    }
}

impl Registry {
    /// Registering an existing name replaces the prior entry.
    pub fn register(&mut self, type_name: impl ToString, constructor: Constructor) {
        self.node_types.insert(type_name.to_string(), constructor);
    }

    pub fn build(&self, type_name: &str) -> Option<Box<dyn BehaviorNode>> {
        self.node_types
            .get(type_name)
            .map(|constructor| constructor())
    }
}
