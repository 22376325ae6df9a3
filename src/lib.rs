mod container;
mod context;
pub mod error;
mod nodes;
mod parser;
mod port;
mod registry;

use std::collections::HashMap;

pub use crate::container::BehaviorNodeContainer;
pub use crate::context::Context;
pub use crate::nodes::{
    FallbackNode, FalseNode, ForceFailureNode, ForceSuccessNode, IfNode, InverterNode,
    ReactiveFallbackNode, ReactiveSequenceNode, RepeatNode, RetryNode, SequenceNode, SetBoolNode,
    SubtreeNode, TrueNode,
};
pub use crate::parser::{
    load, load_yaml, parse, parse_file, PortDef, TreeDef, TreeRootDef, TreeSource, VarDef,
};
pub use crate::port::{BlackboardValue, PortSpec, PortType, Symbol};
pub use crate::registry::{boxify, Constructor, Registry};

use crate::error::TickError;

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum BehaviorResult {
    Success,
    Fail,
    /// The node should keep running in the next tick
    Running,
}

/// The outcome of one tick: a [`BehaviorResult`], or a port error raised by
/// a leaf somewhere below the ticked node.
pub type TickResult = Result<BehaviorResult, TickError>;

/// Variables shared by the nodes of one tree. Values are untyped strings;
/// numeric interpretation is up to the node reading them.
pub type Blackboard = HashMap<Symbol, String>;

/// Port-map table of a single node: node port name to blackboard binding.
pub type BBMap = HashMap<Symbol, BlackboardValue>;

pub trait BehaviorNode {
    fn tick(&mut self, ctx: &mut Context) -> TickResult;
}

/// Tick a loaded tree once against a driver-owned blackboard.
///
/// The driver decides when to call this again; a [`BehaviorResult::Running`]
/// return means the tree wants to be resumed on the next tick.
pub fn tick_node(node: &mut BehaviorNodeContainer, blackboard: &mut Blackboard) -> TickResult {
    let mut ctx = Context::new(std::mem::take(blackboard));
    let res = node.tick(&mut ctx);
    *blackboard = ctx.take_blackboard();
    res
}

#[macro_export]
macro_rules! hash_map {
    () => {
        std::collections::HashMap::default()
    };
    ($($name: literal => $val: expr),+ $(,)?) => {{
        let mut ret = std::collections::HashMap::default();
        $(ret.insert($name.into(), $val.into());)+
        ret
    }};
}
