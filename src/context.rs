use crate::container::BehaviorNodeContainer;
use crate::error::TickError;
use crate::port::{BlackboardValue, PortType};
use crate::{BBMap, BehaviorResult, Blackboard, Symbol};
use std::str::FromStr;

/// The scoped view a node gets of the world while it is being ticked.
///
/// `blackboard` is owned by the driver for the duration of the tick.
/// `blackboard_map` and `child_nodes` always belong to the node currently
/// being ticked; [`BehaviorNodeContainer::tick`] swaps them in on entry and
/// back out on every exit path, so a node can only see its own declared
/// ports and its own children.
#[derive(Default)]
pub struct Context {
    pub(crate) blackboard: Blackboard,
    pub(crate) blackboard_map: BBMap,
    pub(crate) child_nodes: Vec<BehaviorNodeContainer>,
}

impl Context {
    pub fn new(blackboard: Blackboard) -> Self {
        Self {
            blackboard,
            blackboard_map: BBMap::new(),
            child_nodes: vec![],
        }
    }

    pub fn take_blackboard(self) -> Blackboard {
        self.blackboard
    }

    /// Read a port. Yields `None` when the port is not mapped at the call
    /// site, when it is mapped to a write-only variable, or when the mapped
    /// variable does not exist yet. None of those is an error; leaves are
    /// expected to react softly.
    pub fn get(&self, key: impl Into<Symbol>) -> Option<&str> {
        let key = key.into();
        match self.blackboard_map.get(&key)? {
            BlackboardValue::Ref(_, PortType::Output) => None,
            BlackboardValue::Ref(name, _) => self.blackboard.get(name).map(String::as_str),
            BlackboardValue::Literal(value) => Some(value),
        }
    }

    /// Convenience method to read a port and parse it, e.g. as `usize`.
    pub fn get_parse<F: FromStr>(&self, key: impl Into<Symbol>) -> Option<F> {
        self.get(key).and_then(|value| value.parse().ok())
    }

    /// Write a port. Unlike reads, writes are strict: an unmapped port, an
    /// input port and a literal binding all raise.
    pub fn set(
        &mut self,
        key: impl Into<Symbol>,
        value: impl Into<String>,
    ) -> Result<(), TickError> {
        let key = key.into();
        match self.blackboard_map.get(&key) {
            None => Err(TickError::UndefinedPort(key)),
            Some(BlackboardValue::Ref(_, PortType::Input)) => {
                Err(TickError::WriteToInputPort(key))
            }
            Some(BlackboardValue::Ref(name, _)) => {
                let name = *name;
                self.blackboard.insert(name, value.into());
                Ok(())
            }
            Some(BlackboardValue::Literal(_)) => Err(TickError::WriteToLiteral(key)),
        }
    }

    /// Tick the `idx`-th child of the node currently being ticked, with the
    /// context rebound to that child. `Ok(None)` when there is no such
    /// child; leaf errors propagate.
    pub fn tick_child(&mut self, idx: usize) -> Result<Option<BehaviorResult>, TickError> {
        let mut children = std::mem::take(&mut self.child_nodes);
        let res = match children.get_mut(idx) {
            Some(child) => child.tick(self).map(Some),
            None => Ok(None),
        };
        self.child_nodes = children;
        res
    }

    pub fn child_count(&self) -> usize {
        self.child_nodes.len()
    }
}
