use crate::error::TickError;
use crate::port::PortSpec;
use crate::{BehaviorNode, BehaviorResult, Blackboard, Context, PortType, Symbol, TickResult};
use once_cell::sync::Lazy;


static N_SYM: Lazy<Symbol> = Lazy::new(|| "n".into());
static VALUE_SYM: Lazy<Symbol> = Lazy::new(|| "value".into());
static OUTPUT_SYM: Lazy<Symbol> = Lazy::new(|| "output".into());

/// Ticks children left to right, resuming at the child that last returned
/// Running. The cursor is retained on Fail as well, and resets only after
/// it advances past the last child.
#[derive(Default)]
pub struct SequenceNode {
    current_child: usize,
}

impl BehaviorNode for SequenceNode {
    fn tick(&mut self, ctx: &mut Context) -> TickResult {
        let mut result = BehaviorResult::Success;
        while self.current_child < ctx.child_count() {
            let Some(res) = ctx.tick_child(self.current_child)? else {
                break;
            };
            result = res;
            match res {
                BehaviorResult::Success => self.current_child += 1,
                BehaviorResult::Fail => return Ok(BehaviorResult::Fail),
                BehaviorResult::Running => return Ok(BehaviorResult::Running),
            }
        }
        self.current_child = 0;
        Ok(result)
    }
}

/// Like [`SequenceNode`], but restarts from the first child on every tick.
#[derive(Default)]
pub struct ReactiveSequenceNode;

impl BehaviorNode for ReactiveSequenceNode {
    fn tick(&mut self, ctx: &mut Context) -> TickResult {
        for i in 0..ctx.child_count() {
            let Some(res) = ctx.tick_child(i)? else {
                break;
            };
            if res != BehaviorResult::Success {
                return Ok(res);
            }
        }
        Ok(BehaviorResult::Success)
    }
}

/// The dual of [`SequenceNode`]: advances on Fail, returns on the first
/// Success (retaining the cursor) or Running.
#[derive(Default)]
pub struct FallbackNode {
    current_child: usize,
}

impl BehaviorNode for FallbackNode {
    fn tick(&mut self, ctx: &mut Context) -> TickResult {
        let mut result = BehaviorResult::Fail;
        while self.current_child < ctx.child_count() {
            let Some(res) = ctx.tick_child(self.current_child)? else {
                break;
            };
            result = res;
            match res {
                BehaviorResult::Fail => self.current_child += 1,
                BehaviorResult::Success => return Ok(BehaviorResult::Success),
                BehaviorResult::Running => return Ok(BehaviorResult::Running),
            }
        }
        self.current_child = 0;
        Ok(result)
    }
}

/// The dual of [`ReactiveSequenceNode`].
#[derive(Default)]
pub struct ReactiveFallbackNode;

impl BehaviorNode for ReactiveFallbackNode {
    fn tick(&mut self, ctx: &mut Context) -> TickResult {
        for i in 0..ctx.child_count() {
            let Some(res) = ctx.tick_child(i)? else {
                break;
            };
            if res != BehaviorResult::Fail {
                return Ok(res);
            }
        }
        Ok(BehaviorResult::Fail)
    }
}

#[derive(Default)]
pub struct ForceSuccessNode;

impl BehaviorNode for ForceSuccessNode {
    fn tick(&mut self, ctx: &mut Context) -> TickResult {
        if let Some(BehaviorResult::Running) = ctx.tick_child(0)? {
            return Ok(BehaviorResult::Running);
        }
        Ok(BehaviorResult::Success)
    }
}

#[derive(Default)]
pub struct ForceFailureNode;

impl BehaviorNode for ForceFailureNode {
    fn tick(&mut self, ctx: &mut Context) -> TickResult {
        if let Some(BehaviorResult::Running) = ctx.tick_child(0)? {
            return Ok(BehaviorResult::Running);
        }
        Ok(BehaviorResult::Fail)
    }
}

#[derive(Default)]
pub struct InverterNode;

impl BehaviorNode for InverterNode {
    fn tick(&mut self, ctx: &mut Context) -> TickResult {
        Ok(match ctx.tick_child(0)? {
            Some(BehaviorResult::Success) => BehaviorResult::Fail,
            Some(BehaviorResult::Fail) => BehaviorResult::Success,
            Some(BehaviorResult::Running) => BehaviorResult::Running,
            None => BehaviorResult::Fail,
        })
    }
}

/// Shared counter logic for [`RepeatNode`] and [`RetryNode`].
///
/// `remaining == 0` means idle; the counter re-arms from the `n` port on
/// the next tick. Decrement happens before the test, so `n <- "5"` ticks
/// the child 4 times and succeeds on the 5th tick without ticking it.
fn arm_counter(remaining: &mut u32, ctx: &Context) -> Result<(), TickError> {
    let n = ctx.get(*N_SYM).ok_or(TickError::InvalidCount)?;
    if *remaining == 0 {
        *remaining = n.parse().map_err(|_| TickError::InvalidCount)?;
        if *remaining == 0 {
            return Err(TickError::InvalidCount);
        }
    }
    Ok(())
}

/// Repeats child 0 while it keeps succeeding, up to the count in port `n`.
/// A failing child ends the run early with Fail.
#[derive(Default)]
pub struct RepeatNode {
    remaining: u32,
}

impl BehaviorNode for RepeatNode {
    fn tick(&mut self, ctx: &mut Context) -> TickResult {
        arm_counter(&mut self.remaining, ctx)?;
        self.remaining -= 1;
        if self.remaining == 0 {
            return Ok(BehaviorResult::Success);
        }
        match ctx.tick_child(0)? {
            None => Ok(BehaviorResult::Fail),
            Some(BehaviorResult::Success) | Some(BehaviorResult::Running) => {
                Ok(BehaviorResult::Running)
            }
            Some(res) => {
                self.remaining = 0;
                Ok(res)
            }
        }
    }
}

/// The dual of [`RepeatNode`]: keeps re-ticking a failing child, up to the
/// count in port `n`, and succeeds as soon as the child does.
#[derive(Default)]
pub struct RetryNode {
    remaining: u32,
}

impl BehaviorNode for RetryNode {
    fn tick(&mut self, ctx: &mut Context) -> TickResult {
        arm_counter(&mut self.remaining, ctx)?;
        self.remaining -= 1;
        if self.remaining == 0 {
            return Ok(BehaviorResult::Success);
        }
        match ctx.tick_child(0)? {
            None => Ok(BehaviorResult::Fail),
            Some(BehaviorResult::Fail) | Some(BehaviorResult::Running) => {
                Ok(BehaviorResult::Running)
            }
            Some(res) => {
                self.remaining = 0;
                Ok(res)
            }
        }
    }
}

#[derive(Default)]
pub struct TrueNode;

impl BehaviorNode for TrueNode {
    fn tick(&mut self, _ctx: &mut Context) -> TickResult {
        Ok(BehaviorResult::Success)
    }
}

#[derive(Default)]
pub struct FalseNode;

impl BehaviorNode for FalseNode {
    fn tick(&mut self, _ctx: &mut Context) -> TickResult {
        Ok(BehaviorResult::Fail)
    }
}

/// Copies the `value` port to the `output` port. An absent `value` is not
/// an error; the node simply succeeds without writing.
#[derive(Default)]
pub struct SetBoolNode;

impl BehaviorNode for SetBoolNode {
    fn tick(&mut self, ctx: &mut Context) -> TickResult {
        if let Some(value) = ctx.get(*VALUE_SYM).map(str::to_string) {
            ctx.set(*OUTPUT_SYM, value)?;
        }
        Ok(BehaviorResult::Success)
    }
}

/// Children: condition, then-branch, optional else-branch. A Running
/// condition propagates as Running without entering either branch.
#[derive(Default)]
pub struct IfNode;

impl BehaviorNode for IfNode {
    fn tick(&mut self, ctx: &mut Context) -> TickResult {
        match ctx.tick_child(0)? {
            Some(BehaviorResult::Fail) => {
                Ok(ctx.tick_child(2)?.unwrap_or(BehaviorResult::Fail))
            }
            Some(BehaviorResult::Running) => Ok(BehaviorResult::Running),
            _ => Ok(ctx.tick_child(1)?.unwrap_or(BehaviorResult::Fail)),
        }
    }
}

/// A subtree call. Owns a local blackboard that the inner tree runs
/// against, so inner variables are invisible to the caller unless they are
/// declared Output/InOut parameters.
pub struct SubtreeNode {
    /// The local variables survive across ticks so a Running subtree can
    /// resume with its state intact.
    blackboard: Blackboard,
    params: Vec<PortSpec>,
}

impl SubtreeNode {
    pub fn new(params: Vec<PortSpec>) -> Self {
        Self {
            blackboard: Blackboard::new(),
            params,
        }
    }
}

impl BehaviorNode for SubtreeNode {
    fn tick(&mut self, ctx: &mut Context) -> TickResult {
        for param in &self.params {
            if !matches!(param.ty, PortType::Input | PortType::InOut) {
                continue;
            }
            if let Some(value) = ctx.get(param.key).map(str::to_string) {
                self.blackboard.insert(param.key, value);
            }
        }

        std::mem::swap(&mut self.blackboard, &mut ctx.blackboard);
        let res = ctx.tick_child(0);
        std::mem::swap(&mut self.blackboard, &mut ctx.blackboard);
        let res = res?.unwrap_or(BehaviorResult::Success);

        // Outputs are copied back even when the subtree failed or is still
        // running, so the caller sees partial progress.
        for param in &self.params {
            if !matches!(param.ty, PortType::Output | PortType::InOut) {
                continue;
            }
            if let Some(value) = self.blackboard.get(&param.key).cloned() {
                ctx.set(param.key, value)?;
            }
        }

        Ok(res)
    }
}
