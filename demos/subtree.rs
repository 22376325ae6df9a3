//! A subtree with declared ports: the caller passes a literal in and reads
//! the greeting the subtree wrote back out through its `result` port.

use anyhow::{anyhow, Result};
use ticktree::{
    boxify, load, parse, tick_node, BehaviorNode, BehaviorResult, Blackboard, Context, Registry,
    TickResult,
};

struct PrintNode;

impl BehaviorNode for PrintNode {
    fn tick(&mut self, ctx: &mut Context) -> TickResult {
        if let Some(value) = ctx.get("input") {
            println!("Print({value:?})");
        }
        Ok(BehaviorResult::Success)
    }
}

struct IsReadyNode;

impl BehaviorNode for IsReadyNode {
    fn tick(&mut self, ctx: &mut Context) -> TickResult {
        Ok(if ctx.get_parse("input").unwrap_or(false) {
            BehaviorResult::Success
        } else {
            BehaviorResult::Fail
        })
    }
}

struct MakeGreetingNode;

impl BehaviorNode for MakeGreetingNode {
    fn tick(&mut self, ctx: &mut Context) -> TickResult {
        let name = ctx.get("name").unwrap_or("stranger").to_string();
        ctx.set("output", format!("Hello, {name}!"))?;
        Ok(BehaviorResult::Success)
    }
}

const SRC: &str = r#"
tree main = Sequence {
    var ready = true
    if (IsReady (input <- ready)) {
        Greet(name <- "world", result -> greeting)
        Print(input <- greeting)
    }
}

tree Greet(in name, out result) = Sequence {
    MakeGreeting(name <- name, output -> result)
}
"#;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let tree_source = parse(SRC)?;

    let mut registry = Registry::default();
    registry.register("Print", boxify(|| PrintNode));
    registry.register("IsReady", boxify(|| IsReadyNode));
    registry.register("MakeGreeting", boxify(|| MakeGreetingNode));

    let mut tree = load(&tree_source, &registry)?.ok_or_else(|| anyhow!("no tree to load"))?;

    let mut blackboard = Blackboard::new();
    let res = tick_node(&mut tree, &mut blackboard)?;
    println!("tick: {res:?}");

    Ok(())
}
