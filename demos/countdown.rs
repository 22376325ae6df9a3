//! Parse a tree, load it and tick until it settles: a countdown that
//! resumes across ticks, then a print.

use anyhow::{anyhow, Result};
use ticktree::{
    boxify, load, parse, tick_node, BehaviorNode, BehaviorResult, Blackboard, Context, Registry,
    TickResult,
};

struct PrintNode;

impl BehaviorNode for PrintNode {
    fn tick(&mut self, ctx: &mut Context) -> TickResult {
        match ctx.get("input") {
            Some(value) => println!("Print({value:?})"),
            None => println!("Print could not find the input port"),
        }
        Ok(BehaviorResult::Success)
    }
}

struct CountDownNode {
    count: Option<i32>,
}

impl BehaviorNode for CountDownNode {
    fn tick(&mut self, ctx: &mut Context) -> TickResult {
        let count = match self.count {
            Some(count) => count,
            None => ctx.get_parse("count").unwrap_or(0),
        };
        println!("CountDown ticks {count}");
        if 0 < count {
            self.count = Some(count - 1);
            Ok(BehaviorResult::Running)
        } else {
            Ok(BehaviorResult::Success)
        }
    }
}

const SRC: &str = r#"
tree main = Sequence {
    CountDown (count <- "3")
    Print(input <- "Boom!")
}
"#;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let tree_source = parse(SRC)?;

    let mut registry = Registry::default();
    registry.register("Print", boxify(|| PrintNode));
    registry.register("CountDown", boxify(|| CountDownNode { count: None }));

    let mut tree = load(&tree_source, &registry)?.ok_or_else(|| anyhow!("no tree to load"))?;

    let mut blackboard = Blackboard::new();
    loop {
        let res = tick_node(&mut tree, &mut blackboard)?;
        println!("tick: {res:?}");
        if res != BehaviorResult::Running {
            break;
        }
    }

    Ok(())
}
