use std::cell::RefCell;
use std::rc::Rc;

use ticktree::error::TickError;
use ticktree::{
    boxify, load, load_yaml, parse, tick_node, BehaviorNode, BehaviorResult, Blackboard, Context,
    Registry, Symbol, TickResult,
};

type Log = Rc<RefCell<Vec<String>>>;

struct PrintNode {
    log: Log,
}

impl BehaviorNode for PrintNode {
    fn tick(&mut self, ctx: &mut Context) -> TickResult {
        let message = ctx.get("input").unwrap_or("<absent>");
        self.log.borrow_mut().push(message.to_string());
        Ok(BehaviorResult::Success)
    }
}

/// Returns Running while its internal counter, armed from the `count`
/// port on the first tick, is above zero.
struct CountDownNode {
    count: Option<i32>,
}

impl BehaviorNode for CountDownNode {
    fn tick(&mut self, ctx: &mut Context) -> TickResult {
        let count = match self.count {
            Some(count) => count,
            None => ctx.get_parse("count").unwrap_or(0),
        };
        if 0 < count {
            self.count = Some(count - 1);
            Ok(BehaviorResult::Running)
        } else {
            Ok(BehaviorResult::Success)
        }
    }
}

struct SetValueNode;

impl BehaviorNode for SetValueNode {
    fn tick(&mut self, ctx: &mut Context) -> TickResult {
        let value = ctx.get("input").map(str::to_string);
        if let Some(value) = value {
            ctx.set("output", value)?;
        }
        Ok(BehaviorResult::Success)
    }
}

fn test_registry(log: &Log) -> Registry {
    let mut registry = Registry::default();
    let print_log = log.clone();
    registry.register(
        "Print",
        boxify(move || PrintNode {
            log: print_log.clone(),
        }),
    );
    registry.register("CountDown", boxify(|| CountDownNode { count: None }));
    registry.register("SetValue", boxify(|| SetValueNode));
    registry
}

#[test]
fn print_literal() {
    let log = Log::default();
    let tree_source = parse(
        r#"tree main = Sequence {
    true
    Print(input <- "hi")
}"#,
    )
    .unwrap();
    let mut tree = load(&tree_source, &test_registry(&log)).unwrap().unwrap();

    let mut blackboard = Blackboard::new();
    assert_eq!(
        tick_node(&mut tree, &mut blackboard),
        Ok(BehaviorResult::Success)
    );
    assert_eq!(*log.borrow(), vec!["hi".to_string()]);
}

#[test]
fn countdown_resumes_across_ticks() {
    let log = Log::default();
    let tree_source = parse(
        r#"tree main = Sequence {
    CountDown(count <- "3")
    Print(input <- "Boom!")
}"#,
    )
    .unwrap();
    let mut tree = load(&tree_source, &test_registry(&log)).unwrap().unwrap();

    let mut blackboard = Blackboard::new();
    for _ in 0..3 {
        assert_eq!(
            tick_node(&mut tree, &mut blackboard),
            Ok(BehaviorResult::Running)
        );
        assert!(log.borrow().is_empty());
    }
    assert_eq!(
        tick_node(&mut tree, &mut blackboard),
        Ok(BehaviorResult::Success)
    );
    assert_eq!(*log.borrow(), vec!["Boom!".to_string()]);
}

#[test]
fn repeat_ticks_child_n_minus_one_times() {
    let log = Log::default();
    let tree_source = parse(
        r#"tree main = Repeat(n <- "5") {
    Print(input <- "Hello")
}"#,
    )
    .unwrap();
    let mut tree = load(&tree_source, &test_registry(&log)).unwrap().unwrap();

    let mut blackboard = Blackboard::new();
    let mut ticks = 0;
    loop {
        ticks += 1;
        match tick_node(&mut tree, &mut blackboard).unwrap() {
            BehaviorResult::Running => continue,
            res => {
                assert_eq!(res, BehaviorResult::Success);
                break;
            }
        }
    }
    assert_eq!(ticks, 5);
    // The final tick sees the exhausted counter and succeeds without
    // ticking the child.
    assert_eq!(*log.borrow(), vec!["Hello".to_string(); 4]);
}

#[test]
fn if_else_picks_the_else_branch() {
    let log = Log::default();
    let tree_source = parse(
        r#"tree main = if (false) {
    Print(input <- "t")
} else {
    Print(input <- "f")
}"#,
    )
    .unwrap();
    let mut tree = load(&tree_source, &test_registry(&log)).unwrap().unwrap();

    let mut blackboard = Blackboard::new();
    assert_eq!(
        tick_node(&mut tree, &mut blackboard),
        Ok(BehaviorResult::Success)
    );
    assert_eq!(*log.borrow(), vec!["f".to_string()]);
}

#[test]
fn subtree_parameter_passing() {
    let log = Log::default();
    let tree_source = parse(
        r#"
tree main = Sequence {
    SubTree(param <- "Hello")
}

tree SubTree(in param) = Sequence {
    Print(input <- param)
}
"#,
    )
    .unwrap();
    let mut tree = load(&tree_source, &test_registry(&log)).unwrap().unwrap();

    let mut blackboard = Blackboard::new();
    assert_eq!(
        tick_node(&mut tree, &mut blackboard),
        Ok(BehaviorResult::Success)
    );
    assert_eq!(*log.borrow(), vec!["Hello".to_string()]);
    // The subtree ran against its own blackboard; the caller's is untouched.
    assert!(blackboard.is_empty());
}

#[test]
fn undefined_port_raises_and_restores() {
    let log = Log::default();
    let tree_source = parse(
        r#"tree main = Sequence {
    SetValue(input <- "x", bogus_port -> y)
}"#,
    )
    .unwrap();
    let mut tree = load(&tree_source, &test_registry(&log)).unwrap().unwrap();

    // The leaf writes through its `output` port, which the call site never
    // mapped; the error unwinds through Sequence and the subtree of
    // containers back to the driver.
    let mut blackboard = Blackboard::new();
    assert_eq!(
        tick_node(&mut tree, &mut blackboard),
        Err(TickError::UndefinedPort("output".into()))
    );
    assert!(blackboard.is_empty());
}

#[test]
fn write_to_input_port_raises() {
    let log = Log::default();
    let tree_source = parse(
        r#"tree main = Sequence {
    SetValue(input <- "x", output <- y)
}"#,
    )
    .unwrap();
    let mut tree = load(&tree_source, &test_registry(&log)).unwrap().unwrap();

    let mut blackboard = Blackboard::new();
    assert_eq!(
        tick_node(&mut tree, &mut blackboard),
        Err(TickError::WriteToInputPort("output".into()))
    );
}

#[test]
fn blackboard_roundtrip_between_leaves() {
    let log = Log::default();
    let tree_source = parse(
        r#"tree main = Sequence {
    SetValue(input <- "Hey", output -> greeting)
    Print(input <- greeting)
}"#,
    )
    .unwrap();
    let mut tree = load(&tree_source, &test_registry(&log)).unwrap().unwrap();

    let mut blackboard = Blackboard::new();
    assert_eq!(
        tick_node(&mut tree, &mut blackboard),
        Ok(BehaviorResult::Success)
    );
    assert_eq!(*log.borrow(), vec!["Hey".to_string()]);
    assert_eq!(
        blackboard.get(&Symbol::from("greeting")).map(String::as_str),
        Some("Hey")
    );
}

#[test]
fn two_trees_share_a_blackboard() {
    let log = Log::default();
    let registry = test_registry(&log);

    let writer_source = parse(
        r#"tree main = Sequence {
    SetValue(input <- "shared", output -> channel)
}"#,
    )
    .unwrap();
    let reader_source = parse(
        r#"tree main = Sequence {
    Print(input <- channel)
}"#,
    )
    .unwrap();
    let mut writer = load(&writer_source, &registry).unwrap().unwrap();
    let mut reader = load(&reader_source, &registry).unwrap().unwrap();

    let mut blackboard = Blackboard::new();
    assert_eq!(
        tick_node(&mut writer, &mut blackboard),
        Ok(BehaviorResult::Success)
    );
    assert_eq!(
        tick_node(&mut reader, &mut blackboard),
        Ok(BehaviorResult::Success)
    );
    assert_eq!(*log.borrow(), vec!["shared".to_string()]);
}

#[test]
fn yaml_front_end() {
    let log = Log::default();
    let registry = test_registry(&log);

    let mut trees = load_yaml(
        r#"
behavior_tree:
  main:
    type: Sequence
    children:
      - type: Print
        ports:
          input: message
"#,
        &registry,
    )
    .unwrap();
    let tree = trees.get_mut("main").unwrap();

    let mut blackboard = Blackboard::new();
    blackboard.insert("message".into(), "hello".to_string());
    assert_eq!(
        tick_node(tree, &mut blackboard),
        Ok(BehaviorResult::Success)
    );
    assert_eq!(*log.borrow(), vec!["hello".to_string()]);
}
