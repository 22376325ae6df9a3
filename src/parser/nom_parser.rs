use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, multispace0, none_of},
    combinator::{cut, opt, recognize},
    error::ErrorKind,
    multi::many0,
    sequence::{delimited, pair, preceded},
    IResult,
};

use crate::error::ParseError;
use crate::PortType;


/// A node call in the AST. `ty` is either a registered node type or the
/// name of another `tree` (a subtree call).
#[derive(Debug, PartialEq, Eq)]
pub struct TreeDef<'src> {
    pub(crate) ty: &'src str,
    pub(crate) port_maps: Vec<PortMap<'src>>,
    pub(crate) children: Vec<TreeDef<'src>>,
    pub(crate) vars: Vec<VarDef<'src>>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct VarDef<'src> {
    pub(crate) name: &'src str,
    pub(crate) init: Option<&'src str>,
}

/// The right-hand side of a port map arrow: a blackboard variable name or
/// a string literal. Escapes are not supported, so a literal borrows the
/// inner span of the source.
#[derive(Debug, PartialEq, Eq)]
pub enum BlackboardValue<'src> {
    Ref(&'src str),
    Literal(&'src str),
}

#[derive(Debug, PartialEq, Eq)]
pub struct PortMap<'src> {
    pub(crate) ty: PortType,
    pub(crate) node_port: &'src str,
    pub(crate) blackboard_value: BlackboardValue<'src>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct PortDef<'src> {
    pub(crate) direction: PortType,
    pub(crate) name: &'src str,
}

#[derive(Debug, PartialEq, Eq)]
pub struct TreeRootDef<'src> {
    pub(crate) name: &'src str,
    pub(crate) root: TreeDef<'src>,
    pub(crate) ports: Vec<PortDef<'src>>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct TreeSource<'src> {
    pub tree_defs: Vec<TreeRootDef<'src>>,
}

/// A statement inside a block: a node call or a `var` declaration.
#[derive(Debug, PartialEq, Eq)]
enum TreeElem<'src> {
    Node(TreeDef<'src>),
    Var(VarDef<'src>),
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(input)
}

/// Match a whole identifier against a keyword, so that e.g. `treehouse`
/// is not mistaken for `tree house`.
fn keyword(word: &'static str) -> impl Fn(&str) -> IResult<&str, &str> {
    move |i: &str| {
        let (r, id) = preceded(multispace0, identifier)(i)?;
        if id == word {
            Ok((r, id))
        } else {
            Err(nom::Err::Error(nom::error::Error::new(i, ErrorKind::Tag)))
        }
    }
}

fn bb_ref(i: &str) -> IResult<&str, BlackboardValue> {
    let (i, s) = identifier(i)?;
    Ok((i, BlackboardValue::Ref(s)))
}

fn str_literal(i: &str) -> IResult<&str, BlackboardValue> {
    let (i, val) = delimited(char('"'), recognize(many0(none_of("\""))), char('"'))(i)?;
    Ok((i, BlackboardValue::Literal(val)))
}

fn port_map(i: &str) -> IResult<&str, PortMap> {
    let (i, node_port) = preceded(multispace0, identifier)(i)?;

    let (i, arrow) = preceded(multispace0, alt((tag("<->"), tag("<-"), tag("->"))))(i)?;

    let ty = match arrow {
        "<-" => PortType::Input,
        "->" => PortType::Output,
        "<->" => PortType::InOut,
        _ => {
            return Err(nom::Err::Failure(nom::error::Error::new(
                i,
                ErrorKind::Alt,
            )))
        }
    };

    let (i, blackboard_value) = preceded(multispace0, alt((bb_ref, str_literal)))(i)?;

    // You cannot output to a literal! It is a parse error rather than a runtime error.
    if let BlackboardValue::Literal(_) = blackboard_value {
        if !matches!(ty, PortType::Input) {
            return Err(nom::Err::Failure(nom::error::Error::new(
                i,
                ErrorKind::Verify,
            )));
        }
    }

    Ok((
        i,
        PortMap {
            ty,
            node_port,
            blackboard_value,
        },
    ))
}

fn port_maps(i: &str) -> IResult<&str, Vec<PortMap>> {
    many0(delimited(
        multispace0,
        port_map,
        opt(preceded(multispace0, char(','))),
    ))(i)
}

fn port_maps_parens(i: &str) -> IResult<&str, Vec<PortMap>> {
    let (i, _) = preceded(multispace0, char('('))(i)?;
    let (i, maps) = port_maps(i)?;
    let (i, _) = cut(preceded(multispace0, char(')')))(i)?;
    Ok((i, maps))
}

fn port_def(i: &str) -> IResult<&str, PortDef> {
    let (i, direction) = preceded(multispace0, identifier)(i)?;
    let direction = match direction {
        "in" => PortType::Input,
        "out" => PortType::Output,
        "inout" => PortType::InOut,
        _ => return Err(nom::Err::Error(nom::error::Error::new(i, ErrorKind::Tag))),
    };
    let (i, name) = cut(preceded(multispace0, identifier))(i)?;
    Ok((i, PortDef { direction, name }))
}

fn subtree_ports_def(i: &str) -> IResult<&str, Vec<PortDef>> {
    let (i, _) = preceded(multispace0, char('('))(i)?;
    let (i, ports) = many0(delimited(
        multispace0,
        port_def,
        opt(preceded(multispace0, char(','))),
    ))(i)?;
    let (i, _) = cut(preceded(multispace0, char(')')))(i)?;
    Ok((i, ports))
}

fn tree_children_block(i: &str) -> IResult<&str, Vec<TreeElem>> {
    let (i, _) = preceded(multispace0, char('{'))(i)?;
    let (i, elems) = many0(tree_elem)(i)?;
    let (i, _) = cut(preceded(multispace0, char('}')))(i)?;
    Ok((i, elems))
}

/// Synthetic `SetBool(value <- "<init>", output -> <name>)` standing in
/// for a `var` initializer.
fn set_bool_def<'src>(name: &'src str, init: &'src str) -> TreeDef<'src> {
    TreeDef {
        ty: "SetBool",
        port_maps: vec![
            PortMap {
                ty: PortType::Input,
                node_port: "value",
                blackboard_value: BlackboardValue::Literal(init),
            },
            PortMap {
                ty: PortType::Output,
                node_port: "output",
                blackboard_value: BlackboardValue::Ref(name),
            },
        ],
        children: vec![],
        vars: vec![],
    }
}

/// Fold a block's statements into a node: `var` declarations are recorded
/// and, when initialized, desugar into a synthetic SetBool child at the
/// position where the statement appeared.
fn tree_def_from_elems<'src>(
    ty: &'src str,
    port_maps: Vec<PortMap<'src>>,
    elems: Vec<TreeElem<'src>>,
) -> TreeDef<'src> {
    let mut children = vec![];
    let mut vars = vec![];
    for elem in elems {
        match elem {
            TreeElem::Node(node) => children.push(node),
            TreeElem::Var(var) => {
                if let Some(init) = var.init {
                    children.push(set_bool_def(var.name, init));
                }
                vars.push(var);
            }
        }
    }
    TreeDef {
        ty,
        port_maps,
        children,
        vars,
    }
}

fn parse_tree_node(i: &str) -> IResult<&str, TreeDef> {
    let (i, ty) = preceded(multispace0, identifier)(i)?;
    let (i, port_maps) = opt(port_maps_parens)(i)?;
    let (i, elems) = opt(tree_children_block)(i)?;
    Ok((
        i,
        tree_def_from_elems(ty, port_maps.unwrap_or_default(), elems.unwrap_or_default()),
    ))
}

/// `if (cond) { .. } else { .. }` desugars into a synthetic `if` node with
/// the condition and the branches wrapped into synthetic Sequences.
/// `i` points just past the `if` keyword.
fn if_stmt(i: &str) -> IResult<&str, TreeElem> {
    let (i, _) = cut(preceded(multispace0, char('(')))(i)?;
    let (i, condition) = cut(parse_tree_node)(i)?;
    let (i, _) = cut(preceded(multispace0, char(')')))(i)?;
    let (i, then_elems) = cut(tree_children_block)(i)?;
    let (i, else_elems) = opt(preceded(keyword("else"), cut(tree_children_block)))(i)?;

    let mut children = vec![condition, tree_def_from_elems("Sequence", vec![], then_elems)];
    if let Some(elems) = else_elems {
        children.push(tree_def_from_elems("Sequence", vec![], elems));
    }

    Ok((
        i,
        TreeElem::Node(TreeDef {
            ty: "if",
            port_maps: vec![],
            children,
            vars: vec![],
        }),
    ))
}

/// `var x` or `var x = true|false`. `i` points just past the `var` keyword.
fn var_stmt(i: &str) -> IResult<&str, TreeElem> {
    let (i, name) = cut(preceded(multispace0, identifier))(i)?;
    let (i, eq) = opt(preceded(multispace0, char('=')))(i)?;
    if eq.is_none() {
        return Ok((i, TreeElem::Var(VarDef { name, init: None })));
    }
    let (r, init) = cut(preceded(multispace0, identifier))(i)?;
    if init != "true" && init != "false" {
        return Err(nom::Err::Failure(nom::error::Error::new(
            i,
            ErrorKind::Verify,
        )));
    }
    Ok((
        r,
        TreeElem::Var(VarDef {
            name,
            init: Some(init),
        }),
    ))
}

/// Statement dispatch keyed on the leading identifier; anything that is
/// not `if` or `var` backtracks into a plain node call.
fn tree_elem(i: &str) -> IResult<&str, TreeElem> {
    let (r, head) = preceded(multispace0, identifier)(i)?;
    match head {
        "if" => if_stmt(r),
        "var" => var_stmt(r),
        _ => {
            let (i, node) = parse_tree_node(i)?;
            Ok((i, TreeElem::Node(node)))
        }
    }
}

pub(crate) fn parse_tree(i: &str) -> IResult<&str, TreeRootDef> {
    let (i, _) = keyword("tree")(i)?;
    let (i, name) = cut(preceded(multispace0, identifier))(i)?;
    let (i, ports) = opt(subtree_ports_def)(i)?;
    let (i, _) = cut(preceded(multispace0, char('=')))(i)?;
    let (i, root) = cut(tree_elem)(i)?;

    match root {
        TreeElem::Node(root) => Ok((
            i,
            TreeRootDef {
                name,
                root,
                ports: ports.unwrap_or_default(),
            },
        )),
        // A `var` has no behavior to tick.
        TreeElem::Var(_) => Err(nom::Err::Failure(nom::error::Error::new(
            i,
            ErrorKind::Verify,
        ))),
    }
}

/// Low-level entry point: parse as many `tree` definitions as possible and
/// return the remaining input, so the grammar can be embedded in a larger
/// document.
pub fn parse_file(i: &str) -> IResult<&str, TreeSource> {
    let (i, tree_defs) = many0(parse_tree)(i)?;

    // Eat up trailing whitespace to indicate that the input was thoroughly consumed
    let (i, _) = multispace0(i)?;

    Ok((i, TreeSource { tree_defs }))
}

/// High-level entry point: the whole input must consist of `tree`
/// definitions. Trailing non-whitespace is an error.
pub fn parse(source: &str) -> Result<TreeSource, ParseError> {
    let mut tree_defs = vec![];
    let mut rest = source.trim_start();
    while !rest.is_empty() {
        match parse_tree(rest) {
            Ok((r, tree)) => {
                tree_defs.push(tree);
                rest = r.trim_start();
            }
            Err(e) => return Err(describe_error(&e, rest)),
        }
    }
    Ok(TreeSource { tree_defs })
}

fn describe_error(e: &nom::Err<nom::error::Error<&str>>, fallback: &str) -> ParseError {
    let (input, kind) = match e {
        nom::Err::Error(e) | nom::Err::Failure(e) => (e.input, e.code),
        nom::Err::Incomplete(_) => (fallback, ErrorKind::Eof),
    };
    ParseError::new(format!(
        "expected {} near {:?}",
        kind.description(),
        snippet(input)
    ))
}

fn snippet(i: &str) -> String {
    i.lines().next().unwrap_or("").chars().take(40).collect()
}
