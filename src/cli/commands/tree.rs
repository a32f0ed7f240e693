//! cri tree - Print the content tree

use clap::Args;
use console::style;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::emit_json;
use crate::content::{ContentContext, ContentRepository, NodeRef, path};
use crate::error::{CriError, Result};

#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Path of the subtree root
    #[arg(default_value = "/")]
    pub path: String,

    /// Maximum depth below the subtree root
    #[arg(long)]
    pub depth: Option<usize>,
}

#[derive(Debug, Serialize)]
struct TreeNode {
    identifier: String,
    path: String,
    name: String,
    node_type: String,
    hidden: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<TreeNode>,
}

pub fn run(ctx: &AppContext, args: &TreeArgs) -> Result<()> {
    let tree = build(&ctx.db, &ctx.config.context, &args.path, args.depth)?;

    if ctx.robot_mode {
        return emit_json(&tree);
    }

    let mut lines = Vec::new();
    render(&tree, 0, &mut lines);
    println!("{}", lines.join("\n"));
    Ok(())
}

fn build(
    repository: &dyn ContentRepository,
    context: &ContentContext,
    at: &str,
    depth: Option<usize>,
) -> Result<TreeNode> {
    let normalized = path::normalize(at)?;
    let start = if normalized == path::ROOT_PATH {
        repository.root_node(context)?
    } else {
        repository
            .node(context, &normalized)?
            .ok_or(CriError::NodeNotFound(normalized))?
    };
    walk(repository, context, start, depth)
}

fn walk(
    repository: &dyn ContentRepository,
    context: &ContentContext,
    node: NodeRef,
    depth: Option<usize>,
) -> Result<TreeNode> {
    let children = if depth == Some(0) {
        Vec::new()
    } else {
        repository
            .children(context, &node)?
            .into_iter()
            .map(|child| walk(repository, context, child, depth.map(|depth| depth - 1)))
            .collect::<Result<Vec<_>>>()?
    };
    Ok(TreeNode {
        identifier: node.identifier,
        path: node.path,
        name: node.name,
        node_type: node.node_type,
        hidden: node.hidden,
        children,
    })
}

fn render(node: &TreeNode, level: usize, lines: &mut Vec<String>) {
    let name = if node.path == path::ROOT_PATH {
        path::ROOT_PATH
    } else {
        node.name.as_str()
    };
    let hidden = if node.hidden { " (hidden)" } else { "" };
    lines.push(format!(
        "{}{} {}{hidden}",
        "  ".repeat(level),
        style(name).bold(),
        style(format!("[{}]", node.node_type)).dim()
    ));
    for child in &node.children {
        render(child, level + 1, lines);
    }
}
