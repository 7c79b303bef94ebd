/*
Rendering lives behind a trait so the display layer stays outside the domain:
the tree knows nothing about termtree or display settings.
 */
use termtree::Tree;
use tracing::instrument;

use crate::config::DisplayConfig;
use crate::domain::{ConnectionTree, NodeId, TreeNode};

pub trait TreeNodeConvert {
    fn to_tree_string(&self, display: &DisplayConfig) -> Tree<String>;
}

impl TreeNodeConvert for ConnectionTree {
    fn to_tree_string(&self, display: &DisplayConfig) -> Tree<String> {
        subtree_to_tree_string(self, self.root(), display)
    }
}

/// Render the subtree rooted at `start`; unknown ids render a placeholder.
#[instrument(level = "debug", skip(tree, display))]
pub fn subtree_to_tree_string(tree: &ConnectionTree, start: NodeId, display: &DisplayConfig) -> Tree<String> {
    fn build(tree: &ConnectionTree, node: &TreeNode, display: &DisplayConfig) -> Tree<String> {
        let mut branch = Tree::new(label(node, display));
        let collapsed = node.as_container().is_some_and(|c| !c.is_expanded());
        if collapsed && !display.show_collapsed {
            return branch;
        }
        for &child in node.children() {
            if let Ok(child_node) = tree.node(child) {
                branch.push(build(tree, child_node, display));
            }
        }
        branch
    }

    match tree.node(start) {
        Ok(node) => build(tree, node, display),
        Err(_) => Tree::new("Empty tree".to_string()),
    }
}

/// One-line label for a node.
pub fn label(node: &TreeNode, display: &DisplayConfig) -> String {
    let mut text = String::new();
    if display.show_kind {
        text.push_str(if node.is_container() { "[+] " } else { "- " });
    }
    text.push_str(node.name());
    let props = node.properties();
    if display.show_endpoint && !node.is_container() && !props.hostname.is_empty() {
        text.push_str(&format!("  {}://{}:{}", props.protocol, props.hostname, props.port));
    }
    text
}
