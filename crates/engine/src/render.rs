//! ASCII rendering of ensemble trees for diagnostics.
//!
//! Pre-order walk with branch connectors. The output is stable for a given
//! tree shape but carries no contract beyond being readable and
//! depth-respecting.

use crate::arena::NodeId;
use crate::node::{Node, NodeKind};
use crate::tree::EnsembleTree;
use trousseau_core::Result;

impl EnsembleTree {
    /// Render the subtree rooted at `id` as an indented ASCII tree.
    pub fn render(&self, id: NodeId) -> Result<String> {
        let mut out = String::new();
        out.push_str(&label(self.node(id)?));
        out.push('\n');
        self.render_children(id, "", &mut out)?;
        Ok(out)
    }

    fn render_children(&self, id: NodeId, prefix: &str, out: &mut String) -> Result<()> {
        let children = self.node(id)?.children().to_vec();
        let count = children.len();
        for (position, child) in children.into_iter().enumerate() {
            let last = position + 1 == count;
            let node = self.node(child)?;
            out.push_str(prefix);
            out.push_str(if last { "└─ " } else { "├─ " });
            out.push_str(&label(node));
            out.push('\n');
            if node.is_ensemble() {
                let nested = format!("{}{}", prefix, if last { "   " } else { "│  " });
                self.render_children(child, &nested, out)?;
            }
        }
        Ok(())
    }
}

fn label(node: &Node) -> String {
    match &node.kind {
        NodeKind::Garment(garment) => format!("{} [{}]", node.name, garment.reference),
        NodeKind::Ensemble { children } => {
            format!("{} ({} hijos)", node.name, children.len())
        }
    }
}
