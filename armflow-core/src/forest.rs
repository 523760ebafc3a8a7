//! Forest - dependency forest construction
//!
//! Assembles resolved parent/child links into root-anchored trees and
//! exposes the traversals the diagram layer consumes.

use serde::Serialize;

use crate::index::{ResourceIndex, ResourceNode};
use crate::resolver::{self, ResolverConfig};
use crate::template::ResourceDeclaration;

/// A directed edge between two diagram nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagramEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl DiagramEdge {
    pub(crate) fn between(source: &str, target: &str) -> Self {
        Self {
            id: format!("{source}-{target}"),
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

/// Resource dependency forest for one template snapshot
///
/// Nodes live in an arena in declaration order; `roots` lists the indices
/// of nodes without a resolved parent, ascending.
#[derive(Debug)]
pub struct DependencyForest {
    nodes: Vec<ResourceNode>,
    roots: Vec<usize>,
}

/// Index resources, resolve dependencies and collect the forest roots
pub fn build_forest(
    resources: &[ResourceDeclaration],
    config: &ResolverConfig,
) -> DependencyForest {
    let mut index = ResourceIndex::build(resources);
    let has_parent = resolver::resolve(&mut index, config);
    let roots = (0..index.len()).filter(|i| !has_parent.contains(i)).collect();

    DependencyForest {
        nodes: index.into_nodes(),
        roots,
    }
}

impl DependencyForest {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[ResourceNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> &ResourceNode {
        &self.nodes[index]
    }

    pub(crate) fn node_mut(&mut self, index: usize) -> &mut ResourceNode {
        &mut self.nodes[index]
    }

    /// Root node indices in ascending declaration order
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Every node exactly once, pre-order from the roots
    pub fn flatten(&self) -> Vec<&ResourceNode> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();
        while let Some(i) = stack.pop() {
            out.push(&self.nodes[i]);
            stack.extend(self.nodes[i].children.iter().rev().copied());
        }
        out
    }

    /// Parent -> child edges in pre-order
    pub fn edges(&self) -> Vec<DiagramEdge> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();
        while let Some(i) = stack.pop() {
            let node = &self.nodes[i];
            for &child in &node.children {
                out.push(DiagramEdge::between(&node.id, &self.nodes[child].id));
            }
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// ASCII rendering of the forest for terminal display
    pub fn format_tree(&self) -> String {
        let mut out = String::new();
        for &root in &self.roots {
            let node = &self.nodes[root];
            out.push_str(&format!("{} ({})\n", node.name, node.resource_type));
            for (pos, &child) in node.children.iter().enumerate() {
                self.format_subtree(child, "", pos + 1 == node.children.len(), &mut out);
            }
        }
        out
    }

    fn format_subtree(&self, index: usize, prefix: &str, last: bool, out: &mut String) {
        let node = &self.nodes[index];
        let connector = if last { "└── " } else { "├── " };
        out.push_str(&format!(
            "{prefix}{connector}{} ({})\n",
            node.name, node.resource_type
        ));

        let child_prefix = format!("{prefix}{}", if last { "    " } else { "│   " });
        for (pos, &child) in node.children.iter().enumerate() {
            self.format_subtree(child, &child_prefix, pos + 1 == node.children.len(), out);
        }
    }
}
