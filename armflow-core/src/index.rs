//! Index - per-pass resource lookup tables
//!
//! Builds the arena of resource nodes and the name/type lookup tables the
//! dependency resolver works against. All state lives in the returned
//! value and is discarded with the pass; nothing is process-wide.

use serde::Serialize;
use std::collections::HashMap;

use crate::template::ResourceDeclaration;

/// 2-D coordinate assigned by the layout engine
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// One node per declared resource, alive for a single resolution pass
#[derive(Debug, Clone)]
pub struct ResourceNode {
    /// Stable per-pass identifier (`resource-<index>`)
    pub id: String,
    /// Declared name, possibly an unevaluated ARM expression string
    pub name: String,
    pub resource_type: String,
    pub location: Option<String>,
    pub properties: Option<serde_json::Value>,
    /// Raw `dependsOn` expressions as declared
    pub depends_on: Vec<String>,
    /// Child node indices into the arena. A parent's list is the only
    /// place a child link is stored; nodes hold no parent back-reference.
    pub children: Vec<usize>,
    /// Depth in the resolved forest, roots at 0
    pub level: usize,
    /// Leaf count of this node's subtree, at least 1
    pub subtree_size: usize,
    pub position: Position,
}

/// Lookup tables over one template's resources
#[derive(Debug, Default)]
pub struct ResourceIndex {
    pub(crate) nodes: Vec<ResourceNode>,
    /// Raw declared name -> node index; later declarations win on collision
    by_name: HashMap<String, usize>,
    /// Declared type -> node indices in declaration order
    by_type: HashMap<String, Vec<usize>>,
}

impl ResourceIndex {
    /// Build the arena and lookup tables from the declared resource list
    pub fn build(resources: &[ResourceDeclaration]) -> Self {
        let mut index = Self {
            nodes: Vec::with_capacity(resources.len()),
            by_name: HashMap::new(),
            by_type: HashMap::new(),
        };

        for (i, resource) in resources.iter().enumerate() {
            let name = resource
                .name
                .clone()
                .unwrap_or_else(|| format!("Resource {i}"));
            let resource_type = resource
                .resource_type
                .clone()
                .unwrap_or_else(|| "Unknown".to_string());

            index.nodes.push(ResourceNode {
                id: format!("resource-{i}"),
                name: name.clone(),
                resource_type: resource_type.clone(),
                location: resource.location.clone(),
                properties: resource.properties.clone(),
                depends_on: resource.depends_on.clone(),
                children: Vec::new(),
                level: 0,
                subtree_size: 1,
                position: Position::default(),
            });

            // Exact-name lookup is a fast path, not the sole resolution
            // mechanism; collisions fall back to the type buckets
            index.by_name.insert(name, i);
            index.by_type.entry(resource_type).or_default().push(i);
        }

        index
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[ResourceNode] {
        &self.nodes
    }

    pub(crate) fn into_nodes(self) -> Vec<ResourceNode> {
        self.nodes
    }

    /// Exact lookup by raw declared name
    pub(crate) fn lookup_name(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Nodes of the given declared type, in declaration order
    pub(crate) fn of_type(&self, resource_type: &str) -> &[usize] {
        self.by_type
            .get(resource_type)
            .map_or(&[], |bucket| bucket.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodes_get_stable_ids_and_defaults() {
        let resources = vec![
            ResourceDeclaration::new("Microsoft.Network/virtualNetworks", "vnet1"),
            ResourceDeclaration::new("Microsoft.Network/subnets", "subnet1"),
        ];
        let index = ResourceIndex::build(&resources);

        assert_eq!(index.len(), 2);
        assert_eq!(index.nodes()[0].id, "resource-0");
        assert_eq!(index.nodes()[1].id, "resource-1");
        assert_eq!(index.nodes()[0].level, 0);
        assert_eq!(index.nodes()[0].subtree_size, 1);
        assert_eq!(index.nodes()[0].position, Position::default());
    }

    #[test]
    fn missing_name_and_type_get_placeholders() {
        let resources = vec![ResourceDeclaration {
            name: None,
            resource_type: None,
            api_version: None,
            location: None,
            properties: None,
            depends_on: Vec::new(),
        }];
        let index = ResourceIndex::build(&resources);

        assert_eq!(index.nodes()[0].name, "Resource 0");
        assert_eq!(index.nodes()[0].resource_type, "Unknown");
        assert_eq!(index.lookup_name("Resource 0"), Some(0));
    }

    #[test]
    fn type_buckets_keep_declaration_order() {
        let resources = vec![
            ResourceDeclaration::new("Microsoft.Compute/virtualMachines", "vm-a"),
            ResourceDeclaration::new("Microsoft.Network/virtualNetworks", "vnet1"),
            ResourceDeclaration::new("Microsoft.Compute/virtualMachines", "vm-b"),
        ];
        let index = ResourceIndex::build(&resources);

        assert_eq!(index.of_type("Microsoft.Compute/virtualMachines"), &[0, 2]);
        assert_eq!(index.of_type("Microsoft.Network/virtualNetworks"), &[1]);
        assert!(index.of_type("Microsoft.Storage/storageAccounts").is_empty());
    }

    #[test]
    fn name_collisions_are_last_write_wins() {
        let resources = vec![
            ResourceDeclaration::new("Microsoft.Compute/virtualMachines", "shared"),
            ResourceDeclaration::new("Microsoft.Network/virtualNetworks", "shared"),
        ];
        let index = ResourceIndex::build(&resources);

        assert_eq!(index.lookup_name("shared"), Some(1));
        // Earlier node remains reachable through its type bucket
        assert_eq!(index.of_type("Microsoft.Compute/virtualMachines"), &[0]);
    }
}
