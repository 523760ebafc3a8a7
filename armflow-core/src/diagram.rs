//! Diagram - node/edge output assembly
//!
//! Flattens a resolved, positioned forest into the node and edge lists a
//! renderer consumes, and optionally wraps it in the full document graph:
//! a template root, the parameter chain, and category nodes anchoring the
//! resource forest.

use serde::Serialize;
use serde_json::json;

use crate::forest::{self, DependencyForest, DiagramEdge};
use crate::index::{Position, ResourceNode};
use crate::layout::{self, LayoutConfig, Orientation};
use crate::resolver::ResolverConfig;
use crate::template::ArmTemplate;

/// Kind of diagram node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Template,
    Category,
    Parameter,
    Resource,
}

/// One positioned node in the output diagram
#[derive(Debug, Clone, Serialize)]
pub struct DiagramNode {
    pub id: String,
    pub kind: NodeKind,
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "defaultValue", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<usize>,
    pub position: Position,
}

impl DiagramNode {
    fn resource(node: &ResourceNode) -> Self {
        Self {
            id: node.id.clone(),
            kind: NodeKind::Resource,
            name: node.name.clone(),
            resource_type: Some(node.resource_type.clone()),
            location: node.location.clone(),
            description: None,
            default_value: None,
            properties: node.properties.clone(),
            level: Some(node.level),
            position: node.position,
        }
    }

    fn scaffold(id: &str, kind: NodeKind, name: &str, position: Position) -> Self {
        Self {
            id: id.to_string(),
            kind,
            name: name.to_string(),
            resource_type: None,
            location: None,
            description: None,
            default_value: None,
            properties: None,
            level: None,
            position,
        }
    }
}

/// A complete diagram: positioned nodes plus directed edges
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagram {
    pub nodes: Vec<DiagramNode>,
    pub edges: Vec<DiagramEdge>,
}

/// Document-graph geometry
#[derive(Debug, Clone)]
pub struct DiagramConfig {
    pub resolver: ResolverConfig,
    pub layout: LayoutConfig,
    /// Template root node position
    pub root_position: Position,
    /// Distance between the parameter and resource branches
    pub category_spacing: f64,
    /// Offset from the root to the category nodes
    pub category_offset: f64,
    /// Spacing between consecutive parameter nodes
    pub parameter_spacing: f64,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            resolver: ResolverConfig::default(),
            layout: LayoutConfig::default(),
            root_position: Position { x: 600.0, y: 50.0 },
            category_spacing: 500.0,
            category_offset: 200.0,
            parameter_spacing: 140.0,
        }
    }
}

/// Flatten a positioned forest into renderer nodes and edges.
///
/// The forest must already have been through [`layout::layout`]; this
/// function only reshapes, it does not position.
pub fn render_forest(forest: &DependencyForest) -> Diagram {
    Diagram {
        nodes: forest.flatten().into_iter().map(DiagramNode::resource).collect(),
        edges: forest.edges(),
    }
}

/// Build the full document diagram for a template: template root,
/// parameter chain, category nodes and the positioned resource forest
pub fn build_diagram(template: &ArmTemplate, config: &DiagramConfig) -> Diagram {
    let mut diagram = Diagram::default();
    let root = &config.root_position;

    let mut template_node =
        DiagramNode::scaffold("root-template", NodeKind::Template, "ARM Template", *root);
    template_node.properties = Some(json!({
        "schema": template.schema,
        "contentVersion": template.content_version,
        "parameterCount": template.parameters.len(),
        "resourceCount": template.resources.len(),
    }));
    diagram.nodes.push(template_node);

    if !template.parameters.is_empty() {
        add_parameter_branch(&mut diagram, template, config);
    }

    if !template.resources.is_empty() {
        add_resource_branch(&mut diagram, template, config);
    }

    diagram
}

fn add_parameter_branch(diagram: &mut Diagram, template: &ArmTemplate, config: &DiagramConfig) {
    let category_position = Position {
        x: config.root_position.x - config.category_spacing / 2.0,
        y: config.root_position.y + config.category_offset,
    };

    let mut category = DiagramNode::scaffold(
        "category-parameters",
        NodeKind::Category,
        "Parameters",
        category_position,
    );
    category.properties = Some(json!({ "count": template.parameters.len() }));
    diagram.nodes.push(category);
    diagram
        .edges
        .push(DiagramEdge::between("root-template", "category-parameters"));

    // Parameters hang off the category in a linear chain
    let mut previous = "category-parameters".to_string();
    for (i, (name, definition)) in template.parameters.iter().enumerate() {
        let id = format!("param-{name}");
        let mut node = DiagramNode::scaffold(
            &id,
            NodeKind::Parameter,
            name,
            Position {
                x: category_position.x,
                y: category_position.y + config.parameter_spacing * (i + 1) as f64,
            },
        );
        node.resource_type = definition.parameter_type.clone();
        node.description = definition.description().map(str::to_string);
        node.default_value = definition.default_value.clone();
        diagram.nodes.push(node);

        diagram.edges.push(DiagramEdge::between(&previous, &id));
        previous = id;
    }
}

fn add_resource_branch(diagram: &mut Diagram, template: &ArmTemplate, config: &DiagramConfig) {
    let category_position = Position {
        x: config.root_position.x + config.category_spacing / 2.0,
        y: config.root_position.y + config.category_offset,
    };

    let mut category = DiagramNode::scaffold(
        "category-resources",
        NodeKind::Category,
        "Resources",
        category_position,
    );
    category.properties = Some(json!({ "count": template.resources.len() }));
    diagram.nodes.push(category);
    diagram
        .edges
        .push(DiagramEdge::between("root-template", "category-resources"));

    let mut forest = forest::build_forest(&template.resources, &config.resolver);

    // Anchor the forest one level below (or beside) the category node
    let mut layout_config = config.layout.clone();
    match layout_config.orientation {
        Orientation::TopDown => {
            layout_config.origin_x = category_position.x - 100.0;
            layout_config.origin_y = category_position.y + layout_config.level_spacing;
        }
        Orientation::LeftToRight => {
            layout_config.origin_x = category_position.x + layout_config.level_spacing;
            layout_config.origin_y = category_position.y - 100.0;
        }
    }
    layout::layout(&mut forest, &layout_config);

    for &root in forest.roots() {
        diagram.edges.push(DiagramEdge::between(
            "category-resources",
            &forest.node(root).id,
        ));
    }

    let rendered = render_forest(&forest);
    diagram.nodes.extend(rendered.nodes);
    diagram.edges.extend(rendered.edges);
}
