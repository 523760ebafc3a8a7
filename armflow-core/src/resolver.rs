//! Resolver - dependency resolution strategies
//!
//! Turns each resource's `dependsOn` expressions into parent/child edges
//! using an ordered sequence of matching strategies. Everything here is
//! best effort: a dependency that cannot be matched is dropped and the
//! resource surfaces as a forest root instead of being nested incorrectly.

use log::{debug, trace};
use std::collections::HashSet;

use crate::expression::{ParsedReference, parse_resource_id};
use crate::index::ResourceIndex;

/// Resolver tuning
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Accept keyword matches for common network resource types when the
    /// name-based strategies fail
    pub type_keyword_fallback: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            type_keyword_fallback: true,
        }
    }
}

/// Keyword fallbacks for resource types whose real-world declared names
/// rarely match their reference expressions exactly
const TYPE_KEYWORDS: &[(&str, &[&str])] = &[
    ("Microsoft.Network/publicIPAddresses", &["publicip", "public"]),
    ("Microsoft.Network/virtualNetworks", &["vnet", "virtualnetwork"]),
];

/// Strip ARM expression syntax characters and lowercase for fuzzy comparison
fn clean_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '[' | ']' | '\'' | '"' | '(' | ')'))
        .collect::<String>()
        .to_lowercase()
}

/// Cleaned-substring test: either side may contain the other
fn loose_match(declared: &str, wanted: &str) -> bool {
    let declared = clean_name(declared);
    let wanted = clean_name(wanted);
    !declared.is_empty()
        && !wanted.is_empty()
        && (declared.contains(&wanted) || wanted.contains(&declared))
}

/// Resolve every `dependsOn` entry into parent -> child edges.
///
/// Returns the set of node indices that gained a parent; everything else
/// becomes a forest root. A node keeps at most one parent: the first
/// resolved dependency claims the slot and later entries add no edge.
pub fn resolve(index: &mut ResourceIndex, config: &ResolverConfig) -> HashSet<usize> {
    let mut has_parent = HashSet::new();

    for child in 0..index.len() {
        let deps = index.nodes[child].depends_on.clone();
        if deps.is_empty() {
            continue;
        }
        debug!(
            "resolving {} dependencies of {}",
            deps.len(),
            index.nodes[child].name
        );

        for dep in &deps {
            if has_parent.contains(&child) {
                trace!(
                    "{} already has a parent, remaining dependencies add no edge",
                    index.nodes[child].name
                );
                break;
            }

            let Some(parsed) = parse_resource_id(dep) else {
                debug!("unparsable dependency expression dropped: {dep}");
                continue;
            };

            match find_parent(index, &parsed, config) {
                Some(parent) if parent != child => {
                    attach(index, parent, child, &mut has_parent);
                }
                Some(_) => {
                    debug!(
                        "self-referential dependency of {} dropped: {parsed}",
                        index.nodes[child].name
                    );
                }
                None => {
                    debug!(
                        "unresolved dependency of {}: {parsed}",
                        index.nodes[child].name
                    );
                }
            }
        }
    }

    has_parent
}

/// Ordered matching strategies; first match in declaration order wins
fn find_parent(
    index: &ResourceIndex,
    parsed: &ParsedReference,
    config: &ResolverConfig,
) -> Option<usize> {
    // Strategy A: exact declared-name match
    if let Some(i) = index.lookup_name(&parsed.resource_name) {
        trace!("exact name match: {}", index.nodes[i].name);
        return Some(i);
    }

    // Strategy B: same-type bucket, cleaned-substring match
    for &i in index.of_type(&parsed.resource_type) {
        if loose_match(&index.nodes[i].name, &parsed.resource_name) {
            trace!("type-scoped fuzzy match: {}", index.nodes[i].name);
            return Some(i);
        }
    }

    // Strategy C: global scan with the same substring test
    for (i, node) in index.nodes.iter().enumerate() {
        if node.resource_type == parsed.resource_type
            && loose_match(&node.name, &parsed.resource_name)
        {
            trace!("global fuzzy match: {}", node.name);
            return Some(i);
        }
    }

    // Strategy D: naming-convention fallback for common network types
    if config.type_keyword_fallback
        && let Some((_, keywords)) = TYPE_KEYWORDS
            .iter()
            .find(|(t, _)| *t == parsed.resource_type)
    {
        let wanted = parsed.resource_name.to_lowercase();
        for &i in index.of_type(&parsed.resource_type) {
            let name = index.nodes[i].name.to_lowercase();
            if keywords.iter().any(|k| name.contains(k)) || name.contains(&wanted) {
                trace!("keyword fallback match: {}", index.nodes[i].name);
                return Some(i);
            }
        }
    }

    None
}

/// Record a parent -> child edge, refusing anything that would make the
/// child its own ancestor
fn attach(index: &mut ResourceIndex, parent: usize, child: usize, has_parent: &mut HashSet<usize>) {
    if reachable(index, child, parent) {
        debug!(
            "dependency of {} on {} would create a cycle, dropped",
            index.nodes[child].name, index.nodes[parent].name
        );
        return;
    }

    if !index.nodes[parent].children.contains(&child) {
        index.nodes[parent].children.push(child);
    }
    has_parent.insert(child);
    debug!(
        "{} nested under {}",
        index.nodes[child].name, index.nodes[parent].name
    );
}

/// True if `target` can be reached from `from` through child edges
fn reachable(index: &ResourceIndex, from: usize, target: usize) -> bool {
    let mut visited = HashSet::new();
    let mut stack = vec![from];
    while let Some(i) = stack.pop() {
        if i == target {
            return true;
        }
        if visited.insert(i) {
            stack.extend(index.nodes[i].children.iter().copied());
        }
    }
    false
}
