//! Expression - ARM reference expression parsing
//!
//! `dependsOn` entries carry expressions like
//! `[resourceId('Microsoft.Network/virtualNetworks', variables('vnetName'))]`.
//! This module recovers the `(type, name)` pair from that string form.

use regex::Regex;
use std::sync::LazyLock;

static RESOURCE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"resourceId\s*\(\s*([^,]+)\s*,\s*(.+)\s*\)").unwrap());

static VARIABLES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"variables\s*\(\s*([^)]+?)\s*\)").unwrap());

static PARAMETERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"parameters\s*\(\s*([^)]+?)\s*\)").unwrap());

/// A dependency reference recovered from a `resourceId()` expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReference {
    /// Dotted/slashed resource type (e.g., "Microsoft.Compute/virtualMachines")
    pub resource_type: String,
    /// Resolved name: the inner literal of a `variables()`/`parameters()`
    /// call, or the literal second argument
    pub resource_name: String,
}

impl std::fmt::Display for ParsedReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} '{}'", self.resource_type, self.resource_name)
    }
}

/// Parse a raw `dependsOn` expression into a typed reference.
///
/// Returns `None` for anything that does not look like a two-argument
/// `resourceId()` call; the caller treats that as an unresolvable
/// dependency, never an error. Exactly one level of
/// `variables()`/`parameters()` indirection is unwrapped; deeper nesting
/// (`concat()` of parameters, `copyIndex()`) stays unresolved.
pub fn parse_resource_id(expression: &str) -> Option<ParsedReference> {
    // Brackets and quote characters carry no information after the
    // function shape is known
    let cleaned: String = expression
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '\'' | '"'))
        .collect();

    let caps = RESOURCE_ID.captures(&cleaned)?;
    let resource_type = caps[1].trim().to_string();
    let name_expr = caps[2].trim();

    let resource_name = if let Some(inner) = VARIABLES.captures(name_expr) {
        inner[1].trim().to_string()
    } else if let Some(inner) = PARAMETERS.captures(name_expr) {
        inner[1].trim().to_string()
    } else {
        name_expr.to_string()
    };

    if resource_type.is_empty() || resource_name.is_empty() {
        return None;
    }

    Some(ParsedReference {
        resource_type,
        resource_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_name() {
        let parsed = parse_resource_id(
            "[resourceId('Microsoft.Network/virtualNetworks', 'vnet1')]",
        )
        .unwrap();
        assert_eq!(parsed.resource_type, "Microsoft.Network/virtualNetworks");
        assert_eq!(parsed.resource_name, "vnet1");
    }

    #[test]
    fn variables_indirection() {
        let parsed = parse_resource_id(
            "[resourceId('Microsoft.Network/networkSecurityGroups', variables('networkSecurityGroupName'))]",
        )
        .unwrap();
        assert_eq!(
            parsed.resource_type,
            "Microsoft.Network/networkSecurityGroups"
        );
        assert_eq!(parsed.resource_name, "networkSecurityGroupName");
    }

    #[test]
    fn parameters_indirection() {
        let parsed = parse_resource_id(
            "[resourceId('Microsoft.Storage/storageAccounts', parameters('storageName'))]",
        )
        .unwrap();
        assert_eq!(parsed.resource_name, "storageName");
    }

    #[test]
    fn whitespace_tolerated() {
        let parsed = parse_resource_id(
            "[ resourceId ( 'Microsoft.Compute/virtualMachines' , 'vm-0' ) ]",
        )
        .unwrap();
        assert_eq!(parsed.resource_type, "Microsoft.Compute/virtualMachines");
        assert_eq!(parsed.resource_name, "vm-0");
    }

    #[test]
    fn one_level_of_unwrapping_only() {
        // The first inner call wins; the concat structure is not evaluated
        let parsed = parse_resource_id(
            "[resourceId('Microsoft.Compute/virtualMachines', concat(variables('prefix'), parameters('env')))]",
        )
        .unwrap();
        assert_eq!(parsed.resource_name, "prefix");
    }

    #[test]
    fn malformed_expressions_are_none() {
        assert!(parse_resource_id("").is_none());
        assert!(parse_resource_id("vnet1").is_none());
        assert!(parse_resource_id("[variables('vnetName')]").is_none());
        assert!(parse_resource_id("[resourceId('only-one-argument')]").is_none());
        assert!(parse_resource_id("[concat('a', 'b')]").is_none());
    }

    #[test]
    fn plain_reference_without_brackets() {
        let parsed =
            parse_resource_id("resourceId('Microsoft.Network/subnets', 'default')").unwrap();
        assert_eq!(parsed.resource_type, "Microsoft.Network/subnets");
        assert_eq!(parsed.resource_name, "default");
    }

    #[test]
    fn display_format() {
        let parsed = ParsedReference {
            resource_type: "Microsoft.Network/subnets".to_string(),
            resource_name: "default".to_string(),
        };
        assert_eq!(parsed.to_string(), "Microsoft.Network/subnets 'default'");
    }
}
