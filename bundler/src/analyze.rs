//! Lightweight prop discovery for widget sources.
//!
//! Looks for the first `interface <Name>Props { ... }` and reads its fields
//! textually. Nested object types end the body early; this is a best-effort
//! hint for editors, not a type checker.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static PROPS_INTERFACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"interface\s+\w*Props\s*\{([^}]*)\}").expect("valid regex"));

static PROP_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)(\?)?\s*:\s*([^;,\n]+)").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub required: bool,
    pub description: String,
}

pub fn analyze_component_props(source: &str) -> Vec<PropDefinition> {
    let Some(body) = PROPS_INTERFACE
        .captures(source)
        .and_then(|captures| captures.get(1))
    else {
        return Vec::new();
    };

    PROP_FIELD
        .captures_iter(body.as_str())
        .filter_map(|field| {
            let name = field.get(1)?.as_str().to_string();
            let ty = field.get(3)?.as_str().trim().to_string();
            let required = field.get(2).is_none();
            let description = format!("Prop {name} of type {ty}");
            Some(PropDefinition {
                name,
                ty,
                required,
                description,
            })
        })
        .collect()
}
