use itertools::Itertools;

use crate::config::ConverterConfig;

/// Query text a scan will send: the custom query when one is set, otherwise a generated one
pub fn resolve_query(config: &ConverterConfig) -> String {
    match config.effective_custom_query() {
        Some(custom) => custom.to_string(),
        None => build_query(config),
    }
}

/// Build a GROQ-style selection from the type and text filters, capped at `max_documents`.
///
/// `*[_type in ["post"] && (title match "foo*" || name match "foo*") && !(_id in path("drafts.**"))][0...1000]`
pub fn build_query(config: &ConverterConfig) -> String {
    let mut conditions = Vec::new();

    let types: Vec<&str> = config
        .document_types
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    if !types.is_empty() {
        conditions.push(format!(
            "_type in [{}]",
            types.iter().map(|t| string_literal(t)).join(", ")
        ));
    }

    if let Some(search) = config.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = string_literal(&format!("{}*", search));
        conditions.push(format!(
            "(title match {} || name match {})",
            pattern, pattern
        ));
    }

    if !config.include_drafts {
        conditions.push("!(_id in path(\"drafts.**\"))".to_string());
    }

    if conditions.is_empty() {
        conditions.push("defined(_id)".to_string());
    }

    format!(
        "*[{}][0...{}]",
        conditions.join(" && "),
        config.max_documents
    )
}

/// Query string literals share JSON's escaping rules
fn string_literal(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
