//! Symbol-name normalization and namespace membership.
//!
//! Raw names look like `example.com/pkg/sub.Member` or
//! `example.com/pkg/sub.Type.Method`: the namespace runs up to the first
//! scope separator after the last path separator.

use crate::config::BinderConfig;

/// A raw symbol name split into its namespace and optional local member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolPath<'a> {
    pub namespace: &'a str,
    pub member: Option<&'a str>,
}

/// Splits `raw` into namespace and member.
///
/// Returns `None` for compiler-synthetic names. A name with no scope
/// separator after its last path segment is itself a namespace, so feeding
/// a normalized namespace back in returns it unchanged.
pub fn normalize<'a>(raw: &'a str, config: &BinderConfig) -> Option<SymbolPath<'a>> {
    if config
        .synthetic_markers
        .iter()
        .any(|marker| raw.starts_with(marker.as_str()))
    {
        return None;
    }

    let mut name = raw;
    for prefix in &config.helper_prefixes {
        if let Some(stripped) = name.strip_prefix(prefix.as_str()) {
            name = stripped;
        }
    }

    let split = name
        .rfind(config.path_separator)
        .map_or(0, |idx| idx + config.path_separator.len_utf8());
    match name[split..].find(config.scope_separator) {
        Some(dot) => {
            let end = split + dot;
            Some(SymbolPath {
                namespace: &name[..end],
                member: Some(&name[end + config.scope_separator.len_utf8()..]),
            })
        }
        None => Some(SymbolPath {
            namespace: name,
            member: None,
        }),
    }
}

/// Joins a namespace and a local name into a qualified name.
pub fn qualify(namespace: &str, member: &str, config: &BinderConfig) -> String {
    format!("{namespace}{}{member}", config.scope_separator)
}

/// Local names of every entry in `names` that sits under `namespace`, sorted.
pub fn members_of(namespace: &str, names: &[String], config: &BinderConfig) -> Vec<String> {
    let prefix = qualify(namespace, "", config);
    let mut members: Vec<String> = names
        .iter()
        .filter_map(|name| name.strip_prefix(prefix.as_str()))
        .map(str::to_string)
        .collect();
    members.sort();
    members
}

/// Entries of `haystack` containing `needle`, in their original order.
pub fn filter_containing(haystack: &[String], needle: &str) -> Vec<String> {
    haystack
        .iter()
        .filter(|hay| hay.contains(needle))
        .cloned()
        .collect()
}

/// Whether `name` can be bound and referenced from the evaluator.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_alphanumeric() || ch == '_')
}

/// Binding name used when a namespace is imported without an explicit target:
/// its last path segment.
pub fn default_binding_name<'a>(namespace: &'a str, config: &BinderConfig) -> &'a str {
    namespace
        .rsplit(config.path_separator)
        .next()
        .unwrap_or(namespace)
}
