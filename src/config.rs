/// Naming conventions and sentinels the binder applies to the symbol table.
///
/// The defaults describe linker output where namespaces are slash-separated
/// module paths and members hang off the first `.` after the last slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinderConfig {
    /// Names starting with any of these belong to no user namespace.
    pub synthetic_markers: Vec<String>,
    /// Prefixes of generated equality/hash helpers, stripped before splitting.
    pub helper_prefixes: Vec<String>,
    pub path_separator: char,
    pub scope_separator: char,
    /// Import target that validates a namespace without binding anything.
    pub discard_target: String,
    /// Import target that writes members straight into the root environment.
    pub merge_target: String,
    /// Root bindings starting with this are control directives, hidden from `dir`.
    pub directive_prefix: char,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            synthetic_markers: vec!["go:".into(), "struct {".into()],
            helper_prefixes: vec!["type:.eq.".into(), "type:.hash.".into()],
            path_separator: '/',
            scope_separator: '.',
            discard_target: "_".into(),
            merge_target: ".".into(),
            directive_prefix: '$',
        }
    }
}

impl BinderConfig {
    /// Root binding name of a control directive, e.g. `$import`.
    pub fn directive(&self, name: &str) -> String {
        format!("{}{name}", self.directive_prefix)
    }
}
