//! Local file names for exported workflows.

pub const EXTENSION: &str = ".json";

/// Keeps `[A-Za-z0-9 _-]`, trims trailing whitespace and turns spaces
/// into underscores. Applying it twice yields the same result.
pub fn sanitize(name: &str) -> String {
    let kept: String = name.chars().filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_')).collect();
    kept.trim_end().replace(' ', "_")
}

/// Appends `.json` when absent.
pub fn with_extension(filename: &str) -> String {
    if filename.ends_with(EXTENSION) {
        filename.to_string()
    } else {
        format!("{}{}", filename, EXTENSION)
    }
}

/// File name for a workflow, `workflow_<id>` when the name leaves nothing behind.
pub fn for_workflow(
    name: Option<&str>,
    id: &str,
) -> String {
    let stem = name.map(sanitize).filter(|s| !s.is_empty()).unwrap_or_else(|| sanitize(&format!("workflow_{}", id)));
    with_extension(&stem)
}
