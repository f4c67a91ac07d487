//! First-match routing of notes to output subdirectories.

use crate::config::Route;
use crate::utils::glob::compile_glob;

/// Return the first route whose condition matches, scanning in order.
///
/// A rule with only `source_path` matches on the glob; a rule with only
/// `tag` matches on tag presence. A rule carrying both conditions
/// accepts either of them. No match excludes the file from the run; it
/// is not an error.
pub fn match_route<'a>(
    relative_path: &str,
    tags: &[String],
    routes: &'a [Route],
) -> Option<&'a Route> {
    routes
        .iter()
        .find(|route| route_matches(relative_path, tags, route))
}

fn route_matches(relative_path: &str, tags: &[String], route: &Route) -> bool {
    let path_match = route
        .source_path
        .as_deref()
        .is_some_and(|pattern| glob_matches(pattern, relative_path));
    let tag_match = route
        .tag
        .as_deref()
        .is_some_and(|tag| tags.iter().any(|t| t == tag));

    path_match || tag_match
}

/// Glob match against a slash-normalized relative path.
///
/// Patterns are validated at config load; one that fails to compile
/// here simply matches nothing.
fn glob_matches(pattern: &str, relative_path: &str) -> bool {
    compile_glob(pattern).is_ok_and(|m| m.is_match(relative_path))
}
