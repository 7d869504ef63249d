//! Translation between user-written entity references and canonical paths.
//!
//! Users write either a dotted path (`integration.db.table`, the canonical
//! `::` path with dots) or a database coordinate (`db.schema.table`).

use crate::backend::Backend;
use crate::error::Error;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// Canonical form of a dotted path
pub fn path_with_colons(path: &str) -> String {
    path.replace('.', "::")
}

/// Dotted form of a canonical path
pub fn path_with_dots(path: &str) -> String {
    path.replace("::", ".")
}

/// Paths that could not be turned into exactly one canonical entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionError {
    /// Inputs matching no monitorable entity
    pub unresolved: Vec<String>,
    /// Inputs matching several monitorable entities
    pub ambiguous: BTreeMap<String, Vec<String>>,
}

impl ResolutionError {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.unresolved.is_empty() || !self.ambiguous.is_empty()
    }
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        if !self.unresolved.is_empty() {
            lines.push("The following monitored IDs could not be resolved:".to_string());
            lines.extend(self.unresolved.iter().map(|p| format!("  - {p}")));
        }
        if !self.ambiguous.is_empty() {
            lines.push("The following monitored IDs resolved to multiple entities:".to_string());
            for (path, entities) in &self.ambiguous {
                lines.push(format!("  - {path}"));
                lines.extend(entities.iter().map(|e| format!("      - {e}")));
            }
            lines.push(
                "  Please specify more specific monitored IDs to resolve to a single entity."
                    .to_string(),
            );
        }
        write!(f, "{}", lines.join("\n"))
    }
}

impl std::error::Error for ResolutionError {}

/// Failure of [`PathResolver::resolve`].
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// A lookup call failed; nothing was resolved.
    #[error("error resolving monitored paths: {0}")]
    Backend(#[from] Error),

    /// Some inputs were unresolved or ambiguous.
    #[error("{0}")]
    Paths(ResolutionError),
}

/// Resolves entity references through a [`Backend`].
pub struct PathResolver<'a, B: Backend + ?Sized> {
    backend: &'a B,
}

impl<'a, B: Backend + ?Sized> PathResolver<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Map every input to its canonical path.
    ///
    /// Inputs are first tried as dotted canonical paths; the rest are looked up
    /// as database coordinates. A coordinate with several candidates resolves
    /// only if exactly one of them is a monitorable entity. Every failing input
    /// is reported together.
    pub fn resolve(&self, inputs: &[String]) -> Result<HashMap<String, String>, ResolveError> {
        let mut resolved = HashMap::new();
        if inputs.is_empty() {
            return Ok(resolved);
        }

        let mut unique: Vec<String> = Vec::new();
        for input in inputs {
            if !unique.contains(input) {
                unique.push(input.clone());
            }
        }

        let canonical: Vec<String> = unique.iter().map(|p| path_with_colons(p)).collect();
        let found: HashSet<String> = self
            .backend
            .get_entities(&canonical)?
            .into_iter()
            .map(|e| e.path)
            .collect();
        for (input, path) in unique.iter().zip(canonical) {
            if found.contains(&path) {
                resolved.insert(input.clone(), path);
            }
        }

        let leftover: Vec<String> = unique
            .into_iter()
            .filter(|p| !resolved.contains_key(p))
            .collect();
        if leftover.is_empty() {
            return Ok(resolved);
        }
        log::debug!("looking up {} paths as database coordinates", leftover.len());

        let mut failures = ResolutionError::default();
        let mut candidates_by_input: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut answered = HashSet::new();

        for matched in self.backend.ids_by_coordinates(&leftover)? {
            answered.insert(matched.coordinate.clone());
            let paths: Vec<String> = matched
                .candidates
                .iter()
                .flat_map(|c| c.paths.iter().cloned())
                .collect();
            match (matched.candidates.len(), paths.len()) {
                (0, _) | (1, 0) => failures.unresolved.push(matched.coordinate),
                (1, 1) => {
                    resolved.insert(matched.coordinate, paths[0].clone());
                }
                _ => {
                    candidates_by_input.insert(matched.coordinate, paths);
                }
            }
        }
        failures.unresolved.extend(
            leftover
                .iter()
                .filter(|p| !answered.contains(*p))
                .cloned(),
        );

        if !candidates_by_input.is_empty() {
            let mut all: Vec<String> = candidates_by_input.values().flatten().cloned().collect();
            all.sort();
            all.dedup();

            let monitorable: HashSet<String> = self
                .backend
                .get_entities(&all)?
                .into_iter()
                .filter(|e| e.is_monitorable())
                .map(|e| e.path)
                .collect();

            for (input, paths) in candidates_by_input {
                let mut valid: Vec<String> = paths
                    .into_iter()
                    .filter(|p| monitorable.contains(p))
                    .collect();
                valid.sort();
                valid.dedup();
                match valid.len() {
                    0 => failures.unresolved.push(input),
                    1 => {
                        resolved.insert(input, valid.remove(0));
                    }
                    _ => {
                        failures.ambiguous.insert(input, valid);
                    }
                }
            }
        }

        if failures.has_errors() {
            failures.unresolved.sort();
            return Err(ResolveError::Paths(failures));
        }
        Ok(resolved)
    }

    /// Map canonical paths back to what a user would write.
    ///
    /// A path becomes its database coordinate when that coordinate names only
    /// this path, and its dotted form otherwise.
    pub fn simplify(&self, paths: &[String]) -> crate::Result<HashMap<String, String>> {
        let mut simple = HashMap::new();
        if paths.is_empty() {
            return Ok(simple);
        }

        for coordinates in self.backend.coordinates_by_paths(paths)? {
            if !coordinates.coordinate.is_empty() && coordinates.paths.len() == 1 {
                simple.insert(coordinates.paths[0].clone(), coordinates.coordinate);
            }
        }
        for path in paths {
            simple
                .entry(path.clone())
                .or_insert_with(|| path_with_dots(path));
        }
        Ok(simple)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_path_forms() {
        assert_eq!(path_with_colons("a.b.c"), "a::b::c");
        assert_eq!(path_with_dots("a::b::c"), "a.b.c");
    }

    #[test]
    fn test_entity_found_skips_coordinates() {
        let mock = MockBackend::new();
        mock.add_entity("foo::bar", "table");
        let resolved = PathResolver::new(&mock)
            .resolve(&strings(&["foo.bar"]))
            .unwrap();
        assert_eq!(resolved["foo.bar"], "foo::bar");
        assert_eq!(mock.calls(), vec!["BatchGetEntities"]);
    }

    #[test]
    fn test_canonical_input_resolves_to_itself() {
        let mock = MockBackend::new();
        mock.add_entity("foo::bar", "table");
        let resolved = PathResolver::new(&mock)
            .resolve(&strings(&["foo::bar"]))
            .unwrap();
        assert_eq!(resolved["foo::bar"], "foo::bar");
    }

    #[test]
    fn test_coordinate_found() {
        let mock = MockBackend::new();
        mock.add_coordinate("db.table", vec![strings(&["integration::db::table"])]);
        let resolved = PathResolver::new(&mock)
            .resolve(&strings(&["db.table"]))
            .unwrap();
        assert_eq!(resolved["db.table"], "integration::db::table");
    }

    #[test]
    fn test_not_found() {
        let mock = MockBackend::new();
        mock.add_coordinate("empty", vec![vec![]]);
        let err = PathResolver::new(&mock)
            .resolve(&strings(&["notfound", "empty"]))
            .unwrap_err();
        let ResolveError::Paths(failures) = err else {
            panic!("expected path failures");
        };
        assert_eq!(failures.unresolved, strings(&["empty", "notfound"]));
    }

    #[test]
    fn test_ambiguous_candidates() {
        let mock = MockBackend::new();
        mock.add_coordinate(
            "ambiguous2",
            vec![strings(&["ambiguous2::a"]), strings(&["ambiguous2::b"])],
        );
        mock.add_entity("ambiguous2::a", "table");
        mock.add_entity("ambiguous2::b", "view");
        let err = PathResolver::new(&mock)
            .resolve(&strings(&["ambiguous2"]))
            .unwrap_err();
        let ResolveError::Paths(failures) = err else {
            panic!("expected path failures");
        };
        assert_eq!(
            failures.ambiguous["ambiguous2"],
            strings(&["ambiguous2::a", "ambiguous2::b"])
        );
        let message = failures.to_string();
        assert!(message.contains("resolved to multiple entities"));
        assert!(message.contains("      - ambiguous2::b"));
    }

    #[test]
    fn test_ambiguous_candidates_narrowed_by_type() {
        let mock = MockBackend::new();
        mock.add_coordinate(
            "ambiguous2",
            vec![strings(&["ambiguous2::a"]), strings(&["ambiguous2::b"])],
        );
        mock.add_entity("ambiguous2::a", "table");
        mock.add_entity("ambiguous2::b", "dashboard");
        let resolved = PathResolver::new(&mock)
            .resolve(&strings(&["ambiguous2"]))
            .unwrap();
        assert_eq!(resolved["ambiguous2"], "ambiguous2::a");
    }

    #[test]
    fn test_no_valid_candidates() {
        let mock = MockBackend::new();
        mock.add_coordinate(
            "ambiguous2",
            vec![strings(&["ambiguous2::a"]), strings(&["ambiguous2::b"])],
        );
        mock.add_entity("ambiguous2::a", "dashboard");
        let err = PathResolver::new(&mock)
            .resolve(&strings(&["ambiguous2"]))
            .unwrap_err();
        let ResolveError::Paths(failures) = err else {
            panic!("expected path failures");
        };
        assert_eq!(failures.unresolved, strings(&["ambiguous2"]));
    }

    #[test]
    fn test_backend_failure() {
        let mock = MockBackend::new();
        mock.fail_on("BatchGetEntities");
        let err = PathResolver::new(&mock)
            .resolve(&strings(&["foo.bar"]))
            .unwrap_err();
        assert!(matches!(err, ResolveError::Backend(_)));
    }

    #[test]
    fn test_resolution_error_message() {
        let failures = ResolutionError {
            unresolved: strings(&["a.b"]),
            ambiguous: BTreeMap::new(),
        };
        assert_eq!(
            failures.to_string(),
            "The following monitored IDs could not be resolved:\n  - a.b"
        );
    }

    #[test]
    fn test_simplify() {
        let mock = MockBackend::new();
        mock.add_coordinate("db.table", vec![strings(&["integration::db::table"])]);
        let simple = PathResolver::new(&mock)
            .simplify(&strings(&["integration::db::table", "foo::bar"]))
            .unwrap();
        assert_eq!(simple["integration::db::table"], "db.table");
        assert_eq!(simple["foo::bar"], "foo.bar");
    }

    #[test]
    fn test_simplify_shared_coordinate_falls_back_to_dots() {
        let mock = MockBackend::new();
        mock.add_coordinate(
            "db.table",
            vec![strings(&["one::db::table"]), strings(&["two::db::table"])],
        );
        let simple = PathResolver::new(&mock)
            .simplify(&strings(&["one::db::table"]))
            .unwrap();
        assert_eq!(simple["one::db::table"], "one.db.table");
    }
}
