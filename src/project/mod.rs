//! Mapping of changed paths to configured projects.

use crate::config::ProjectConfig;
use crate::error::ConfigError;
use glob::Pattern;
use std::collections::BTreeSet;

/// Tells which projects a set of changed paths concerns
#[derive(Debug, Clone)]
pub struct ChangeRelevanceFilter {
    projects: Vec<(String, Vec<Pattern>)>,
}

impl ChangeRelevanceFilter {
    /// Compile the path globs of every project
    pub fn new(projects: &[ProjectConfig]) -> Result<Self, ConfigError> {
        let projects = projects
            .iter()
            .map(|project| {
                let patterns = project
                    .paths
                    .iter()
                    .map(|pattern| {
                        Pattern::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                            project: project.id.clone(),
                            pattern: pattern.clone(),
                            reason: e.to_string(),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((project.id.clone(), patterns))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Self { projects })
    }

    /// Projects matched by at least one of the changed paths
    ///
    /// `*` crosses directory separators, so `core/*` covers the whole
    /// `core/` tree.
    pub fn relevant_projects<'a, I>(&self, changed_paths: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut relevant = BTreeSet::new();
        for path in changed_paths {
            for (id, patterns) in &self.projects {
                if patterns.iter().any(|pattern| pattern.matches(path)) {
                    relevant.insert(id.clone());
                }
            }
        }
        relevant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: &str, paths: &[&str]) -> ProjectConfig {
        ProjectConfig {
            id: id.to_string(),
            paths: paths.iter().map(|p| p.to_string()).collect(),
            manifest: format!("{}/package.json", id),
        }
    }

    fn filter() -> ChangeRelevanceFilter {
        ChangeRelevanceFilter::new(&[project("core", &["core/*"]), project("grid", &["grid/*"])])
            .unwrap()
    }

    #[test]
    fn test_only_matching_projects() {
        let relevant = filter().relevant_projects(["core/src/x.ts", "docs/readme.md"]);
        assert_eq!(relevant, BTreeSet::from(["core".to_string()]));
    }

    #[test]
    fn test_empty_input() {
        assert!(filter().relevant_projects(std::iter::empty()).is_empty());
    }

    #[test]
    fn test_path_can_match_several_projects() {
        let filter = ChangeRelevanceFilter::new(&[
            project("core", &["core/*", "shared/*"]),
            project("grid", &["grid/*", "shared/*"]),
        ])
        .unwrap();
        let relevant = filter.relevant_projects(["shared/theme.css"]);
        assert_eq!(
            relevant,
            BTreeSet::from(["core".to_string(), "grid".to_string()])
        );
    }

    #[test]
    fn test_prefix_is_not_a_match() {
        let relevant = filter().relevant_projects(["core-legacy/index.ts", "gridlines.md"]);
        assert!(relevant.is_empty());
    }
}
