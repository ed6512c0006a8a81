//! Dependency declarations in issue bodies.
//!
//! A line starting with `depends-on:`, `dp:` or `dependson:` (any case)
//! lists comma-separated references: `#N` or a bare `N` for an issue in the
//! same repository, `OWNER/REPO#N` for another repository.

use super::issue::Issue;
use crate::github::error::ApiError;

const MARKERS: [&str; 3] = ["depends-on:", "dp:", "dependson:"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyRef {
    SameRepository(u64),
    /// The raw `owner/repo#n` token.
    CrossRepository(String),
}

/// Every dependency reference declared in `body`, in order.
pub fn parse_references(body: &str) -> Result<Vec<DependencyRef>, ApiError> {
    let mut refs = Vec::new();
    for line in body.lines() {
        let clean = line.trim().to_lowercase();
        if !MARKERS.iter().any(|m| clean.starts_with(m)) {
            continue;
        }
        let Some((_, list)) = clean.split_once(':') else {
            continue;
        };
        for token in list.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let number = match token.split_once('#') {
                None => token,
                Some(("", number)) => number,
                Some(_) => {
                    refs.push(DependencyRef::CrossRepository(token.to_string()));
                    continue;
                }
            };
            let number = number
                .trim()
                .parse::<u64>()
                .map_err(|_| ApiError::InvalidDependency(token.to_string()))?;
            refs.push(DependencyRef::SameRepository(number));
        }
    }
    Ok(refs)
}

/// Resolve `issue`'s declared dependencies to issue ids by searching
/// `project_issues` (the issues of one crawl of the same project).
///
/// References to numbers that are not on the board are dropped. Cross
/// repository references are an error.
pub fn resolve_dependencies(issue: &Issue, project_issues: &[Issue]) -> anyhow::Result<Vec<u64>> {
    let Some(body) = issue.body.as_deref() else {
        return Ok(Vec::new());
    };

    let mut ids = Vec::new();
    for reference in parse_references(body)? {
        match reference {
            DependencyRef::SameRepository(number) => {
                match project_issues.iter().find(|i| i.number == number) {
                    Some(found) => ids.push(found.id),
                    None => {
                        tracing::debug!(issue = issue.number, number, "dependency not on board, dropped");
                    }
                }
            }
            DependencyRef::CrossRepository(reference) => {
                return Err(ApiError::CrossRepositoryDependency { reference }.into());
            }
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::issue::fixtures::issue;

    fn board() -> Vec<Issue> {
        vec![issue(0xA, 1, ""), issue(0xB, 2, "Depends-On: 1")]
    }

    #[test]
    fn resolves_same_repository_reference() {
        let issues = board();
        assert_eq!(resolve_dependencies(&issues[1], &issues).unwrap(), vec![0xA]);
    }

    #[test]
    fn hash_prefixed_and_bare_numbers_both_resolve() {
        let issues = board();
        let subject = issue(0xC, 3, "dependson: #1, 2");
        assert_eq!(
            resolve_dependencies(&subject, &issues).unwrap(),
            vec![0xA, 0xB]
        );
    }

    #[test]
    fn unknown_number_is_dropped() {
        let issues = board();
        let subject = issue(0xC, 3, "dp: 999");
        assert!(resolve_dependencies(&subject, &issues).unwrap().is_empty());

        let mixed = issue(0xD, 4, "dp: 999, #2");
        assert_eq!(resolve_dependencies(&mixed, &issues).unwrap(), vec![0xB]);
    }

    #[test]
    fn cross_repository_reference_is_not_supported() {
        let issues = board();
        let subject = issue(0xC, 3, "depends-on: OWNER/REPO#5");
        let err = resolve_dependencies(&subject, &issues).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::CrossRepositoryDependency { reference }) if reference == "owner/repo#5"
        ));
    }

    #[test]
    fn markers_are_case_insensitive_and_indentation_tolerant() {
        let refs = parse_references("intro\n   DP: #4\nDEPENDSON: 5\n  Depends-on:6").unwrap();
        assert_eq!(
            refs,
            vec![
                DependencyRef::SameRepository(4),
                DependencyRef::SameRepository(5),
                DependencyRef::SameRepository(6),
            ]
        );
    }

    #[test]
    fn marker_must_start_the_line() {
        let refs = parse_references("this depends-on: 4 but not really\nblocked by #3").unwrap();
        assert!(refs.is_empty());
    }

    #[test]
    fn empty_tokens_are_ignored() {
        let refs = parse_references("dp: 1, , 2,").unwrap();
        assert_eq!(
            refs,
            vec![DependencyRef::SameRepository(1), DependencyRef::SameRepository(2)]
        );
    }

    #[test]
    fn non_numeric_reference_is_an_error() {
        let err = parse_references("dp: soon").unwrap_err();
        assert!(matches!(err, ApiError::InvalidDependency(t) if t == "soon"));
    }

    #[test]
    fn issue_without_body_has_no_dependencies() {
        let mut subject = issue(0xC, 3, "");
        subject.body = None;
        assert!(resolve_dependencies(&subject, &board()).unwrap().is_empty());
    }

    #[test]
    fn crlf_bodies_parse() {
        let refs = parse_references("Summary\r\ndp: #7\r\n").unwrap();
        assert_eq!(refs, vec![DependencyRef::SameRepository(7)]);
    }
}
