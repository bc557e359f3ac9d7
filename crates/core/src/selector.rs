//! Operator selection of services
//!
//! Turns free-form input such as `all`, `1,3` or `2-4` into a subset of the
//! discovered services. Bad tokens are dropped one by one instead of rejecting
//! the whole input.

use crate::types::ServiceDescriptor;
use std::collections::BTreeSet;

/// Token selecting every candidate, compared case-insensitively
pub const WILDCARD: &str = "all";

/// Result of resolving selection input against the candidate list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<'a> {
    /// Deduplicated services in discovery order
    Services(Vec<&'a ServiceDescriptor>),
    /// No valid token was found (or the input was blank)
    Nothing,
}

impl<'a> Selection<'a> {
    pub fn is_nothing(&self) -> bool {
        matches!(self, Selection::Nothing)
    }

    pub fn services(&self) -> &[&'a ServiceDescriptor] {
        match self {
            Selection::Services(services) => services,
            Selection::Nothing => &[],
        }
    }

    pub fn into_services(self) -> Vec<&'a ServiceDescriptor> {
        match self {
            Selection::Services(services) => services,
            Selection::Nothing => Vec::new(),
        }
    }
}

/// Resolve `raw` against `candidates`
pub fn resolve<'a>(raw: &str, candidates: &'a [ServiceDescriptor]) -> Selection<'a> {
    let raw = raw.trim();

    if raw.eq_ignore_ascii_case(WILDCARD) {
        return if candidates.is_empty() {
            Selection::Nothing
        } else {
            Selection::Services(candidates.iter().collect())
        };
    }

    let indices = parse_indices(raw, candidates.len());
    if indices.is_empty() {
        Selection::Nothing
    } else {
        Selection::Services(indices.into_iter().map(|i| &candidates[i]).collect())
    }
}

/// Zero-based, sorted, deduplicated indices named by a comma-separated list of
/// 1-based indices and inclusive `a-b` ranges
pub fn parse_indices(raw: &str, len: usize) -> BTreeSet<usize> {
    let mut indices = BTreeSet::new();

    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if let Some((start, end)) = token.split_once('-') {
            let (Ok(start), Ok(end)) = (start.trim().parse::<usize>(), end.trim().parse::<usize>())
            else {
                continue;
            };
            if start == 0 || start > end {
                continue;
            }
            indices.extend((start..=end.min(len)).map(|i| i - 1));
        } else if let Some(index) = parse_index(token, len) {
            indices.insert(index);
        }
    }

    indices
}

/// Parse one 1-based index into a zero-based index below `len`.
///
/// The whole token must be a number: `3abc` and `1.5` are rejected instead of
/// being read as their leading digits (`3`, `1`).
pub fn parse_index(token: &str, len: usize) -> Option<usize> {
    let index = token.trim().parse::<usize>().ok()?;
    (1..=len).contains(&index).then(|| index - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(n: usize) -> Vec<ServiceDescriptor> {
        (0..n)
            .map(|i| ServiceDescriptor::new(format!("svc{i}"), format!("/tmp/svc{i}")))
            .collect()
    }

    fn names(selection: &Selection<'_>) -> Vec<String> {
        selection.services().iter().map(|s| s.name.clone()).collect()
    }

    #[test]
    fn test_wildcard_is_case_insensitive() {
        let all = candidates(3);
        for input in ["all", "ALL", "All", "  aLl \n"] {
            let selection = resolve(input, &all);
            assert_eq!(names(&selection), vec!["svc0", "svc1", "svc2"], "input {input:?}");
        }
    }

    #[test]
    fn test_wildcard_on_empty_list_selects_nothing() {
        assert!(resolve("all", &[]).is_nothing());
    }

    #[test]
    fn test_duplicates_and_out_of_range_are_dropped() {
        let two = candidates(2);
        let selection = resolve("1,1,9", &two);
        assert_eq!(names(&selection), vec!["svc0"]);

        for input in ["2,2", "2, 2 ,2"] {
            assert_eq!(resolve(input, &two).services().len(), 1);
        }
    }

    #[test]
    fn test_order_follows_candidates() {
        let all = candidates(3);
        assert_eq!(resolve("3,1", &all), resolve("1,3", &all));
        assert_eq!(names(&resolve("3,1", &all)), vec!["svc0", "svc2"]);
    }

    #[test]
    fn test_invalid_tokens_are_ignored() {
        let all = candidates(3);
        assert_eq!(names(&resolve("x, 2, 0, -1, 3abc", &all)), vec!["svc1"]);
        assert_eq!(parse_index("1.5", 3), None);
        assert_eq!(parse_index("2abc", 3), None);
        assert_eq!(parse_index(" 2 ", 3), Some(1));
    }

    #[test]
    fn test_nothing_selected() {
        let all = candidates(3);
        for input in ["", "   ", "none", "0", "4,5", ",,,"] {
            assert!(resolve(input, &all).is_nothing(), "input {input:?}");
        }
    }

    #[test]
    fn test_ranges() {
        let all = candidates(5);
        assert_eq!(names(&resolve("2-4", &all)), vec!["svc1", "svc2", "svc3"]);
        assert_eq!(names(&resolve("4-9", &all)), vec!["svc3", "svc4"]);
        assert_eq!(names(&resolve("1, 3-3", &all)), vec!["svc0", "svc2"]);
        assert!(resolve("4-2", &all).is_nothing());
        assert!(resolve("0-2", &all).is_nothing());
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("1", 2), Some(0));
        assert_eq!(parse_index(" 2 ", 2), Some(1));
        assert_eq!(parse_index("3", 2), None);
        assert_eq!(parse_index("0", 2), None);
        assert_eq!(parse_index("two", 2), None);
    }
}
