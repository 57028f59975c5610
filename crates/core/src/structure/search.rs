//! Free-text search over the organisational forest.

use super::unit::{Employee, OrgUnit};
use std::ops::Range;

/// A normalised search query: trimmed and lowercased once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    needle: String,
}

impl SearchQuery {
    pub fn new(raw: &str) -> Self {
        Self {
            needle: raw.trim().to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.needle
    }

    fn hits(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.needle)
    }

    fn hits_opt(&self, haystack: Option<&str>) -> bool {
        haystack.is_some_and(|h| self.hits(h))
    }

    fn hits_employee(&self, employee: &Employee) -> bool {
        self.hits(&employee.name)
            || self.hits_opt(employee.position.as_deref())
            || self.hits_opt(employee.phone.as_deref())
            || self.hits_opt(employee.email.as_deref())
    }

    /// Whether `unit` itself matches, ignoring its children.
    ///
    /// Checks name, type label, phone, email, address, and every employee's name, position,
    /// phone, and email.
    pub fn matches(&self, unit: &OrgUnit) -> bool {
        if self.is_empty() {
            return true;
        }
        self.hits(&unit.name)
            || self.hits(unit.kind.label())
            || self.hits_opt(unit.phone.as_deref())
            || self.hits_opt(unit.email.as_deref())
            || self.hits_opt(unit.address.as_deref())
            || unit.employees.iter().any(|e| self.hits_employee(e))
    }
}

/// Prune the forest to units that match `query` or have a matching descendant.
///
/// Kept units keep their relative order and carry only their kept children. An empty query
/// returns the forest unchanged. The input forest is never modified.
pub fn filter_forest(forest: &[OrgUnit], query: &SearchQuery) -> Vec<OrgUnit> {
    if query.is_empty() {
        return forest.to_vec();
    }
    forest.iter().filter_map(|node| keep(node, query)).collect()
}

fn keep(node: &OrgUnit, query: &SearchQuery) -> Option<OrgUnit> {
    let children: Vec<OrgUnit> = node
        .children
        .iter()
        .filter_map(|child| keep(child, query))
        .collect();

    if !children.is_empty() || query.matches(node) {
        let mut kept = node.clone();
        kept.children = children;
        Some(kept)
    } else {
        None
    }
}

/// Byte range of the first case-insensitive occurrence of `query` in `text`.
///
/// Used to highlight the matched part of a unit name. Returns `None` for an empty query or
/// when there is no match.
pub fn highlight_range(text: &str, query: &SearchQuery) -> Option<Range<usize>> {
    if query.is_empty() {
        return None;
    }

    for (start, _) in text.char_indices() {
        let mut needle = query.as_str().chars().peekable();
        let mut end = start;
        for (offset, ch) in text[start..].char_indices() {
            if needle.peek().is_none() {
                break;
            }
            let mut lowered = ch.to_lowercase();
            let all_matched = lowered.all(|l| needle.next_if_eq(&l).is_some());
            if !all_matched {
                break;
            }
            end = start + offset + ch.len_utf8();
        }
        if needle.peek().is_none() {
            return Some(start..end);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::tree::build_forest;
    use crate::structure::unit::{UnitId, UnitType};

    fn sample_forest() -> Vec<OrgUnit> {
        let mut lab = OrgUnit::new(4, "Central Lab", UnitType::Center).with_parent(2);
        lab.employees.push(Employee {
            name: "Mona Ali".into(),
            position: Some("Chemist".into()),
            phone: None,
            email: Some("mona@lab.ly".into()),
        });
        let mut finance = OrgUnit::new(3, "Finance", UnitType::Directorate).with_parent(1);
        finance.address = Some("Tripoli, Omar Al-Mukhtar St".into());

        build_forest(&[
            OrgUnit::new(1, "Authority", UnitType::Authority),
            OrgUnit::new(2, "Medical Services", UnitType::Directorate).with_parent(1),
            finance,
            lab,
        ])
    }

    fn ids(nodes: &[OrgUnit]) -> Vec<String> {
        fn walk(nodes: &[OrgUnit], out: &mut Vec<String>) {
            for n in nodes {
                out.push(n.id.to_string());
                walk(&n.children, out);
            }
        }
        let mut out = Vec::new();
        walk(nodes, &mut out);
        out
    }

    #[test]
    fn empty_query_returns_forest_unchanged() {
        let forest = sample_forest();
        assert_eq!(filter_forest(&forest, &SearchQuery::new("   ")), forest);
    }

    #[test]
    fn employee_match_keeps_ancestor_chain_only() {
        let forest = sample_forest();
        let filtered = filter_forest(&forest, &SearchQuery::new("CHEMIST"));
        assert_eq!(ids(&filtered), ["1", "2", "4"]);
        // Original forest still has Finance.
        assert_eq!(ids(&forest).len(), 4);
    }

    #[test]
    fn matches_type_label_and_contact_fields() {
        let forest = sample_forest();
        assert_eq!(
            ids(&filter_forest(&forest, &SearchQuery::new("مركز"))),
            ["1", "2", "4"]
        );
        assert_eq!(
            ids(&filter_forest(&forest, &SearchQuery::new("mukhtar"))),
            ["1", "3"]
        );
        assert!(filter_forest(&forest, &SearchQuery::new("no such thing")).is_empty());
    }

    #[test]
    fn matched_parent_keeps_only_matching_children() {
        let forest = sample_forest();
        let filtered = filter_forest(&forest, &SearchQuery::new("authority"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, UnitId::from(1));
        assert!(filtered[0].children.is_empty());
    }

    #[test]
    fn highlight_finds_case_insensitive_range() {
        let q = SearchQuery::new("lab");
        assert_eq!(highlight_range("Central Lab", &q), Some(8..11));
        assert_eq!(highlight_range("Central", &q), None);
        assert_eq!(highlight_range("anything", &SearchQuery::new("")), None);

        let arabic = SearchQuery::new("مركز");
        let text = "فرع مركز طرابلس";
        let range = highlight_range(text, &arabic).expect("match");
        assert_eq!(&text[range], "مركز");
    }
}
