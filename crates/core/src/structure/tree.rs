//! Tree builder and traversal helpers for the organisational structure.
//!
//! [`build_forest`] turns the decoded unit list into a canonical forest: every unit appears
//! exactly once, siblings are sorted by type precedence then by name, and the caller's input
//! is never mutated.

use super::unit::{natural_cmp, OrgUnit, UnitId};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Build the canonical forest from decoded units.
///
/// A single unit with populated `children` is taken as an already-nested tree and only
/// sorted. Anything else is treated as a flat list and linked through `parent_id`:
/// - units without a `parent_id` are roots,
/// - units whose parent is missing from the list are promoted to roots (logged),
/// - units caught in a parent cycle are promoted to roots at the first cycle member seen.
///
/// Children that a flat record already carries are kept ahead of the children attached
/// through `parent_id`; everything is then sorted recursively.
pub fn build_forest(units: &[OrgUnit]) -> Vec<OrgUnit> {
    if let [single] = units {
        if single.has_children() {
            let mut forest = vec![single.clone()];
            sort_forest(&mut forest);
            return forest;
        }
    }

    let mut forest = link_flat(units);
    sort_forest(&mut forest);
    forest
}

fn link_flat(units: &[OrgUnit]) -> Vec<OrgUnit> {
    // First occurrence of an id is the one children attach to.
    let mut index_of: HashMap<&UnitId, usize> = HashMap::with_capacity(units.len());
    for (i, unit) in units.iter().enumerate() {
        index_of.entry(&unit.id).or_insert(i);
    }

    let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); units.len()];
    let mut roots: Vec<usize> = Vec::new();

    for (i, unit) in units.iter().enumerate() {
        let Some(parent_id) = unit.parent_id.as_ref() else {
            roots.push(i);
            continue;
        };

        match index_of.get(parent_id).copied() {
            Some(p) if p != i => children_of[p].push(i),
            Some(_) => {
                tracing::warn!("unit {} lists itself as parent; promoting to root", unit.id);
                roots.push(i);
            }
            None => {
                tracing::warn!(
                    "unit {} references missing parent {}; promoting to root",
                    unit.id,
                    parent_id
                );
                roots.push(i);
            }
        }
    }

    let mut visited = vec![false; units.len()];
    let mut forest: Vec<OrgUnit> = roots
        .iter()
        .map(|&r| assemble(r, units, &children_of, &mut visited))
        .collect();

    // Whatever is still unvisited hangs off a parent cycle.
    while let Some(start) = visited.iter().position(|seen| !seen) {
        tracing::warn!(
            "unit {} is part of a parent cycle; promoting to root",
            units[start].id
        );
        forest.push(assemble(start, units, &children_of, &mut visited));
    }

    forest
}

fn assemble(
    index: usize,
    units: &[OrgUnit],
    children_of: &[Vec<usize>],
    visited: &mut [bool],
) -> OrgUnit {
    visited[index] = true;
    let mut node = units[index].clone();
    for &child in &children_of[index] {
        if !visited[child] {
            node.children
                .push(assemble(child, units, children_of, visited));
        }
    }
    node
}

/// Sibling order: type precedence, then numeric-aware name, then id.
pub fn sibling_order(a: &OrgUnit, b: &OrgUnit) -> Ordering {
    a.kind
        .precedence()
        .cmp(&b.kind.precedence())
        .then_with(|| natural_cmp(&a.name, &b.name))
        .then_with(|| a.id.cmp(&b.id))
}

fn sort_forest(nodes: &mut [OrgUnit]) {
    nodes.sort_by(sibling_order);
    for node in nodes.iter_mut() {
        sort_forest(&mut node.children);
    }
}

/// Root-to-target chain for `target`, or an empty vector when it is absent.
///
/// The search is depth-first pre-order from the roots; with duplicate ids the first unit in
/// document order wins.
pub fn path_to<'a>(forest: &'a [OrgUnit], target: &UnitId) -> Vec<&'a OrgUnit> {
    fn walk<'a>(nodes: &'a [OrgUnit], target: &UnitId, path: &mut Vec<&'a OrgUnit>) -> bool {
        for node in nodes {
            path.push(node);
            if &node.id == target || walk(&node.children, target, path) {
                return true;
            }
            path.pop();
        }
        false
    }

    let mut path = Vec::new();
    walk(forest, target, &mut path);
    path
}

/// First unit with `id` in pre-order.
pub fn find<'a>(forest: &'a [OrgUnit], id: &UnitId) -> Option<&'a OrgUnit> {
    path_to(forest, id).pop()
}

/// Every id reachable in the forest.
pub fn collect_ids(forest: &[OrgUnit]) -> BTreeSet<UnitId> {
    fn walk(nodes: &[OrgUnit], out: &mut BTreeSet<UnitId>) {
        for node in nodes {
            out.insert(node.id.clone());
            walk(&node.children, out);
        }
    }

    let mut out = BTreeSet::new();
    walk(forest, &mut out);
    out
}

/// Total number of nodes reachable in the forest.
pub fn count_nodes(forest: &[OrgUnit]) -> usize {
    forest.iter().map(OrgUnit::subtree_len).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::unit::UnitType;

    fn unit(id: u64, parent: Option<u64>, name: &str, kind: UnitType) -> OrgUnit {
        let node = OrgUnit::new(id, name, kind);
        match parent {
            Some(p) => node.with_parent(p),
            None => node,
        }
    }

    fn names(nodes: &[OrgUnit]) -> Vec<&str> {
        nodes.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn links_flat_list_through_parent_ids() {
        let input = vec![
            unit(2, Some(1), "Finance", UnitType::Directorate),
            unit(1, None, "Authority", UnitType::Authority),
            unit(3, Some(2), "Payroll", UnitType::Office),
        ];
        let forest = build_forest(&input);

        assert_eq!(names(&forest), ["Authority"]);
        assert_eq!(names(&forest[0].children), ["Finance"]);
        assert_eq!(names(&forest[0].children[0].children), ["Payroll"]);
        // The caller's list is untouched.
        assert!(input.iter().all(|u| u.children.is_empty()));
    }

    #[test]
    fn orphan_is_promoted_to_root() {
        let input = vec![unit(1, Some(99), "X", UnitType::Unit)];
        let forest = build_forest(&input);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, UnitId::from(1));
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn siblings_sort_by_type_then_name() {
        let input = vec![
            unit(1, None, "Root", UnitType::Authority),
            unit(2, Some(1), "Zeta office", UnitType::Office),
            unit(3, Some(1), "Board", UnitType::Authority),
            unit(4, Some(1), "Clinic 10", UnitType::Department),
            unit(5, Some(1), "Clinic 9", UnitType::Department),
        ];
        let forest = build_forest(&input);
        assert_eq!(
            names(&forest[0].children),
            ["Board", "Clinic 9", "Clinic 10", "Zeta office"]
        );
    }

    #[test]
    fn nested_single_root_is_kept_and_sorted() {
        let root = unit(1, None, "Root", UnitType::Authority).with_children(vec![
            unit(3, Some(1), "Office", UnitType::Office),
            unit(2, Some(1), "Directorate", UnitType::Directorate),
        ]);
        let forest = build_forest(&[root]);
        assert_eq!(forest.len(), 1);
        assert_eq!(names(&forest[0].children), ["Directorate", "Office"]);
    }

    #[test]
    fn cycles_do_not_lose_nodes() {
        let input = vec![
            unit(1, Some(2), "A", UnitType::Unit),
            unit(2, Some(1), "B", UnitType::Unit),
            unit(3, Some(3), "Self", UnitType::Unit),
        ];
        let forest = build_forest(&input);
        assert_eq!(count_nodes(&forest), 3);
    }

    #[test]
    fn path_to_returns_root_first_chain() {
        let input = vec![
            unit(1, None, "A", UnitType::Authority),
            unit(2, Some(1), "B", UnitType::Directorate),
            unit(3, Some(2), "C", UnitType::Department),
        ];
        let forest = build_forest(&input);

        let path: Vec<&str> = path_to(&forest, &UnitId::from(3))
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(path, ["A", "B", "C"]);
        assert!(path_to(&forest, &UnitId::from(42)).is_empty());
        assert_eq!(
            find(&forest, &UnitId::new("2")).map(|n| n.name.as_str()),
            Some("B")
        );
    }

    #[test]
    fn duplicate_ids_resolve_to_first_in_document_order() {
        let forest = vec![
            unit(1, None, "First", UnitType::Authority)
                .with_children(vec![unit(5, Some(1), "Nested dup", UnitType::Unit)]),
            unit(5, None, "Top-level dup", UnitType::Unit),
        ];
        assert_eq!(
            find(&forest, &UnitId::from(5)).map(|n| n.name.as_str()),
            Some("Nested dup")
        );
    }

    #[test]
    fn collect_ids_covers_every_level() {
        let input = vec![
            unit(1, None, "A", UnitType::Authority),
            unit(2, Some(1), "B", UnitType::Unit),
            unit(3, None, "C", UnitType::Office),
        ];
        let ids = collect_ids(&build_forest(&input));
        assert_eq!(ids.len(), 3);
        assert!(ids.contains(&UnitId::from(2)));
    }
}
