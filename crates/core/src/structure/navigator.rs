//! Expansion and selection state for the structure view.
//!
//! The navigator owns the canonical forest, the current search query, the expanded-id set,
//! and the selected id. The URL fragment and the clipboard are reached only through the
//! [`NavigationPort`] and [`ClipboardPort`] traits, so the state machine stays pure and can be
//! driven from tests, the web layer, or the CLI.

use super::search::{filter_forest, SearchQuery};
use super::tree::{collect_ids, find, path_to};
use super::unit::{OrgUnit, UnitId};
use crate::constants::UNIT_FRAGMENT_PREFIX;
use std::collections::BTreeSet;

/// Failure reported by a side-effecting port. Never fatal for the navigator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct PortError(pub String);

/// Access to the page's navigation fragment (the part after `#`).
pub trait NavigationPort {
    /// Current fragment without the leading `#`, if any.
    fn fragment(&self) -> Option<String>;

    /// Replace the fragment without adding a history entry.
    fn replace_fragment(&mut self, fragment: &str) -> Result<(), PortError>;
}

/// Best-effort clipboard access.
pub trait ClipboardPort {
    fn write_text(&mut self, text: &str) -> Result<(), PortError>;
}

/// In-memory navigation port: holds the fragment it was given and records replacements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryNavigation {
    fragment: Option<String>,
}

impl MemoryNavigation {
    pub fn new(fragment: Option<String>) -> Self {
        Self { fragment }
    }

    /// Port whose initial fragment deep-links `id`.
    pub fn for_unit(id: &UnitId) -> Self {
        Self::new(Some(unit_fragment(id)))
    }
}

impl NavigationPort for MemoryNavigation {
    fn fragment(&self) -> Option<String> {
        self.fragment.clone()
    }

    fn replace_fragment(&mut self, fragment: &str) -> Result<(), PortError> {
        self.fragment = Some(fragment.to_string());
        Ok(())
    }
}

/// `unit-<id>`
pub fn unit_fragment(id: &UnitId) -> String {
    format!("{UNIT_FRAGMENT_PREFIX}{id}")
}

/// Parse a `unit-<id>` fragment (a leading `#` is accepted).
pub fn parse_unit_fragment(fragment: &str) -> Option<UnitId> {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    fragment
        .strip_prefix(UNIT_FRAGMENT_PREFIX)
        .filter(|id| !id.is_empty())
        .map(UnitId::new)
}

/// One visible row of the rendered tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeRow<'a> {
    pub unit: &'a OrgUnit,
    pub depth: usize,
    pub expanded: bool,
    pub selected: bool,
}

#[derive(Debug)]
pub struct Navigator<N: NavigationPort> {
    forest: Vec<OrgUnit>,
    filtered: Vec<OrgUnit>,
    query: SearchQuery,
    expanded: BTreeSet<UnitId>,
    selected: Option<UnitId>,
    navigation: N,
}

impl<N: NavigationPort> Navigator<N> {
    /// Create a navigator and apply the initial state.
    ///
    /// If the port's fragment deep-links a unit present in the forest, the path to it is
    /// expanded and it becomes the selection. Otherwise the first root is selected, or nothing
    /// when the forest is empty. The initial state never writes the fragment.
    pub fn new(forest: Vec<OrgUnit>, navigation: N) -> Self {
        let mut navigator = Self {
            filtered: forest.clone(),
            forest,
            query: SearchQuery::default(),
            expanded: BTreeSet::new(),
            selected: None,
            navigation,
        };

        let linked = navigator
            .navigation
            .fragment()
            .as_deref()
            .and_then(parse_unit_fragment);

        if let Some(id) = linked {
            let path: Vec<UnitId> = path_to(&navigator.forest, &id)
                .iter()
                .map(|n| n.id.clone())
                .collect();
            if let Some(last) = path.last().cloned() {
                navigator.expanded.extend(path);
                navigator.selected = Some(last);
            }
        }

        if navigator.selected.is_none() {
            navigator.selected = navigator.forest.first().map(|root| root.id.clone());
        }

        navigator
    }

    pub fn forest(&self) -> &[OrgUnit] {
        &self.forest
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn expanded(&self) -> &BTreeSet<UnitId> {
        &self.expanded
    }

    pub fn is_expanded(&self, id: &UnitId) -> bool {
        self.expanded.contains(id)
    }

    pub fn selected_id(&self) -> Option<&UnitId> {
        self.selected.as_ref()
    }

    /// The selected unit, looked up in the full (unfiltered) forest.
    pub fn selected(&self) -> Option<&OrgUnit> {
        self.selected.as_ref().and_then(|id| find(&self.forest, id))
    }

    pub fn navigation(&self) -> &N {
        &self.navigation
    }

    /// Forest pruned by the current query.
    pub fn visible_forest(&self) -> &[OrgUnit] {
        &self.filtered
    }

    /// Change the search query and re-derive the filtered forest.
    pub fn set_query(&mut self, raw: &str) {
        let query = SearchQuery::new(raw);
        if query == self.query {
            return;
        }
        self.filtered = filter_forest(&self.forest, &query);
        self.query = query;
    }

    /// Flip expansion of `id`. Leaves and unknown ids are ignored.
    ///
    /// Returns whether the unit is expanded afterwards.
    pub fn toggle(&mut self, id: &UnitId) -> bool {
        let has_children = find(&self.forest, id).is_some_and(OrgUnit::has_children);
        if !has_children {
            return false;
        }
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.clone());
            true
        }
    }

    /// Select `id`, expand every unit on the path to it, and write `unit-<id>` to the
    /// navigation fragment.
    ///
    /// A failed fragment write is logged and otherwise ignored. Returns the selected unit, or
    /// `None` (leaving state untouched) when `id` is not in the forest.
    pub fn select(&mut self, id: &UnitId) -> Option<&OrgUnit> {
        let path: Vec<UnitId> = path_to(&self.forest, id)
            .iter()
            .map(|n| n.id.clone())
            .collect();
        let last = path.last().cloned()?;

        self.expanded.extend(path);
        if let Err(e) = self.navigation.replace_fragment(&unit_fragment(&last)) {
            tracing::debug!("could not update navigation fragment: {e}");
        }
        self.selected = Some(last);
        self.selected()
    }

    pub fn expand_all(&mut self) {
        self.expanded = collect_ids(&self.forest);
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Absolute deep link to the selected unit under `page_url`.
    pub fn deep_link(&self, page_url: &str) -> Option<String> {
        self.selected
            .as_ref()
            .map(|id| format!("{}#{}", page_url, unit_fragment(id)))
    }

    /// Copy the selected unit's deep link. Clipboard failures are swallowed.
    ///
    /// Returns the link that was offered to the clipboard.
    pub fn copy_deep_link(
        &self,
        page_url: &str,
        clipboard: &mut impl ClipboardPort,
    ) -> Option<String> {
        let link = self.deep_link(page_url)?;
        if let Err(e) = clipboard.write_text(&link) {
            tracing::debug!("clipboard write failed: {e}");
        }
        Some(link)
    }

    /// Rows of the filtered forest that are currently visible, in render order.
    ///
    /// A unit's children are visible only when the unit is expanded.
    pub fn visible_rows(&self) -> Vec<TreeRow<'_>> {
        fn walk<'a, N: NavigationPort>(
            nav: &'a Navigator<N>,
            nodes: &'a [OrgUnit],
            depth: usize,
            out: &mut Vec<TreeRow<'a>>,
        ) {
            for node in nodes {
                let expanded = node.has_children() && nav.is_expanded(&node.id);
                out.push(TreeRow {
                    unit: node,
                    depth,
                    expanded,
                    selected: nav.selected.as_ref() == Some(&node.id),
                });
                if expanded {
                    walk(nav, &node.children, depth + 1, out);
                }
            }
        }

        let mut rows = Vec::new();
        walk(self, &self.filtered, 0, &mut rows);
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::tree::build_forest;
    use crate::structure::unit::UnitType;

    struct FailingNavigation;

    impl NavigationPort for FailingNavigation {
        fn fragment(&self) -> Option<String> {
            None
        }

        fn replace_fragment(&mut self, _fragment: &str) -> Result<(), PortError> {
            Err(PortError("history unavailable".into()))
        }
    }

    #[derive(Default)]
    struct RecordingClipboard {
        written: Vec<String>,
        fail: bool,
    }

    impl ClipboardPort for RecordingClipboard {
        fn write_text(&mut self, text: &str) -> Result<(), PortError> {
            if self.fail {
                return Err(PortError("denied".into()));
            }
            self.written.push(text.to_string());
            Ok(())
        }
    }

    fn forest() -> Vec<OrgUnit> {
        build_forest(&[
            OrgUnit::new(1, "A", UnitType::Authority),
            OrgUnit::new(2, "B", UnitType::Directorate).with_parent(1),
            OrgUnit::new(3, "C", UnitType::Department).with_parent(2),
            OrgUnit::new(4, "D", UnitType::Office),
        ])
    }

    fn id(n: u64) -> UnitId {
        UnitId::from(n)
    }

    #[test]
    fn initial_state_selects_first_root_without_fragment() {
        let nav = Navigator::new(forest(), MemoryNavigation::default());
        assert_eq!(nav.selected_id(), Some(&id(1)));
        assert!(nav.expanded().is_empty());
        assert_eq!(nav.navigation().fragment(), None);
    }

    #[test]
    fn initial_state_follows_deep_link() {
        let nav = Navigator::new(forest(), MemoryNavigation::for_unit(&id(3)));
        assert_eq!(nav.selected_id(), Some(&id(3)));
        let expanded: Vec<_> = nav.expanded().iter().cloned().collect();
        assert_eq!(expanded, [id(1), id(2), id(3)]);
    }

    #[test]
    fn unknown_deep_link_falls_back_to_first_root() {
        let nav = Navigator::new(forest(), MemoryNavigation::new(Some("unit-99".into())));
        assert_eq!(nav.selected_id(), Some(&id(1)));
        assert!(nav.expanded().is_empty());

        let nav = Navigator::new(forest(), MemoryNavigation::new(Some("faq-1".into())));
        assert_eq!(nav.selected_id(), Some(&id(1)));
    }

    #[test]
    fn empty_forest_selects_nothing() {
        let nav = Navigator::new(Vec::new(), MemoryNavigation::for_unit(&id(1)));
        assert_eq!(nav.selected_id(), None);
        assert!(nav.visible_rows().is_empty());
    }

    #[test]
    fn select_expands_path_and_writes_fragment() {
        let mut nav = Navigator::new(forest(), MemoryNavigation::default());
        let name = nav.select(&id(3)).map(|u| u.name.clone());
        assert_eq!(name.as_deref(), Some("C"));
        assert!(nav.is_expanded(&id(1)) && nav.is_expanded(&id(2)));
        assert_eq!(nav.navigation().fragment().as_deref(), Some("unit-3"));

        assert!(nav.select(&id(99)).is_none());
        assert_eq!(nav.selected_id(), Some(&id(3)));
    }

    #[test]
    fn select_survives_fragment_write_failure() {
        let mut nav = Navigator::new(forest(), FailingNavigation);
        assert!(nav.select(&id(2)).is_some());
        assert_eq!(nav.selected_id(), Some(&id(2)));
    }

    #[test]
    fn toggle_ignores_leaves() {
        let mut nav = Navigator::new(forest(), MemoryNavigation::default());
        assert!(nav.toggle(&id(1)));
        assert!(!nav.toggle(&id(1)));
        assert!(!nav.toggle(&id(4)));
        assert!(!nav.is_expanded(&id(4)));
    }

    #[test]
    fn expand_and_collapse_all() {
        let mut nav = Navigator::new(forest(), MemoryNavigation::default());
        nav.expand_all();
        assert_eq!(nav.expanded().len(), 4);
        assert_eq!(nav.visible_rows().len(), 4);
        nav.collapse_all();
        assert!(nav.expanded().is_empty());
        // Only the roots remain visible.
        assert_eq!(nav.visible_rows().len(), 2);
    }

    #[test]
    fn query_filters_visible_rows_but_not_selection_lookup() {
        let mut nav = Navigator::new(forest(), MemoryNavigation::default());
        nav.expand_all();
        nav.set_query("c");
        let rows: Vec<(&str, usize)> = nav
            .visible_rows()
            .iter()
            .map(|r| (r.unit.name.as_str(), r.depth))
            .collect();
        assert_eq!(rows, [("A", 0), ("B", 1), ("C", 2)]);
        assert_eq!(nav.selected().map(|u| u.name.as_str()), Some("A"));
        assert_eq!(nav.forest().len(), 2);
    }

    #[test]
    fn deep_link_copy_is_best_effort() {
        let mut nav = Navigator::new(forest(), MemoryNavigation::default());
        nav.select(&id(2));

        let mut clipboard = RecordingClipboard::default();
        let link = nav.copy_deep_link("https://example.ly/structure", &mut clipboard);
        assert_eq!(link.as_deref(), Some("https://example.ly/structure#unit-2"));
        assert_eq!(clipboard.written.len(), 1);

        let mut broken = RecordingClipboard {
            fail: true,
            ..Default::default()
        };
        assert!(nav
            .copy_deep_link("https://example.ly/structure", &mut broken)
            .is_some());
    }

    #[test]
    fn parses_fragments() {
        assert_eq!(parse_unit_fragment("#unit-12"), Some(UnitId::new("12")));
        assert_eq!(parse_unit_fragment("unit-abc"), Some(UnitId::new("abc")));
        assert_eq!(parse_unit_fragment("unit-"), None);
        assert_eq!(parse_unit_fragment("section-1"), None);
    }
}
