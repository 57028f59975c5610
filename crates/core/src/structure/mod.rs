//! Organisational structure: payload decode, tree builder, search, and navigation state.

pub mod navigator;
pub mod payload;
pub mod search;
pub mod tree;
pub mod unit;

pub use navigator::{
    parse_unit_fragment, unit_fragment, ClipboardPort, MemoryNavigation, NavigationPort,
    Navigator, PortError, TreeRow,
};
pub use payload::StructurePayload;
pub use search::{filter_forest, highlight_range, SearchQuery};
pub use tree::{build_forest, collect_ids, count_nodes, find, path_to, sibling_order};
pub use unit::{natural_cmp, normalize_employees, Employee, OrgUnit, UnitId, UnitType};

use crate::PortalResult;

/// Decode a `/structures` response body and build the canonical forest.
pub fn forest_from_value(value: &serde_json::Value) -> PortalResult<Vec<OrgUnit>> {
    let units = StructurePayload::from_value(value)?.into_units();
    Ok(build_forest(&units))
}
