//! Boundary decode for the `/structures` resource.
//!
//! The endpoint answers with one of three shapes:
//! - a single unit object (usually a root with `children` already populated),
//! - a JSON array of units (flat with `parent_id`, or partially nested),
//! - a wrapper object `{ "data": [...] }`.
//!
//! [`StructurePayload`] turns any of them into one canonical list of [`OrgUnit`] records before
//! the tree builder runs, so nothing downstream branches on wire shape.

use super::unit::{normalize_employees, OrgUnit, UnitId, UnitType};
use crate::{PortalError, PortalResult};
use serde::Deserialize;
use serde_json::Value;

/// Discriminated form of a `/structures` response.
#[derive(Debug, Clone, PartialEq)]
pub enum StructurePayload {
    /// A single unit object.
    Single(OrgUnit),
    /// A bare array of units.
    List(Vec<OrgUnit>),
    /// `{ "data": [...] }`
    Wrapped(Vec<OrgUnit>),
}

impl StructurePayload {
    /// Classify and decode a parsed JSON body.
    ///
    /// Individual unit records that cannot be decoded (for example a missing `id` or `name`)
    /// are logged and skipped. Malformed `employees` never fail the decode.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::InvalidPayload` only when the body is neither an array nor an
    /// object, or is an object that is neither a wrapper nor a decodable unit.
    pub fn from_value(value: &Value) -> PortalResult<Self> {
        match value {
            Value::Array(items) => Ok(Self::List(decode_units(items))),
            Value::Object(map) => match map.get("data") {
                Some(Value::Array(items)) => Ok(Self::Wrapped(decode_units(items))),
                _ => decode_unit(value).map(Self::Single).ok_or_else(|| {
                    PortalError::InvalidPayload(
                        "object is neither a unit nor a { data: [...] } wrapper".into(),
                    )
                }),
            },
            other => Err(PortalError::InvalidPayload(format!(
                "expected an array or object, got {}",
                json_kind(other)
            ))),
        }
    }

    /// The decoded units in source order, ready for the tree builder.
    pub fn into_units(self) -> Vec<OrgUnit> {
        match self {
            Self::Single(unit) => vec![unit],
            Self::List(units) | Self::Wrapped(units) => units,
        }
    }
}

#[derive(Deserialize)]
struct UnitWire {
    id: UnitId,
    #[serde(default)]
    parent_id: Option<Value>,
    name: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    employees: Option<Value>,
    #[serde(default)]
    children: Option<Value>,
}

fn decode_units(items: &[Value]) -> Vec<OrgUnit> {
    items.iter().filter_map(decode_unit).collect()
}

fn decode_unit(value: &Value) -> Option<OrgUnit> {
    let wire = match UnitWire::deserialize(value) {
        Ok(wire) => wire,
        Err(e) => {
            tracing::warn!("skipping undecodable structure unit: {e}");
            return None;
        }
    };

    if wire.name.trim().is_empty() {
        tracing::warn!("skipping structure unit {} with empty name", wire.id);
        return None;
    }

    let kind = match wire.kind.as_deref().and_then(UnitType::parse) {
        Some(kind) => kind,
        None => {
            tracing::warn!(
                "unit {} has unknown type {:?}; treating as unit",
                wire.id,
                wire.kind
            );
            UnitType::Unit
        }
    };

    let children = match wire.children {
        Some(Value::Array(items)) => decode_units(&items),
        _ => Vec::new(),
    };

    Some(OrgUnit {
        id: wire.id,
        parent_id: wire
            .parent_id
            .as_ref()
            .and_then(|v| UnitId::deserialize(v).ok()),
        name: wire.name,
        kind,
        phone: non_blank(wire.phone),
        email: non_blank(wire.email),
        address: non_blank(wire.address),
        employees: normalize_employees(wire.employees.as_ref()),
        children,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_all_three_shapes() {
        let single = json!({ "id": 1, "name": "Authority", "type": "authority", "children": [] });
        assert!(matches!(
            StructurePayload::from_value(&single).unwrap(),
            StructurePayload::Single(_)
        ));

        let list = json!([{ "id": 1, "name": "A", "type": "unit" }]);
        assert!(matches!(
            StructurePayload::from_value(&list).unwrap(),
            StructurePayload::List(_)
        ));

        let wrapped = json!({ "data": [{ "id": 1, "name": "A", "type": "unit" }] });
        let payload = StructurePayload::from_value(&wrapped).unwrap();
        assert!(matches!(payload, StructurePayload::Wrapped(_)));
        assert_eq!(payload.into_units().len(), 1);
    }

    #[test]
    fn rejects_scalars_and_foreign_objects() {
        for value in [json!(null), json!(3), json!("x"), json!(true)] {
            let err = StructurePayload::from_value(&value).expect_err("scalar");
            assert!(matches!(err, PortalError::InvalidPayload(_)));
        }
        assert!(StructurePayload::from_value(&json!({ "status": "ok" })).is_err());
    }

    #[test]
    fn decodes_nested_children_and_encoded_employees() {
        let body = r#"{
            "id": 1, "name": "Authority", "type": "authority",
            "children": [
                { "id": 2, "parent_id": 1, "name": "Finance", "type": "directorate",
                  "employees": "[{\"name\":\"Omar\"}]",
                  "children": [{ "id": 3, "parent_id": 2, "name": "Payroll", "type": "office" }] }
            ]
        }"#;
        let value: Value = serde_json::from_str(body).unwrap();
        let units = StructurePayload::from_value(&value).unwrap().into_units();
        let finance = &units[0].children[0];
        assert_eq!(finance.employees[0].name, "Omar");
        assert_eq!(finance.children[0].name, "Payroll");
        assert_eq!(finance.parent_id, Some(UnitId::from(1)));
    }

    #[test]
    fn skips_broken_records_and_defaults_unknown_type() {
        let list = json!([
            { "name": "no id", "type": "unit" },
            { "id": 7, "name": "   ", "type": "unit" },
            { "id": 8, "name": "Lab", "type": "laboratory", "phone": "" },
            { "id": 9, "name": "Clinic", "parent_id": "" }
        ]);
        let units = StructurePayload::from_value(&list).unwrap().into_units();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].kind, UnitType::Unit);
        assert_eq!(units[0].phone, None);
        assert_eq!(units[1].kind, UnitType::Unit);
        assert_eq!(units[1].parent_id, None);
    }
}
