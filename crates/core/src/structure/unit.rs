//! Organisational unit model.
//!
//! An [`OrgUnit`] is one node of the authority's organisational structure. Identity is the
//! [`UnitId`] alone: selection, expansion-set membership, and deep links all key on it.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// Opaque unit identifier.
///
/// The API sends ids as JSON numbers or strings, and deep links carry them as text, so ids
/// compare by their textual form: `12` and `"12"` are the same unit. The original JSON kind is
/// kept only so serialisation writes the id back the way it arrived.
#[derive(Debug, Clone)]
pub struct UnitId {
    text: String,
    numeric: bool,
}

impl UnitId {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            numeric: false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl From<u64> for UnitId {
    fn from(value: u64) -> Self {
        Self {
            text: value.to_string(),
            numeric: true,
        }
    }
}

impl From<&str> for UnitId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl PartialEq for UnitId {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for UnitId {}

impl Hash for UnitId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl PartialOrd for UnitId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UnitId {
    fn cmp(&self, other: &Self) -> Ordering {
        natural_cmp(&self.text, &other.text)
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for UnitId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self.text.parse::<u64>() {
            Ok(n) if self.numeric => serializer.serialize_u64(n),
            _ => serializer.serialize_str(&self.text),
        }
    }
}

impl<'de> Deserialize<'de> for UnitId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum IdWire {
            Number(u64),
            Text(String),
        }

        match IdWire::deserialize(deserializer)? {
            IdWire::Number(n) => Ok(UnitId::from(n)),
            IdWire::Text(s) if s.trim().is_empty() => {
                Err(serde::de::Error::custom("unit id cannot be empty"))
            }
            IdWire::Text(s) => Ok(UnitId::new(s)),
        }
    }
}

/// Kind of organisational unit, in display precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    Authority,
    Directorate,
    Department,
    Division,
    Unit,
    Center,
    Office,
}

impl UnitType {
    pub const ALL: [UnitType; 7] = [
        UnitType::Authority,
        UnitType::Directorate,
        UnitType::Department,
        UnitType::Division,
        UnitType::Unit,
        UnitType::Center,
        UnitType::Office,
    ];

    /// Sibling sort precedence: authority first, office last.
    pub fn precedence(self) -> u8 {
        self as u8
    }

    /// Display label shown in the tree badge and matched by search.
    pub fn label(self) -> &'static str {
        match self {
            UnitType::Authority => "الهيئة",
            UnitType::Directorate => "إدارة عامة",
            UnitType::Department => "قسم",
            UnitType::Division => "شعبة",
            UnitType::Unit => "وحدة",
            UnitType::Center => "مركز",
            UnitType::Office => "مكتب",
        }
    }

    /// Icon name used by the rendered tree.
    pub fn icon(self) -> &'static str {
        match self {
            UnitType::Authority | UnitType::Directorate => "landmark",
            UnitType::Center => "git-branch",
            UnitType::Department | UnitType::Division | UnitType::Unit | UnitType::Office => {
                "building"
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UnitType::Authority => "authority",
            UnitType::Directorate => "directorate",
            UnitType::Department => "department",
            UnitType::Division => "division",
            UnitType::Unit => "unit",
            UnitType::Center => "center",
            UnitType::Office => "office",
        }
    }

    /// Parse a wire value; `None` for anything outside the closed set.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(value))
    }
}

/// A member of staff listed on a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A node of the organisational structure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrgUnit {
    pub id: UnitId,
    pub parent_id: Option<UnitId>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: UnitType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub employees: Vec<Employee>,
    pub children: Vec<OrgUnit>,
}

impl OrgUnit {
    /// A bare unit with no contact data, employees, or children.
    pub fn new(id: impl Into<UnitId>, name: impl Into<String>, kind: UnitType) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            name: name.into(),
            kind,
            phone: None,
            email: None,
            address: None,
            employees: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<UnitId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_children(mut self, children: Vec<OrgUnit>) -> Self {
        self.children = children;
        self
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(OrgUnit::subtree_len).sum::<usize>()
    }
}

/// Normalise an `employees` field that may be absent, a list, or a JSON-encoded string.
///
/// Anything that does not resolve to a list yields an empty list. List entries that are not
/// employee objects with a non-empty `name` are skipped.
pub fn normalize_employees(value: Option<&serde_json::Value>) -> Vec<Employee> {
    use serde_json::Value;

    let items = match value {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(Value::String(encoded)) => match serde_json::from_str::<Value>(encoded) {
            Ok(Value::Array(items)) => items,
            Ok(_) | Err(_) => {
                tracing::debug!("employees string is not a JSON array; using empty list");
                return Vec::new();
            }
        },
        Some(_) => return Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<Employee>(item).ok())
        .filter(|e| !e.name.trim().is_empty())
        .collect()
}

/// Numeric-aware, case-insensitive string ordering (`"Unit 2" < "Unit 10"`).
///
/// Runs of decimal digits (ASCII or Arabic-Indic) compare by value. A digit facing a non-digit
/// compares as its ASCII form, so every number sorts in the same slot relative to letters
/// whatever its script. Everything else compares by lowercased character. Inputs that are
/// equal under those rules fall back to plain byte order, so the ordering is total.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                if digit_value(l).is_some() && digit_value(r).is_some() {
                    let ln = take_number(&mut left);
                    let rn = take_number(&mut right);
                    let ord = compare_digit_runs(&ln, &rn);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                    continue;
                }

                let ord = fold_digit(l).to_lowercase().cmp(fold_digit(r).to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                left.next();
                right.next();
            }
        }
    }
}

fn digit_value(c: char) -> Option<u8> {
    match c {
        '0'..='9' => Some(c as u8 - b'0'),
        '\u{0660}'..='\u{0669}' => Some((c as u32 - 0x0660) as u8),
        _ => None,
    }
}

fn fold_digit(c: char) -> char {
    match digit_value(c) {
        Some(d) => char::from(b'0' + d),
        None => c,
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Vec<u8> {
    let mut digits = Vec::new();
    while let Some(d) = chars.peek().copied().and_then(digit_value) {
        digits.push(d);
        chars.next();
    }
    digits
}

fn compare_digit_runs(a: &[u8], b: &[u8]) -> Ordering {
    let a = trim_leading_zeros(a);
    let b = trim_leading_zeros(b);
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn trim_leading_zeros(digits: &[u8]) -> &[u8] {
    let first = digits.iter().position(|&d| d != 0).unwrap_or(digits.len());
    &digits[first..]
}
