//! Query compiler for vehicle searches
//!
//! A fixed predicate catalog maps the recognized filter keys to match rules
//! over the vehicle and its owner; the compiler turns a multi-valued
//! criteria map into a conjunction of those predicates or reports the query
//! as unusable. Unknown keys are ignored. A key carrying more than one
//! value makes the whole query unusable, deliberately stricter than
//! skipping just that key: an ambiguous filter is refused outright, never
//! partially honored. An empty criteria map is valid and compiles to the
//! match-all plan — a different thing than an unusable one.
//!
//! Matching is case-sensitive, which is why the rendered SQL uses `instr`
//! rather than `LIKE` (SQLite's `LIKE` folds ASCII case). Filter values are
//! always carried as binds, never spliced into the SQL text.

use tracing::debug;
use vehicle_registry_core::vehicle::VehicleType;

/// Filter key matched as a case-sensitive substring of the description
pub const KEY_DESCRIPTION: &str = "description";
/// Filter key matched as a case-sensitive substring of the plate
pub const KEY_PLATE: &str = "plate";
/// Filter key matched as a prefix of the owner's first name
pub const KEY_OWNER_FIRST_NAME: &str = "ownerFirstName";
/// Filter key matched as a prefix of the owner's last name
pub const KEY_OWNER_LAST_NAME: &str = "ownerLastName";
/// Filter key matched against the decoded vehicle type
pub const KEY_VEHICLE_TYPE: &str = "vehicleType";

/// An ordered, multi-valued criteria map as supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    entries: Vec<(String, Vec<String>)>,
}

impl SearchCriteria {
    /// Create an empty criteria map
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under a key, preserving insertion order of keys
    pub fn push<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value.into()),
            None => self.entries.push((key, vec![value.into()])),
        }
    }

    /// Build a criteria map from `(key, value)` pairs
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut criteria = Self::new();
        for (key, value) in pairs {
            criteria.push(key, value);
        }
        criteria
    }

    /// Check whether no criteria were supplied
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over keys and their value lists in insertion order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// The single key/value pair, if the map holds exactly one key with
    /// exactly one value
    pub fn sole_entry(&self) -> Option<(&str, &str)> {
        match self.entries.as_slice() {
            [(key, values)] if values.len() == 1 => Some((key.as_str(), values[0].as_str())),
            _ => None,
        }
    }
}

/// A single compiled match rule over a vehicle and its owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    DescriptionContains(String),
    PlateContains(String),
    OwnerFirstNamePrefix(String),
    OwnerLastNamePrefix(String),
    TypeEquals(VehicleType),
    /// Matches no record at all; compiled from an undecodable type code.
    Nothing,
}

impl Predicate {
    /// SQL fragment over the `v` (vehicle) and `o` (owner) aliases
    pub(crate) fn sql(&self) -> &'static str {
        match self {
            Predicate::DescriptionContains(_) => "instr(v.description, ?) > 0",
            Predicate::PlateContains(_) => "instr(v.plate, ?) > 0",
            Predicate::OwnerFirstNamePrefix(_) => "instr(o.first_name, ?) = 1",
            Predicate::OwnerLastNamePrefix(_) => "instr(o.last_name, ?) = 1",
            Predicate::TypeEquals(_) => "v.vehicle_type = ?",
            Predicate::Nothing => "0 = 1",
        }
    }

    /// The bind value for the fragment, if it takes one
    pub(crate) fn bind(&self) -> Option<String> {
        match self {
            Predicate::DescriptionContains(value)
            | Predicate::PlateContains(value)
            | Predicate::OwnerFirstNamePrefix(value)
            | Predicate::OwnerLastNamePrefix(value) => Some(value.clone()),
            Predicate::TypeEquals(vehicle_type) => Some(vehicle_type.code().to_string()),
            Predicate::Nothing => None,
        }
    }
}

// The predicate catalog: one recognized key, one match rule.
fn predicate_for(key: &str, value: &str) -> Option<Predicate> {
    match key {
        KEY_DESCRIPTION => Some(Predicate::DescriptionContains(value.to_string())),
        KEY_PLATE => Some(Predicate::PlateContains(value.to_string())),
        KEY_OWNER_FIRST_NAME => Some(Predicate::OwnerFirstNamePrefix(value.to_string())),
        KEY_OWNER_LAST_NAME => Some(Predicate::OwnerLastNamePrefix(value.to_string())),
        KEY_VEHICLE_TYPE => Some(match VehicleType::from_code(value) {
            Some(vehicle_type) => Predicate::TypeEquals(vehicle_type),
            None => Predicate::Nothing,
        }),
        _ => None,
    }
}

/// A compiled search plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPlan {
    /// No criteria: every stored vehicle matches.
    All,
    /// Conjunction of the compiled predicates.
    Filtered(Vec<Predicate>),
}

/// Result of compiling a criteria map
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    Usable(QueryPlan),
    /// No recognized filter survived compilation, or a key carried more
    /// than one value.
    Unusable,
}

/// Compile a criteria map into a search plan.
pub fn compile(criteria: &SearchCriteria) -> CompileOutcome {
    debug!("compile: criteria={:?}", criteria);

    if criteria.is_empty() {
        return CompileOutcome::Usable(QueryPlan::All);
    }

    let mut predicates = Vec::new();
    for (key, values) in criteria.entries() {
        if values.len() > 1 {
            return CompileOutcome::Unusable;
        }
        let Some(value) = values.first() else {
            continue;
        };
        if let Some(predicate) = predicate_for(key, value) {
            predicates.push(predicate);
        }
    }

    if predicates.is_empty() {
        return CompileOutcome::Unusable;
    }

    debug!("compile: {} predicates", predicates.len());
    CompileOutcome::Usable(QueryPlan::Filtered(predicates))
}

/// Render a predicate conjunction as a WHERE clause and its bind values
pub(crate) fn where_clause(predicates: &[Predicate]) -> (String, Vec<String>) {
    let clause = predicates
        .iter()
        .map(Predicate::sql)
        .collect::<Vec<_>>()
        .join(" AND ");
    let binds = predicates.iter().filter_map(Predicate::bind).collect();
    (clause, binds)
}
