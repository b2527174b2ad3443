//! Component types and the delay table that prices them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// The kind of component a circuit node represents.
///
/// Keywords are matched case-insensitively. Anything that is not one of the
/// built-in keywords becomes [`ComponentType::Custom`] holding the
/// upper-cased keyword, so description files may use `XOR`, `AND`, `FA` and
/// price them through the delay table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComponentType {
    /// Adder.
    Add,
    /// Multiplier.
    Mul,
    /// Register.
    Reg,
    /// Multiplexer.
    Mux,
    /// Primary input. Critical paths start here.
    Input,
    /// Primary output. Critical paths end here.
    Output,
    /// Any other component keyword, upper-cased.
    Custom(String),
    /// A node that was only referenced as an input and never declared.
    Unknown,
}

impl ComponentType {
    /// Parses a component keyword.
    pub fn parse(keyword: &str) -> Self {
        let upper = keyword.trim().to_ascii_uppercase();
        match upper.as_str() {
            "ADD" => ComponentType::Add,
            "MUL" => ComponentType::Mul,
            "REG" => ComponentType::Reg,
            "MUX" => ComponentType::Mux,
            "INPUT" => ComponentType::Input,
            "OUTPUT" => ComponentType::Output,
            "UNKNOWN" => ComponentType::Unknown,
            _ => ComponentType::Custom(upper),
        }
    }

    /// Returns the upper-case keyword for this type.
    pub fn keyword(&self) -> &str {
        match self {
            ComponentType::Add => "ADD",
            ComponentType::Mul => "MUL",
            ComponentType::Reg => "REG",
            ComponentType::Mux => "MUX",
            ComponentType::Input => "INPUT",
            ComponentType::Output => "OUTPUT",
            ComponentType::Custom(name) => name,
            ComponentType::Unknown => "UNKNOWN",
        }
    }

    /// Returns `true` for [`ComponentType::Input`].
    pub fn is_input(&self) -> bool {
        matches!(self, ComponentType::Input)
    }

    /// Returns `true` for [`ComponentType::Output`].
    pub fn is_output(&self) -> bool {
        matches!(self, ComponentType::Output)
    }
}

impl FromStr for ComponentType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ComponentType::parse(s))
    }
}

impl From<String> for ComponentType {
    fn from(keyword: String) -> Self {
        ComponentType::parse(&keyword)
    }
}

impl From<ComponentType> for String {
    fn from(component: ComponentType) -> Self {
        component.keyword().to_string()
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Maps component types to their propagation delay in time units.
///
/// Types without an entry, including [`ComponentType::Unknown`], contribute
/// zero delay. [`DelayTable::default`] holds the standard library of delays:
/// ADD, MUL and MUX at 1.0, REG at 0.2, INPUT and OUTPUT at 0.0.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayTable {
    delays: BTreeMap<ComponentType, f64>,
}

impl Default for DelayTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.set(ComponentType::Add, 1.0);
        table.set(ComponentType::Mul, 1.0);
        table.set(ComponentType::Reg, 0.2);
        table.set(ComponentType::Mux, 1.0);
        table.set(ComponentType::Input, 0.0);
        table.set(ComponentType::Output, 0.0);
        table
    }
}

impl DelayTable {
    /// Creates a table with no entries; every component costs zero.
    pub fn empty() -> Self {
        Self {
            delays: BTreeMap::new(),
        }
    }

    /// Returns the default table extended with `overrides`, keyed by
    /// component keyword.
    pub fn with_overrides<I, K>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut table = Self::default();
        for (keyword, delay) in overrides {
            table.set(ComponentType::parse(keyword.as_ref()), delay);
        }
        table
    }

    /// Sets the delay for a component type, replacing any previous entry.
    pub fn set(&mut self, component: ComponentType, delay: f64) {
        self.delays.insert(component, delay);
    }

    /// Returns the configured delay, or `None` if the type has no entry.
    pub fn get(&self, component: &ComponentType) -> Option<f64> {
        self.delays.get(component).copied()
    }

    /// Returns the delay for `component`, defaulting to zero.
    pub fn delay(&self, component: &ComponentType) -> f64 {
        self.get(component).unwrap_or(0.0)
    }

    /// Returns `true` if the table has an explicit entry for `component`.
    pub fn contains(&self, component: &ComponentType) -> bool {
        self.delays.contains_key(component)
    }

    /// Iterates over all entries, built-in types first.
    pub fn iter(&self) -> impl Iterator<Item = (&ComponentType, f64)> {
        self.delays.iter().map(|(k, v)| (k, *v))
    }
}
