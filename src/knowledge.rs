//! Background knowledge: forbidden and required directed edges, plus
//! temporal tiers.
//!
//! Knowledge is keyed by variable name so it can be authored independently
//! of any particular graph instance. Tier order induces forbiddance: a
//! variable in a later tier cannot cause one in an earlier tier.

use rustc_hash::FxHashSet;

/// Forbidden/required edge constraints and tier membership.
#[derive(Clone, Debug, Default)]
pub struct Knowledge {
    forbidden: Vec<(String, String)>,
    required: Vec<(String, String)>,
    forbidden_set: FxHashSet<(String, String)>,
    required_set: FxHashSet<(String, String)>,
    tiers: Vec<Vec<String>>,
}

impl Knowledge {
    pub fn new() -> Self {
        Knowledge::default()
    }

    /// Forbid the directed edge `from -> to`.
    pub fn forbid(&mut self, from: impl Into<String>, to: impl Into<String>) {
        let pair = (from.into(), to.into());
        if self.forbidden_set.insert(pair.clone()) {
            self.forbidden.push(pair);
        }
    }

    /// Require the directed edge `from -> to`.
    pub fn require(&mut self, from: impl Into<String>, to: impl Into<String>) {
        let pair = (from.into(), to.into());
        if self.required_set.insert(pair.clone()) {
            self.required.push(pair);
        }
    }

    /// Append a variable to tier `tier`, growing the tier list as needed.
    pub fn add_to_tier(&mut self, tier: usize, name: impl Into<String>) {
        while self.tiers.len() <= tier {
            self.tiers.push(Vec::new());
        }
        self.tiers[tier].push(name.into());
    }

    pub fn is_empty(&self) -> bool {
        self.forbidden.is_empty() && self.required.is_empty() && self.tiers.is_empty()
    }

    /// True iff `from -> to` is forbidden, explicitly or by tier order.
    pub fn is_forbidden(&self, from: &str, to: &str) -> bool {
        if self
            .forbidden_set
            .contains(&(from.to_string(), to.to_string()))
        {
            return true;
        }
        // Later tiers cannot cause earlier tiers.
        match (self.tier_of(from), self.tier_of(to)) {
            (Some(tf), Some(tt)) => tt < tf,
            _ => false,
        }
    }

    pub fn is_required(&self, from: &str, to: &str) -> bool {
        self.required_set
            .contains(&(from.to_string(), to.to_string()))
    }

    /// Explicitly forbidden edges, in authoring order.
    pub fn forbidden_edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.forbidden.iter().map(|(f, t)| (f.as_str(), t.as_str()))
    }

    /// Required edges, in authoring order.
    pub fn required_edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.required.iter().map(|(f, t)| (f.as_str(), t.as_str()))
    }

    pub fn num_tiers(&self) -> usize {
        self.tiers.len()
    }

    pub fn tier(&self, i: usize) -> &[String] {
        self.tiers.get(i).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The tier containing `name`, if any.
    pub fn tier_of(&self, name: &str) -> Option<usize> {
        self.tiers
            .iter()
            .position(|tier| tier.iter().any(|n| n == name))
    }
}
