// © 2019, ETH Zurich
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use itertools::Itertools;
use std::{collections::BTreeSet, fmt};

/// A program or logical variable.
///
/// `id == 0` marks a variable named directly by the frontend; freshening
/// produces variables with the same name and a strictly positive `id`.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Var {
    pub name: String,
    pub id: usize,
}

impl Var {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Var {
            name: name.into(),
            id: 0,
        }
    }

    pub fn with_id<S: Into<String>>(name: S, id: usize) -> Self {
        Var {
            name: name.into(),
            id,
        }
    }

    /// A variable with this name that occurs in neither `wrt` nor any set
    /// `wrt` subsumes. The id is derived from `wrt` rather than a global
    /// counter, so renamings are reproducible run to run.
    pub fn fresh(name: &str, wrt: &VarSet) -> Var {
        let id = 1 + wrt.iter().map(|v| v.id).max().unwrap_or(0);
        Var {
            name: name.to_string(),
            id,
        }
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.id == 0 {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}${}", self.name, self.id)
        }
    }
}

/// An ordered set of variables. Iteration order is deterministic.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct VarSet(BTreeSet<Var>);

impl VarSet {
    pub fn new() -> Self {
        VarSet(BTreeSet::new())
    }

    pub fn singleton(v: Var) -> Self {
        let mut vs = BTreeSet::new();
        vs.insert(v);
        VarSet(vs)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, v: &Var) -> bool {
        self.0.contains(v)
    }

    pub fn insert(&mut self, v: Var) -> bool {
        self.0.insert(v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Var> {
        self.0.iter()
    }

    pub fn union(&self, other: &VarSet) -> VarSet {
        VarSet(self.0.union(&other.0).cloned().collect())
    }

    pub fn difference(&self, other: &VarSet) -> VarSet {
        VarSet(self.0.difference(&other.0).cloned().collect())
    }

    pub fn intersection(&self, other: &VarSet) -> VarSet {
        VarSet(self.0.intersection(&other.0).cloned().collect())
    }

    pub fn is_disjoint(&self, other: &VarSet) -> bool {
        self.0.is_disjoint(&other.0)
    }

    pub fn is_subset(&self, other: &VarSet) -> bool {
        self.0.is_subset(&other.0)
    }
}

impl FromIterator<Var> for VarSet {
    fn from_iter<I: IntoIterator<Item = Var>>(iter: I) -> Self {
        VarSet(iter.into_iter().collect())
    }
}

impl Extend<Var> for VarSet {
    fn extend<I: IntoIterator<Item = Var>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl IntoIterator for VarSet {
    type Item = Var;
    type IntoIter = std::collections::btree_set::IntoIter<Var>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a VarSet {
    type Item = &'a Var;
    type IntoIter = std::collections::btree_set::Iter<'a, Var>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for VarSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{{}}}", self.0.iter().map(|v| v.to_string()).join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_avoids_wrt() {
        let wrt: VarSet = [Var::new("x"), Var::with_id("x", 3), Var::new("y")]
            .into_iter()
            .collect();
        let v = Var::fresh("x", &wrt);
        assert!(!wrt.contains(&v));
        assert_eq!(v.id, 4);
    }

    #[test]
    fn fresh_is_deterministic() {
        let wrt = VarSet::singleton(Var::new("p"));
        assert_eq!(Var::fresh("q", &wrt), Var::fresh("q", &wrt));
    }

    #[test]
    fn set_operations() {
        let a: VarSet = [Var::new("x"), Var::new("y")].into_iter().collect();
        let b = VarSet::singleton(Var::new("y"));
        assert!(b.is_subset(&a));
        assert_eq!(a.difference(&b), VarSet::singleton(Var::new("x")));
        assert!(a.difference(&b).is_disjoint(&b));
        assert_eq!(a.union(&b), a);
    }
}
