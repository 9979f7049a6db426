// © 2019, ETH Zurich
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{
    term::Term,
    var::{Var, VarSet},
};
use itertools::Itertools;
use std::{collections::BTreeMap, fmt};

/// An injective variable-to-variable renaming.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Renaming(BTreeMap<Var, Var>);

impl Renaming {
    pub fn new() -> Self {
        Renaming(BTreeMap::new())
    }

    /// Rename every variable of `vs` to one fresh with respect to `wrt` and
    /// to the fresh names already chosen. This is the one primitive behind
    /// every capture-avoiding rename in the heap algebra.
    pub fn fresh(vs: &VarSet, wrt: &VarSet) -> Renaming {
        let mut avoid = wrt.union(vs);
        let mut map = BTreeMap::new();
        for v in vs.iter() {
            let fresh = Var::fresh(&v.name, &avoid);
            avoid.insert(fresh.clone());
            map.insert(v.clone(), fresh);
        }
        Renaming(map)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn insert(&mut self, from: Var, to: Var) {
        debug_assert!(
            !self.0.values().contains(&to),
            "renaming must stay injective"
        );
        self.0.insert(from, to);
    }

    pub fn apply(&self, v: &Var) -> Var {
        match self.0.get(v) {
            Some(w) => w.clone(),
            None => v.clone(),
        }
    }

    pub fn apply_set(&self, vs: &VarSet) -> VarSet {
        vs.iter().map(|v| self.apply(v)).collect()
    }

    pub fn domain(&self) -> VarSet {
        self.0.keys().cloned().collect()
    }

    pub fn range(&self) -> VarSet {
        self.0.values().cloned().collect()
    }

    pub fn invert(&self) -> Renaming {
        Renaming(self.0.iter().map(|(k, v)| (v.clone(), k.clone())).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Var, &Var)> {
        self.0.iter()
    }
}

impl fmt::Display for Renaming {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{}]",
            self.0.iter().map(|(k, v)| format!("{} -> {}", k, v)).join(", ")
        )
    }
}

/// A variable-to-term substitution with deterministic iteration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Subst(BTreeMap<Var, Term>);

impl Subst {
    pub fn new() -> Self {
        Subst(BTreeMap::new())
    }

    pub fn single(v: Var, t: Term) -> Self {
        let mut sub = Subst::new();
        sub.insert(v, t);
        sub
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn insert(&mut self, v: Var, t: Term) {
        self.0.insert(v, t);
    }

    pub fn get(&self, v: &Var) -> Option<&Term> {
        self.0.get(v)
    }

    pub fn domain(&self) -> VarSet {
        self.0.keys().cloned().collect()
    }

    pub fn range_fv(&self) -> VarSet {
        let mut vs = VarSet::new();
        for t in self.0.values() {
            vs.extend(t.free_vars());
        }
        vs
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Var, &Term)> {
        self.0.iter()
    }

    /// When every mapping is variable-to-variable and injective, the
    /// substitution is a renaming.
    pub fn as_renaming(&self) -> Option<Renaming> {
        let mut map = BTreeMap::new();
        let mut range = VarSet::new();
        for (v, t) in &self.0 {
            match t {
                Term::Var(w) if range.insert(w.clone()) => {
                    map.insert(v.clone(), w.clone());
                }
                _ => return None,
            }
        }
        Some(Renaming(map))
    }
}

impl From<&Renaming> for Subst {
    fn from(r: &Renaming) -> Subst {
        Subst(
            r.0.iter()
                .map(|(k, v)| (k.clone(), Term::Var(v.clone())))
                .collect(),
        )
    }
}

impl fmt::Display for Subst {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{}]",
            self.0.iter().map(|(k, v)| format!("{} -> {}", k, v)).join(", ")
        )
    }
}
