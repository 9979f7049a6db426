// © 2019, ETH Zurich
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{
    subst::{Renaming, Subst},
    term::Term,
    var::VarSet,
};
use itertools::Itertools;
use std::fmt;

/// A quantifier-free boolean constraint over terms, kept in a flattened
/// normal form: `And`/`Or` never nest directly under themselves, never
/// contain their unit, and ground literals are evaluated away.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Formula {
    Tt,
    Ff,
    Eq(Term, Term),
    Dq(Term, Term),
    Lt(Term, Term),
    Le(Term, Term),
    And(Vec<Formula>),
    Or(Vec<Formula>),
}

impl Formula {
    pub fn tt() -> Formula {
        Formula::Tt
    }

    pub fn ff() -> Formula {
        Formula::Ff
    }

    pub fn eq(l: Term, r: Term) -> Formula {
        if l == r {
            return Formula::Tt;
        }
        if let (Term::Integer(_), Term::Integer(_)) = (&l, &r) {
            return Formula::Ff;
        }
        if l <= r {
            Formula::Eq(l, r)
        } else {
            Formula::Eq(r, l)
        }
    }

    pub fn dq(l: Term, r: Term) -> Formula {
        if l == r {
            return Formula::Ff;
        }
        if let (Term::Integer(_), Term::Integer(_)) = (&l, &r) {
            return Formula::Tt;
        }
        if l <= r {
            Formula::Dq(l, r)
        } else {
            Formula::Dq(r, l)
        }
    }

    pub fn lt(l: Term, r: Term) -> Formula {
        if let (Term::Integer(a), Term::Integer(b)) = (&l, &r) {
            return if a < b { Formula::Tt } else { Formula::Ff };
        }
        if l == r {
            return Formula::Ff;
        }
        Formula::Lt(l, r)
    }

    pub fn le(l: Term, r: Term) -> Formula {
        if let (Term::Integer(a), Term::Integer(b)) = (&l, &r) {
            return if a <= b { Formula::Tt } else { Formula::Ff };
        }
        if l == r {
            return Formula::Tt;
        }
        Formula::Le(l, r)
    }

    pub fn and(l: Formula, r: Formula) -> Formula {
        match (l, r) {
            (Formula::Tt, f) | (f, Formula::Tt) => f,
            (Formula::Ff, _) | (_, Formula::Ff) => Formula::Ff,
            (Formula::And(mut a), Formula::And(b)) => {
                for f in b {
                    if !a.contains(&f) {
                        a.push(f);
                    }
                }
                Formula::And(a)
            }
            (Formula::And(mut a), f) => {
                if !a.contains(&f) {
                    a.push(f);
                }
                Formula::And(a)
            }
            (f, Formula::And(b)) => {
                let mut a = vec![f];
                for g in b {
                    if !a.contains(&g) {
                        a.push(g);
                    }
                }
                Formula::And(a)
            }
            (f, g) => {
                if f == g {
                    f
                } else {
                    Formula::And(vec![f, g])
                }
            }
        }
    }

    pub fn and_all(fs: Vec<Formula>) -> Formula {
        fs.into_iter().fold(Formula::Tt, Formula::and)
    }

    pub fn or(l: Formula, r: Formula) -> Formula {
        match (l, r) {
            (Formula::Ff, f) | (f, Formula::Ff) => f,
            (Formula::Tt, _) | (_, Formula::Tt) => Formula::Tt,
            (Formula::Or(mut a), Formula::Or(b)) => {
                for f in b {
                    if !a.contains(&f) {
                        a.push(f);
                    }
                }
                Formula::Or(a)
            }
            (Formula::Or(mut a), f) => {
                if !a.contains(&f) {
                    a.push(f);
                }
                Formula::Or(a)
            }
            (f, Formula::Or(b)) => {
                let mut a = vec![f];
                for g in b {
                    if !a.contains(&g) {
                        a.push(g);
                    }
                }
                Formula::Or(a)
            }
            (f, g) => {
                if f == g {
                    f
                } else {
                    Formula::Or(vec![f, g])
                }
            }
        }
    }

    pub fn or_all(fs: Vec<Formula>) -> Formula {
        fs.into_iter().fold(Formula::Ff, Formula::or)
    }

    pub fn is_tt(&self) -> bool {
        matches!(self, Formula::Tt)
    }

    pub fn is_ff(&self) -> bool {
        matches!(self, Formula::Ff)
    }

    /// The flattened conjunct view: `Tt` contributes nothing, `And` spreads.
    pub fn conjuncts(&self) -> Vec<&Formula> {
        match self {
            Formula::Tt => vec![],
            Formula::And(fs) => fs.iter().flat_map(|f| f.conjuncts()).collect(),
            f => vec![f],
        }
    }

    pub fn free_vars(&self) -> VarSet {
        match self {
            Formula::Tt | Formula::Ff => VarSet::new(),
            Formula::Eq(l, r) | Formula::Dq(l, r) | Formula::Lt(l, r) | Formula::Le(l, r) => {
                l.free_vars().union(&r.free_vars())
            }
            Formula::And(fs) | Formula::Or(fs) => {
                let mut vs = VarSet::new();
                for f in fs {
                    vs.extend(f.free_vars());
                }
                vs
            }
        }
    }

    /// Apply a term substitution, re-normalizing through the smart
    /// constructors so ground literals evaluate away.
    #[must_use]
    pub fn subst(&self, sub: &Subst) -> Formula {
        match self {
            Formula::Tt => Formula::Tt,
            Formula::Ff => Formula::Ff,
            Formula::Eq(l, r) => Formula::eq(l.subst(sub), r.subst(sub)),
            Formula::Dq(l, r) => Formula::dq(l.subst(sub), r.subst(sub)),
            Formula::Lt(l, r) => Formula::lt(l.subst(sub), r.subst(sub)),
            Formula::Le(l, r) => Formula::le(l.subst(sub), r.subst(sub)),
            Formula::And(fs) => Formula::and_all(fs.iter().map(|f| f.subst(sub)).collect()),
            Formula::Or(fs) => Formula::or_all(fs.iter().map(|f| f.subst(sub)).collect()),
        }
    }

    #[must_use]
    pub fn rename(&self, r: &Renaming) -> Formula {
        match self {
            Formula::Tt => Formula::Tt,
            Formula::Ff => Formula::Ff,
            Formula::Eq(l, rt) => Formula::eq(l.rename(r), rt.rename(r)),
            Formula::Dq(l, rt) => Formula::dq(l.rename(r), rt.rename(r)),
            Formula::Lt(l, rt) => Formula::lt(l.rename(r), rt.rename(r)),
            Formula::Le(l, rt) => Formula::le(l.rename(r), rt.rename(r)),
            Formula::And(fs) => Formula::and_all(fs.iter().map(|f| f.rename(r)).collect()),
            Formula::Or(fs) => Formula::or_all(fs.iter().map(|f| f.rename(r)).collect()),
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Formula::Tt => write!(f, "true"),
            Formula::Ff => write!(f, "false"),
            Formula::Eq(l, r) => write!(f, "{} = {}", l, r),
            Formula::Dq(l, r) => write!(f, "{} != {}", l, r),
            Formula::Lt(l, r) => write!(f, "{} < {}", l, r),
            Formula::Le(l, r) => write!(f, "{} <= {}", l, r),
            Formula::And(fs) => {
                write!(f, "({})", fs.iter().map(|g| g.to_string()).join(" /\\ "))
            }
            Formula::Or(fs) => {
                write!(f, "({})", fs.iter().map(|g| g.to_string()).join(" \\/ "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::var::Var;

    fn v(name: &str) -> Term {
        Term::var(Var::new(name))
    }

    #[test]
    fn ground_literals_evaluate() {
        assert!(Formula::eq(Term::int(1), Term::int(1)).is_tt());
        assert!(Formula::eq(Term::int(1), Term::int(2)).is_ff());
        assert!(Formula::dq(v("x"), v("x")).is_ff());
        assert!(Formula::lt(Term::int(1), Term::int(2)).is_tt());
        assert!(Formula::le(v("x"), v("x")).is_tt());
    }

    #[test]
    fn and_flattens_and_absorbs() {
        let a = Formula::eq(v("x"), Term::int(1));
        let b = Formula::eq(v("y"), Term::int(2));
        let c = Formula::eq(v("z"), Term::int(3));
        let both = Formula::and(Formula::and(a.clone(), b.clone()), c.clone());
        assert_eq!(both.conjuncts().len(), 3);
        assert_eq!(Formula::and(Formula::Tt, a.clone()), a);
        assert!(Formula::and(a.clone(), Formula::Ff).is_ff());
        assert_eq!(Formula::and(a.clone(), a.clone()), a);
    }

    #[test]
    fn or_keeps_duals() {
        let a = Formula::eq(v("x"), Term::int(1));
        assert_eq!(Formula::or(Formula::Ff, a.clone()), a);
        assert!(Formula::or(a.clone(), Formula::Tt).is_tt());
        assert_eq!(Formula::or_all(vec![]), Formula::Ff);
    }

    #[test]
    fn subst_reevaluates() {
        let f = Formula::eq(v("x"), Term::int(1));
        let sub = Subst::single(Var::new("x"), Term::int(1));
        assert!(f.subst(&sub).is_tt());
        let sub2 = Subst::single(Var::new("x"), Term::int(2));
        assert!(f.subst(&sub2).is_ff());
    }

    #[test]
    fn eq_orders_its_sides() {
        assert_eq!(Formula::eq(v("x"), v("p")), Formula::eq(v("p"), v("x")));
    }
}
