// © 2019, ETH Zurich
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A solved-form equality store: each bound variable maps to its canonical
//! term, plus a set of disequalities. Sound for inconsistency detection and
//! incomplete by design: constraints that do not fit the solved form are
//! dropped, which only ever weakens the context.

use crate::{
    pure::Formula,
    subst::{Renaming, Subst},
    term::Term,
    var::{Var, VarSet},
};
use itertools::Itertools;
use log::debug;
use std::{fmt, mem};

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Context {
    rep: std::collections::BTreeMap<Var, Term>,
    diseqs: std::collections::BTreeSet<(Term, Term)>,
    unsat: bool,
}

fn ordered(a: Term, b: Term) -> (Term, Term) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl Context {
    pub fn empty() -> Context {
        Context::default()
    }

    /// A context carrying no knowledge at all.
    pub fn is_empty(&self) -> bool {
        self.rep.is_empty() && self.diseqs.is_empty() && !self.unsat
    }

    pub fn is_unsat(&self) -> bool {
        self.unsat
    }

    /// The canonical representative of `t`: rewrite every variable through
    /// the solved form and re-simplify. The solved form is idempotent, so a
    /// single pass suffices.
    pub fn canon(&self, t: &Term) -> Term {
        match t {
            Term::Var(v) => match self.rep.get(v) {
                Some(u) => u.clone(),
                None => t.clone(),
            },
            Term::Integer(_) => t.clone(),
            Term::BinOp(kind, l, r) => Term::binop(*kind, self.canon(l), self.canon(r)),
        }
    }

    pub fn implies_eq(&self, a: &Term, b: &Term) -> bool {
        self.unsat || self.canon(a) == self.canon(b)
    }

    pub fn conjoin_eq(&mut self, a: &Term, b: &Term) {
        if self.unsat {
            return;
        }
        let a = self.canon(a);
        let b = self.canon(b);
        if a == b {
            return;
        }
        match (&a, &b) {
            (Term::Integer(_), Term::Integer(_)) => {
                debug!("context: contradiction {} = {}", a, b);
                self.unsat = true;
            }
            (Term::Var(v), _) if !b.free_vars().contains(v) => self.bind(v.clone(), b.clone()),
            (_, Term::Var(v)) if !a.free_vars().contains(v) => self.bind(v.clone(), a.clone()),
            // not representable in solved form; drop it
            _ => {}
        }
    }

    pub fn conjoin_dq(&mut self, a: &Term, b: &Term) {
        if self.unsat {
            return;
        }
        let a = self.canon(a);
        let b = self.canon(b);
        if a == b {
            debug!("context: contradiction {} != {}", a, b);
            self.unsat = true;
        } else if let (Term::Integer(_), Term::Integer(_)) = (&a, &b) {
            // already entailed
        } else {
            self.diseqs.insert(ordered(a, b));
        }
    }

    /// Incorporate the conjuncts of a pure formula. Disjunctive or otherwise
    /// unrepresentable conjuncts are skipped.
    pub fn conjoin_formula(&mut self, f: &Formula) {
        for lit in f.conjuncts() {
            if self.unsat {
                return;
            }
            match lit {
                Formula::Ff => self.unsat = true,
                Formula::Eq(a, b) => self.conjoin_eq(a, b),
                Formula::Dq(a, b) => self.conjoin_dq(a, b),
                Formula::Lt(a, b) => {
                    let a = self.canon(a);
                    let b = self.canon(b);
                    if a == b {
                        self.unsat = true;
                    } else if let (Term::Integer(x), Term::Integer(y)) = (&a, &b) {
                        if x >= y {
                            self.unsat = true;
                        }
                    }
                }
                Formula::Le(a, b) => {
                    if let (Term::Integer(x), Term::Integer(y)) = (&self.canon(a), &self.canon(b)) {
                        if x > y {
                            self.unsat = true;
                        }
                    }
                }
                Formula::Tt | Formula::And(_) | Formula::Or(_) => {}
            }
        }
    }

    pub fn of_formula(f: &Formula) -> Context {
        let mut ctx = Context::default();
        ctx.conjoin_formula(f);
        ctx
    }

    /// Conjoin two contexts.
    #[must_use]
    pub fn union(&self, other: &Context) -> Context {
        if self.is_empty() {
            return other.clone();
        }
        let mut out = self.clone();
        if other.unsat {
            out.unsat = true;
            return out;
        }
        for (v, t) in &other.rep {
            out.conjoin_eq(&Term::Var(v.clone()), t);
        }
        for (a, b) in &other.diseqs {
            out.conjoin_dq(a, b);
        }
        out
    }

    pub fn free_vars(&self) -> VarSet {
        let mut vs = VarSet::new();
        for (v, t) in &self.rep {
            vs.insert(v.clone());
            vs.extend(t.free_vars());
        }
        for (a, b) in &self.diseqs {
            vs.extend(a.free_vars());
            vs.extend(b.free_vars());
        }
        vs
    }

    /// Apply an injective renaming. Injectivity preserves the solved form,
    /// so the store maps over directly.
    #[must_use]
    pub fn rename(&self, r: &Renaming) -> Context {
        if r.is_empty() {
            return self.clone();
        }
        Context {
            rep: self
                .rep
                .iter()
                .map(|(v, t)| (r.apply(v), t.rename(r)))
                .collect(),
            diseqs: self
                .diseqs
                .iter()
                .map(|(a, b)| ordered(a.rename(r), b.rename(r)))
                .collect(),
            unsat: self.unsat,
        }
    }

    /// Rewrite the whole store through a general substitution. Bound
    /// variables are substituted too, so equations may leave the solved form
    /// and be dropped; the pure part of the owning formula retains them.
    #[must_use]
    pub fn subst(&self, sub: &Subst) -> Context {
        if sub.is_empty() {
            return self.clone();
        }
        let mut out = Context {
            unsat: self.unsat,
            ..Context::default()
        };
        for (v, t) in &self.rep {
            let lhs = match sub.get(v) {
                Some(u) => u.clone(),
                None => Term::Var(v.clone()),
            };
            out.conjoin_eq(&lhs, &t.subst(sub));
        }
        for (a, b) in &self.diseqs {
            out.conjoin_dq(&a.subst(sub), &b.subst(sub));
        }
        out
    }

    /// Rewrite only the right-hand sides and disequalities, keeping bound
    /// variables bound. This is the shape `norm` needs: applying the
    /// context's own solved form must not erase its equations.
    #[must_use]
    pub fn norm(&self, sub: &Subst) -> Context {
        if sub.is_empty() {
            return self.clone();
        }
        let mut out = Context {
            unsat: self.unsat,
            ..Context::default()
        };
        for (v, t) in &self.rep {
            let rhs = t.subst(sub);
            if Term::Var(v.clone()) == rhs {
                continue;
            }
            out.conjoin_eq(&Term::Var(v.clone()), &rhs);
        }
        for (a, b) in &self.diseqs {
            out.conjoin_dq(&a.subst(sub), &b.subst(sub));
        }
        out
    }

    /// The solved form as a substitution, mapping each bound variable to its
    /// canonical representative.
    pub fn to_subst(&self) -> Subst {
        let mut sub = Subst::new();
        for (v, t) in &self.rep {
            sub.insert(v.clone(), t.clone());
        }
        sub
    }

    pub fn to_formula(&self) -> Formula {
        if self.unsat {
            return Formula::Ff;
        }
        let mut fs: Vec<Formula> = self
            .rep
            .iter()
            .map(|(v, t)| Formula::eq(Term::Var(v.clone()), t.clone()))
            .collect();
        fs.extend(
            self.diseqs
                .iter()
                .map(|(a, b)| Formula::dq(a.clone(), b.clone())),
        );
        Formula::and_all(fs)
    }

    fn bind(&mut self, v: Var, t: Term) {
        let single = Subst::single(v.clone(), t.clone());
        // keep the solved form idempotent
        self.rep = self
            .rep
            .iter()
            .map(|(u, s)| (u.clone(), s.subst(&single)))
            .collect();
        self.rep.insert(v, t);
        for (a, b) in mem::take(&mut self.diseqs) {
            self.conjoin_dq(&a, &b);
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.unsat {
            return write!(f, "false");
        }
        if self.is_empty() {
            return write!(f, "true");
        }
        let eqs = self
            .rep
            .iter()
            .map(|(v, t)| format!("{} = {}", v, t))
            .chain(self.diseqs.iter().map(|(a, b)| format!("{} != {}", a, b)))
            .join(" /\\ ");
        write!(f, "{}", eqs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(name: &str) -> Term {
        Term::Var(Var::new(name))
    }

    #[test]
    fn eq_then_canon() {
        let mut ctx = Context::empty();
        ctx.conjoin_eq(&v("x"), &Term::int(5));
        assert_eq!(ctx.canon(&Term::add(v("x"), Term::int(3))), Term::int(8));
        assert!(ctx.implies_eq(&v("x"), &Term::int(5)));
        assert!(!ctx.is_unsat());
    }

    #[test]
    fn contradictory_equations() {
        let mut ctx = Context::empty();
        ctx.conjoin_eq(&v("x"), &Term::int(1));
        ctx.conjoin_eq(&v("x"), &Term::int(2));
        assert!(ctx.is_unsat());
    }

    #[test]
    fn diseq_checked_against_later_equations() {
        let mut ctx = Context::empty();
        ctx.conjoin_dq(&v("x"), &v("y"));
        assert!(!ctx.is_unsat());
        ctx.conjoin_eq(&v("x"), &v("y"));
        assert!(ctx.is_unsat());
    }

    #[test]
    fn union_merges_knowledge() {
        let mut a = Context::empty();
        a.conjoin_eq(&v("x"), &Term::int(1));
        let mut b = Context::empty();
        b.conjoin_eq(&v("y"), &v("x"));
        let ab = a.union(&b);
        assert!(ab.implies_eq(&v("y"), &Term::int(1)));
    }

    #[test]
    fn norm_keeps_its_own_equations() {
        let mut ctx = Context::empty();
        ctx.conjoin_eq(&v("p"), &v("x"));
        let normed = ctx.norm(&ctx.to_subst());
        assert!(normed.implies_eq(&v("p"), &v("x")));
    }

    #[test]
    fn ground_order_constraints() {
        let mut ctx = Context::empty();
        ctx.conjoin_eq(&v("x"), &Term::int(3));
        ctx.conjoin_formula(&Formula::Lt(v("x"), Term::int(2)));
        assert!(ctx.is_unsat());
    }
}
