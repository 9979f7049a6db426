// © 2019, ETH Zurich
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Substitution-driven rewriting that keeps the context, pure part, and
//! segment terms mutually consistent.

use crate::starjunction::{Disjunction, Starjunction};
use log::trace;
use symex_terms::{Formula, Subst, VarSet};

impl Starjunction {
    /// Rewrite every subterm through a normalizing substitution, typically
    /// the context's solved form after it has learned new equalities. The
    /// domain stays in the vocabulary; clauses that become inconsistent
    /// collapse to false.
    #[must_use]
    pub fn norm(self, sub: &Subst) -> Starjunction {
        if sub.is_empty() {
            return self;
        }
        trace!("[enter] norm {} {}", sub, self);
        let avoid = sub.domain().union(&sub.range_fv());
        let q = self.freshen_xs_wrt(&avoid);
        let us = q.us().union(&sub.range_fv());
        let result = q.rewrite(sub, us, false);
        trace!("[exit] norm {}", result);
        result
    }

    /// Replace the pure part wholesale. The context is deliberately not
    /// re-derived: callers that strengthen the constraint and need a synced
    /// context must re-derive it themselves. The replacement must range over
    /// the clause's vocabulary.
    #[must_use]
    pub fn with_pure(self, pure: Formula) -> Starjunction {
        let Starjunction {
            us,
            xs,
            ctx,
            pure: _,
            heap,
            djns,
        } = self;
        Starjunction::mk(us, xs, ctx, pure, heap, djns)
    }

    /// The rewriting worker shared by `norm` and `subst`. `drop_domain`
    /// distinguishes vocabulary-shifting substitution (context keys are
    /// rewritten too) from in-vocabulary normalization (bound variables stay
    /// bound, so the context keeps its own equations).
    pub(crate) fn rewrite(self, sub: &Subst, us: VarSet, drop_domain: bool) -> Starjunction {
        let Starjunction {
            us: _,
            xs,
            ctx,
            pure,
            heap,
            djns,
        } = self;
        let ctx = if drop_domain {
            ctx.subst(sub)
        } else {
            ctx.norm(sub)
        };
        let pure = pure.subst(sub);
        let heap: Vec<_> = heap.into_iter().map(|s| s.subst(sub)).collect();
        let djns: Vec<_> = djns
            .into_iter()
            .map(|d| {
                Disjunction(
                    d.0.into_iter()
                        .map(|c| {
                            let cus = if drop_domain {
                                c.us().difference(&sub.domain()).union(&sub.range_fv())
                            } else {
                                c.us().union(&sub.range_fv())
                            };
                            c.rewrite(sub, cus, drop_domain)
                        })
                        .collect(),
                )
            })
            .collect();
        if ctx.is_unsat() || pure.is_ff() {
            return Starjunction::false_(us);
        }
        Starjunction::mk(us, xs, ctx, pure, heap, djns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Segment;
    use symex_terms::{Term, Var};

    fn v(name: &str) -> Term {
        Term::var(Var::new(name))
    }

    #[test]
    fn norm_canonicalizes_without_forgetting() {
        // q = p = x /\ x |-> d
        let s = Segment::new(v("x"), v("x"), Term::int(8), Term::int(8), v("d"));
        let q = Starjunction::seg(s).and(Formula::eq(v("p"), v("x")));
        let sub = q.ctx().to_subst();
        let q = q.norm(&sub);
        // the equation survives in the context even though the pure part
        // rewrote to a tautology
        assert!(q.ctx().implies_eq(&v("p"), &v("x")));
        assert!(!q.is_false());
        assert!(q.us().contains(&Var::new("p")));
    }

    #[test]
    fn norm_rewrites_heap_terms() {
        let s = Segment::new(v("a"), v("a"), Term::int(8), Term::int(8), v("d"));
        let q = Starjunction::seg(s);
        let sub = Subst::single(Var::new("a"), v("b"));
        // a pure renaming routed through norm still lands on the heap
        let q = q.norm(&sub);
        assert_eq!(q.heap()[0].loc, v("b"));
        assert!(q.us().contains(&Var::new("a")));
        assert!(q.us().contains(&Var::new("b")));
    }

    #[test]
    fn norm_collapses_inconsistent_clauses() {
        let q = Starjunction::pure(Formula::dq(v("a"), Term::int(0)));
        let sub = Subst::single(Var::new("a"), Term::int(0));
        let q = q.norm(&sub);
        assert!(q.is_false());
    }

    #[test]
    fn with_pure_does_not_rederive_context() {
        let q = Starjunction::pure(Formula::eq(v("a"), Term::int(1)));
        let ctx_before = q.ctx().clone();
        let q = q.with_pure(Formula::eq(v("a"), Term::int(1)));
        assert_eq!(q.ctx(), &ctx_before);
    }
}
