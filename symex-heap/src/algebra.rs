// © 2019, ETH Zurich
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Smart constructors. These are the only way to build formulas, and each
//! one extends vocabularies and freshens existentials so that callers never
//! have to rename anything themselves.

use crate::{
    segment::Segment,
    starjunction::{Disjunction, Starjunction},
};
use log::trace;
use rustc_hash::FxHashSet;
use symex_terms::{Context, Formula, Subst, Term, VarSet};

impl Starjunction {
    /// The empty-heap, trivially-true formula over an empty vocabulary.
    pub fn emp() -> Starjunction {
        Starjunction::mk(
            VarSet::new(),
            VarSet::new(),
            Context::empty(),
            Formula::tt(),
            Vec::new(),
            Vec::new(),
        )
    }

    /// An unsatisfiable formula whose vocabulary is exactly `us`,
    /// represented as a star-conjoined empty disjunction. Infeasible paths
    /// keep the variables the caller expects to remain visible.
    pub fn false_(us: VarSet) -> Starjunction {
        Starjunction::mk(
            us,
            VarSet::new(),
            Context::empty(),
            Formula::tt(),
            Vec::new(),
            vec![Disjunction(Vec::new())],
        )
    }

    /// Lift a segment to a formula whose vocabulary is the segment's free
    /// variables.
    pub fn seg(seg: Segment) -> Starjunction {
        let us = seg.free_vars();
        Starjunction::mk(
            us,
            VarSet::new(),
            Context::empty(),
            Formula::tt(),
            vec![seg],
            Vec::new(),
        )
    }

    /// Lift a pure constraint to a minimal formula. The induced context is
    /// derived up front, so contradictions collapse immediately.
    pub fn pure(f: Formula) -> Starjunction {
        let us = f.free_vars();
        if f.is_ff() {
            return Starjunction::false_(us);
        }
        let ctx = Context::of_formula(&f);
        if ctx.is_unsat() {
            return Starjunction::false_(us);
        }
        Starjunction::mk(us, VarSet::new(), ctx, f, Vec::new(), Vec::new())
    }

    /// Star-conjoin two formulas. The result vocabulary is the union of both
    /// inputs'; colliding existentials are freshened apart before merging,
    /// contexts are conjoined, heaps and disjunction lists concatenate.
    #[must_use]
    pub fn star(self, other: Starjunction) -> Starjunction {
        trace!("[enter] star {} * {}", self, other);
        if self.is_false() || other.is_false() {
            return Starjunction::false_(self.us.union(&other.us));
        }
        if other.is_emp() {
            return self.extend_us(&other.us);
        }
        if self.is_emp() {
            return other.extend_us(&self.us);
        }
        let q1 = self.freshen_xs_wrt(&other.all_vars());
        let q2 = other.freshen_xs_wrt(&q1.all_vars());
        let Starjunction {
            us: us1,
            xs: xs1,
            ctx: ctx1,
            pure: pure1,
            heap: heap1,
            djns: djns1,
        } = q1;
        let Starjunction {
            us: us2,
            xs: xs2,
            ctx: ctx2,
            pure: pure2,
            heap: heap2,
            djns: djns2,
        } = q2;
        let us = us1.union(&us2);
        let ctx = ctx1.union(&ctx2);
        if ctx.is_unsat() {
            trace!("[exit] star: inconsistent contexts");
            return Starjunction::false_(us);
        }
        let pure = Formula::and(pure1, pure2);
        if pure.is_ff() {
            return Starjunction::false_(us);
        }
        let mut heap = heap1;
        let mut tags: FxHashSet<u64> = heap.iter().map(|s| s.tag()).collect();
        for s in heap2 {
            if tags.insert(s.tag()) {
                heap.push(s);
            } else {
                // starring a formula with a clone of itself duplicates
                // identities; the right-hand copies get fresh ones
                heap.push(s.retag());
            }
        }
        let mut djns = djns1;
        djns.extend(djns2);
        let result = Starjunction::mk(us, xs1.union(&xs2), ctx, pure, heap, djns);
        trace!("[exit] star {}", result);
        result
    }

    /// Disjoin two formulas over their shared vocabulary. Recognized-false
    /// operands are absorbed, and an operand that is itself a bare
    /// disjunction contributes its clauses directly.
    #[must_use]
    pub fn or(self, other: Starjunction) -> Starjunction {
        trace!("[enter] or {} \\/ {}", self, other);
        if self.is_false() {
            return other.extend_us(&self.us);
        }
        if other.is_false() {
            return self.extend_us(&other.us);
        }
        let us = self.us.union(&other.us);
        let mut clauses = Vec::new();
        for side in [self, other] {
            match side.into_bare_djn() {
                Ok(cs) => clauses.extend(cs),
                Err(side) => clauses.push(*side),
            }
        }
        let clauses = clauses
            .into_iter()
            .map(|c| c.freshen_xs_wrt(&us))
            .collect();
        let result = Starjunction::mk(
            us,
            VarSet::new(),
            Context::empty(),
            Formula::tt(),
            Vec::new(),
            vec![Disjunction(clauses)],
        );
        trace!("[exit] or {}", result);
        result
    }

    /// Conjoin a pure constraint, strengthening the context.
    #[must_use]
    pub fn and(self, f: Formula) -> Starjunction {
        if f.is_tt() {
            return self;
        }
        let q = self.extend_us(&f.free_vars());
        let Starjunction {
            us,
            xs,
            ctx,
            pure,
            heap,
            djns,
        } = q;
        if f.is_ff() {
            return Starjunction::false_(us);
        }
        let mut ctx = ctx;
        ctx.conjoin_formula(&f);
        if ctx.is_unsat() {
            return Starjunction::false_(us);
        }
        let pure = Formula::and(pure, f);
        if pure.is_ff() {
            return Starjunction::false_(us);
        }
        Starjunction::mk(us, xs, ctx, pure, heap, djns)
    }

    /// Conjoin a decision-procedure context, extending the vocabulary to
    /// cover its variables.
    #[must_use]
    pub fn and_ctx(self, ctx: &Context) -> Starjunction {
        if ctx.is_empty() {
            return self;
        }
        let q = self.extend_us(&ctx.free_vars());
        let Starjunction {
            us,
            xs,
            ctx: own,
            pure,
            heap,
            djns,
        } = q;
        let merged = own.union(ctx);
        if merged.is_unsat() {
            return Starjunction::false_(us);
        }
        Starjunction::mk(us, xs, merged, pure, heap, djns)
    }

    /// Conjoin the equational content of a substitution.
    #[must_use]
    pub fn and_subst(self, sub: &Subst) -> Starjunction {
        trace!("[enter] and_subst {}", sub);
        sub.iter().fold(self, |q, (v, t)| {
            q.and(Formula::eq(Term::var(v.clone()), t.clone()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use symex_terms::Var;

    fn v(name: &str) -> Term {
        Term::var(Var::new(name))
    }

    fn vs(names: &[&str]) -> VarSet {
        names.iter().map(|n| Var::new(*n)).collect()
    }

    #[test]
    fn false_tracks_its_vocabulary() {
        let q = Starjunction::false_(vs(&["a", "b"]));
        assert!(q.is_false());
        assert_eq!(q.us(), &vs(&["a", "b"]));
    }

    #[test]
    fn pure_collapses_contradictions() {
        let f = Formula::and(
            Formula::eq(v("x"), Term::int(1)),
            Formula::eq(v("x"), Term::int(2)),
        );
        let q = Starjunction::pure(f);
        assert!(q.is_false());
        assert_eq!(q.us(), &vs(&["x"]));
    }

    #[test]
    fn star_with_false_is_false() {
        let s = Segment::new(v("p"), v("p"), Term::int(8), Term::int(8), v("x"));
        let q = Starjunction::seg(s).star(Starjunction::false_(vs(&["z"])));
        assert!(q.is_false());
        assert_eq!(q.us(), &vs(&["p", "x", "z"]));
    }

    #[test]
    fn and_detects_context_contradiction() {
        let q = Starjunction::pure(Formula::eq(v("a"), Term::int(1)));
        let q = q.and(Formula::eq(v("a"), Term::int(2)));
        assert!(q.is_false());
    }

    #[test]
    fn and_subst_conjoins_equations() {
        let mut sub = Subst::new();
        sub.insert(Var::new("a"), Term::int(7));
        let q = Starjunction::emp().and_subst(&sub);
        assert!(q.ctx().implies_eq(&v("a"), &Term::int(7)));
        assert!(q.us().contains(&Var::new("a")));
    }

    #[test]
    fn star_retags_duplicate_identities() {
        let s = Segment::new(v("p"), v("p"), Term::int(8), Term::int(8), v("x"));
        let q = Starjunction::seg(s.clone());
        let qq = q.clone().star(q);
        assert_eq!(qq.heap().len(), 2);
        assert!(qq.heap()[0].tag() != qq.heap()[1].tag());
    }
}
