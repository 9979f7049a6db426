// © 2019, ETH Zurich
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Vocabulary and quantifier management. All renaming funnels through
//! `Renaming::fresh` and `freshen_xs_wrt`, so capture avoidance is enforced
//! in one place rather than per call site.

use crate::starjunction::{Disjunction, Starjunction};
use log::trace;
use symex_terms::{Renaming, Subst, VarSet};

impl Starjunction {
    /// Move `vs` from the visible vocabulary into existential binding.
    /// Quantifying a variable that is not in the vocabulary is a caller
    /// error.
    #[must_use]
    pub fn exists(self, vs: &VarSet) -> Starjunction {
        if vs.is_empty() {
            return self;
        }
        assert!(
            vs.is_subset(&self.us),
            "exists: {} is not within the vocabulary {}",
            vs,
            self.us
        );
        let Starjunction {
            us,
            xs,
            ctx,
            pure,
            heap,
            djns,
        } = self;
        Starjunction::mk(us.difference(vs), xs.union(vs), ctx, pure, heap, djns)
    }

    /// Freshen this clause's existentials apart from `wrt` and promote them
    /// into the vocabulary, returning the (possibly renamed) existentials
    /// and the opened formula.
    #[must_use]
    pub fn bind_exists(self, wrt: &VarSet) -> (VarSet, Starjunction) {
        if self.xs.is_empty() {
            return (VarSet::new(), self);
        }
        let clash = self.xs.intersection(wrt);
        let q = if clash.is_empty() {
            self
        } else {
            let avoid = self.all_vars().union(wrt);
            let r = Renaming::fresh(&clash, &avoid);
            self.apply_renaming(&r)
        };
        let Starjunction {
            us,
            xs,
            ctx,
            pure,
            heap,
            djns,
        } = q;
        let opened = Starjunction::mk(us.union(&xs), VarSet::new(), ctx, pure, heap, djns);
        (xs, opened)
    }

    /// Produce a copy whose free variables are fresh with respect to `wrt`,
    /// with the vocabulary extended by `wrt`. Returns the renaming that was
    /// applied so callers can rename related state to match.
    #[must_use]
    pub fn freshen(self, wrt: &VarSet) -> (Starjunction, Renaming) {
        let clash = self.us.intersection(wrt);
        let (q, r) = if clash.is_empty() {
            (self, Renaming::new())
        } else {
            let avoid = self.all_vars().union(wrt);
            let r = Renaming::fresh(&clash, &avoid);
            (self.apply_renaming(&r), r)
        };
        (q.extend_us(wrt), r)
    }

    /// Apply a variable-to-variable renaming to the free vocabulary,
    /// removing the domain and adding the range. Existentials are freshened
    /// first so the renaming can neither touch nor capture them.
    #[must_use]
    pub fn rename(self, r: &Renaming) -> Starjunction {
        if r.is_empty() {
            return self;
        }
        trace!("[enter] rename {}", r);
        let avoid = r.domain().union(&r.range());
        let q = self.freshen_xs_wrt(&avoid);
        q.apply_renaming(r)
    }

    /// Apply a general variable-to-term substitution, removing the domain
    /// from the vocabulary and adding the range's free variables.
    #[must_use]
    pub fn subst(self, sub: &Subst) -> Starjunction {
        if sub.is_empty() {
            return self;
        }
        if let Some(r) = sub.as_renaming() {
            return self.rename(&r);
        }
        trace!("[enter] subst {}", sub);
        let avoid = sub.domain().union(&sub.range_fv());
        let q = self.freshen_xs_wrt(&avoid);
        let us = q.us().difference(&sub.domain()).union(&sub.range_fv());
        q.rewrite(sub, us, true)
    }

    /// Widen the vocabulary to include `vs`, renaming any existentials that
    /// would otherwise collide.
    #[must_use]
    pub fn extend_us(self, vs: &VarSet) -> Starjunction {
        if vs.is_subset(&self.us) {
            return self;
        }
        let q = self.freshen_xs_wrt(vs);
        let Starjunction {
            us,
            xs,
            ctx,
            pure,
            heap,
            djns,
        } = q;
        Starjunction::mk(us.union(vs), xs, ctx, pure, heap, djns)
    }

    /// Rename every existential, at any depth, that collides with `avoid`.
    /// The shared freshening primitive behind `star`, `or`, `extend_us`,
    /// `rename`, and `subst`.
    pub(crate) fn freshen_xs_wrt(self, avoid: &VarSet) -> Starjunction {
        if self.bound_vars().is_disjoint(avoid) {
            return self;
        }
        let clash = self.xs.intersection(avoid);
        let q = if clash.is_empty() {
            self
        } else {
            let wrt = self.all_vars().union(avoid);
            let r = Renaming::fresh(&clash, &wrt);
            self.apply_renaming(&r)
        };
        let Starjunction {
            us,
            xs,
            ctx,
            pure,
            heap,
            djns,
        } = q;
        // fresh names chosen below must miss the enclosing vocabulary too
        let inner_avoid = avoid.union(&us).union(&xs);
        let djns = djns
            .into_iter()
            .map(|d| {
                Disjunction(
                    d.0.into_iter()
                        .map(|c| c.freshen_xs_wrt(&inner_avoid))
                        .collect(),
                )
            })
            .collect();
        Starjunction::mk(us, xs, ctx, pure, heap, djns)
    }

    /// Apply a renaming to every occurrence in the clause, bound or free.
    /// Callers are responsible for choosing a capture-free renaming.
    pub(crate) fn apply_renaming(self, r: &Renaming) -> Starjunction {
        if r.is_empty() {
            return self;
        }
        let Starjunction {
            us,
            xs,
            ctx,
            pure,
            heap,
            djns,
        } = self;
        Starjunction::mk(
            r.apply_set(&us),
            r.apply_set(&xs),
            ctx.rename(r),
            pure.rename(r),
            heap.into_iter().map(|s| s.rename(r)).collect(),
            djns.into_iter()
                .map(|d| Disjunction(d.0.into_iter().map(|c| c.apply_renaming(r)).collect()))
                .collect(),
        )
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

    fn vs(names: &[&str]) -> VarSet {
        names.iter().map(|n| Var::new(*n)).collect()
    }

    fn points_to(loc: &str, seq: &str) -> Starjunction {
        Starjunction::seg(Segment::new(
            v(loc),
            v(loc),
            Term::int(8),
            Term::int(8),
            v(seq),
        ))
    }

    #[test]
    fn exists_hides_variables() {
        let q = points_to("p", "x").exists(&vs(&["x"]));
        assert_eq!(q.us(), &vs(&["p"]));
        assert_eq!(q.xs(), &vs(&["x"]));
        assert!(q.free_vars().is_disjoint(&vs(&["x"])));
    }

    #[test]
    #[should_panic(expected = "exists")]
    fn exists_rejects_unknown_variables() {
        let _ = points_to("p", "x").exists(&vs(&["zz"]));
    }

    #[test]
    fn bind_exists_promotes_fresh_names() {
        let q = points_to("p", "x").exists(&vs(&["x"]));
        let (opened, q) = q.bind_exists(&vs(&["x"]));
        assert!(q.xs().is_empty());
        assert!(opened.is_disjoint(&vs(&["x"])));
        assert!(opened.is_subset(q.us()));
        assert_eq!(opened.len(), 1);
    }

    #[test]
    fn extend_us_renames_colliding_existentials() {
        let q = points_to("p", "x").exists(&vs(&["x"]));
        let q = q.extend_us(&vs(&["x"]));
        assert!(q.us().contains(&Var::new("x")));
        assert!(q.xs().is_disjoint(&vs(&["x"])));
        // the incoming x is a new, unconstrained variable
        assert!(!q.free_vars().contains(&Var::new("x")));
    }

    #[test]
    fn freshen_moves_free_variables_off_wrt() {
        let q = points_to("p", "x");
        let wrt = vs(&["p", "z"]);
        let (q2, r) = q.clone().freshen(&wrt);
        assert!(q2.free_vars().is_disjoint(&wrt));
        assert!(wrt.is_subset(q2.us()));
        // undoing the renaming recovers the original constraints
        let back = q2.rename(&r.invert());
        assert_eq!(back.heap(), q.heap());
        assert!(q.us().is_subset(back.us()));
    }

    #[test]
    fn rename_replaces_the_vocabulary() {
        let q = points_to("p", "x");
        let mut r = Renaming::new();
        r.insert(Var::new("p"), Var::new("q"));
        let q = q.rename(&r);
        assert!(q.us().contains(&Var::new("q")));
        assert!(!q.us().contains(&Var::new("p")));
        assert_eq!(q.heap()[0].loc, v("q"));
    }

    #[test]
    fn subst_rewrites_terms_and_vocabulary() {
        let q = points_to("p", "x");
        let sub = Subst::single(Var::new("p"), Term::add(v("b"), Term::int(8)));
        let q = q.subst(&sub);
        assert!(!q.us().contains(&Var::new("p")));
        assert!(q.us().contains(&Var::new("b")));
        assert_eq!(q.heap()[0].loc, Term::add(v("b"), Term::int(8)));
    }

    #[test]
    fn subst_avoids_capturing_existentials() {
        // q = exists x . p |-> x; substituting p := x + 8 must not let the
        // free x of the range collide with the bound x
        let q = points_to("p", "x").exists(&vs(&["x"]));
        let sub = Subst::single(Var::new("p"), Term::add(v("x"), Term::int(8)));
        let q = q.subst(&sub);
        assert!(q.us().contains(&Var::new("x")));
        assert!(q.xs().is_disjoint(&vs(&["x"])));
        assert_eq!(q.heap()[0].loc, Term::add(v("x"), Term::int(8)));
        // the bound byte content is now a renamed existential, not x
        assert!(q.heap()[0].seq != v("x"));
    }
}
