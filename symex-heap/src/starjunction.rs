// © 2019, ETH Zurich
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The symbolic-heap formula pair: a conjunctive clause (starjunction) and a
//! disjunction of clauses. Fields are private; every reachable value is
//! built by the algebra's smart constructors, which maintain the vocabulary
//! and capture-avoidance invariants.

use crate::segment::Segment;
use rustc_hash::FxHashSet;
use symex_terms::{Context, Formula, VarSet};

/// A conjunctive clause: vocabulary `us`, existentials `xs`, an equality
/// context, a pure constraint, a star-conjoined multiset of segments, and a
/// list of star-conjoined disjunctions.
///
/// Invariants, checked in debug builds on every construction:
/// - `us` and `xs` are disjoint, and every variable free in `ctx`, `pure`,
///   or `heap` is in `us ∪ xs`;
/// - each nested clause's vocabulary is contained in `us ∪ xs`, and its
///   existentials are disjoint from `us ∪ xs`;
/// - segment identities within `heap` are pairwise distinct.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Starjunction {
    pub(crate) us: VarSet,
    pub(crate) xs: VarSet,
    pub(crate) ctx: Context,
    pub(crate) pure: Formula,
    pub(crate) heap: Vec<Segment>,
    pub(crate) djns: Vec<Disjunction>,
}

/// An ordered list of clauses, semantically their logical OR. The empty
/// disjunction is false.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Disjunction(pub(crate) Vec<Starjunction>);

impl Disjunction {
    pub fn clauses(&self) -> &[Starjunction] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Starjunction {
    pub(crate) fn mk(
        us: VarSet,
        xs: VarSet,
        ctx: Context,
        pure: Formula,
        heap: Vec<Segment>,
        djns: Vec<Disjunction>,
    ) -> Starjunction {
        let q = Starjunction {
            us,
            xs,
            ctx,
            pure,
            heap,
            djns,
        };
        debug_assert!(
            q.invariant(),
            "malformed starjunction: {}",
            crate::pretty::pp_raw(&q)
        );
        q
    }

    fn invariant(&self) -> bool {
        if !self.us.is_disjoint(&self.xs) {
            return false;
        }
        let vocab = self.us.union(&self.xs);
        let mut used = self.ctx.free_vars().union(&self.pure.free_vars());
        for s in &self.heap {
            used = used.union(&s.free_vars());
        }
        if !used.is_subset(&vocab) {
            return false;
        }
        let mut tags = FxHashSet::default();
        if !self.heap.iter().all(|s| tags.insert(s.tag())) {
            return false;
        }
        self.djns.iter().all(|d| {
            d.clauses()
                .iter()
                .all(|c| c.us.is_subset(&vocab) && c.xs.is_disjoint(&vocab))
        })
    }

    /// The visible vocabulary of this clause.
    pub fn us(&self) -> &VarSet {
        &self.us
    }

    /// The existentials bound at this clause.
    pub fn xs(&self) -> &VarSet {
        &self.xs
    }

    pub fn ctx(&self) -> &Context {
        &self.ctx
    }

    pub fn pure_part(&self) -> &Formula {
        &self.pure
    }

    pub fn heap(&self) -> &[Segment] {
        &self.heap
    }

    pub fn djns(&self) -> &[Disjunction] {
        &self.djns
    }

    /// Structurally trivial: no content beyond the vocabulary. This is the
    /// unit of `star`, regardless of `us`.
    pub(crate) fn is_emp(&self) -> bool {
        self.xs.is_empty()
            && self.ctx.is_empty()
            && self.pure.is_tt()
            && self.heap.is_empty()
            && self.djns.is_empty()
    }

    /// Every variable occurring anywhere in the clause, bound or free.
    pub(crate) fn all_vars(&self) -> VarSet {
        let mut vs = self.us.union(&self.xs);
        for d in &self.djns {
            for c in d.clauses() {
                vs = vs.union(&c.all_vars());
            }
        }
        vs
    }

    /// A formula that is nothing but a single disjunction yields its
    /// clauses for absorption into a larger disjunction; anything else is
    /// returned unchanged.
    pub(crate) fn into_bare_djn(self) -> Result<Vec<Starjunction>, Box<Starjunction>> {
        if self.xs.is_empty()
            && self.ctx.is_empty()
            && self.pure.is_tt()
            && self.heap.is_empty()
            && self.djns.len() == 1
        {
            let Starjunction { mut djns, .. } = self;
            match djns.pop() {
                Some(Disjunction(cs)) => Ok(cs),
                None => unreachable!(),
            }
        } else {
            Err(Box::new(self))
        }
    }

    /// Every existential bound at this clause or below.
    pub(crate) fn bound_vars(&self) -> VarSet {
        let mut vs = self.xs.clone();
        for d in &self.djns {
            for c in d.clauses() {
                vs = vs.union(&c.bound_vars());
            }
        }
        vs
    }

    /// Remove one segment occurrence, matching by instance identity. The
    /// segment must be the same instance as one in `heap`; removal of a
    /// merely structurally equal segment is a caller error and panics.
    #[must_use]
    pub fn rem_seg(self, seg: &Segment) -> Starjunction {
        let Starjunction {
            us,
            xs,
            ctx,
            pure,
            mut heap,
            djns,
        } = self;
        let before = heap.len();
        heap.retain(|s| !s.same(seg));
        if heap.len() + 1 != before {
            panic!("rem_seg: segment {} is not present (by identity) in the heap", seg);
        }
        Starjunction::mk(us, xs, ctx, pure, heap, djns)
    }

    /// Drop every segment the predicate rejects. No identity requirement.
    #[must_use]
    pub fn filter_heap<F: FnMut(&Segment) -> bool>(self, mut pred: F) -> Starjunction {
        let Starjunction {
            us,
            xs,
            ctx,
            pure,
            mut heap,
            djns,
        } = self;
        heap.retain(|s| pred(s));
        Starjunction::mk(us, xs, ctx, pure, heap, djns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use symex_terms::{Term, Var};

    fn seg_at(name: &str) -> Segment {
        let p = Term::var(Var::new(name));
        Segment::new(
            p.clone(),
            p,
            Term::int(8),
            Term::int(8),
            Term::var(Var::new("v")),
        )
    }

    #[test]
    fn rem_seg_matches_identity() {
        let s1 = seg_at("p");
        let s2 = seg_at("q");
        let q = Starjunction::seg(s1).star(Starjunction::seg(s2));
        let handle = q.heap()[0].clone();
        let rest = q.rem_seg(&handle);
        assert_eq!(rest.heap().len(), 1);
        assert!(!rest.heap()[0].same(&handle));
    }

    #[test]
    #[should_panic(expected = "rem_seg")]
    fn rem_seg_rejects_structural_twins() {
        let s = seg_at("p");
        let twin = seg_at("p");
        assert_eq!(s, twin);
        let q = Starjunction::seg(s);
        let _ = q.rem_seg(&twin);
    }

    #[test]
    fn filter_heap_is_a_plain_filter() {
        let s1 = seg_at("p");
        let s2 = seg_at("q");
        let keep = s2.tag();
        let q = Starjunction::seg(s1).star(Starjunction::seg(s2));
        let rest = q.filter_heap(|s| s.tag() == keep);
        assert_eq!(rest.heap().len(), 1);
        assert_eq!(rest.heap()[0].tag(), keep);
    }

    #[test]
    fn vocabulary_is_not_shrunk_by_removal() {
        let s = seg_at("p");
        let handle = s.clone();
        let q = Starjunction::seg(s);
        let us = q.us().clone();
        let rest = q.rem_seg(&handle);
        assert_eq!(rest.us(), &us);
    }
}
