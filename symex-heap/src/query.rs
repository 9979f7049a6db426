// © 2019, ETH Zurich
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Satisfiability approximation, emptiness, free variables, and DNF
//! expansion. The DNF traversal is depth-first and left-to-right over the
//! disjunction list, then over each disjunction's clauses, so enumeration
//! order is deterministic; a branch's nested disjunctions are expanded
//! before the parent's remaining ones.

use crate::starjunction::{Disjunction, Starjunction};
use symex_terms::{Formula, VarSet};

impl Starjunction {
    /// Sound, incomplete unsatisfiability check: true only when the pure
    /// part is false, the context is inconsistent, or some star-conjoined
    /// disjunction has no satisfiable branch.
    pub fn is_false(&self) -> bool {
        self.pure.is_ff()
            || self.ctx.is_unsat()
            || self
                .djns
                .iter()
                .any(|d| d.clauses().iter().all(|c| c.is_false()))
    }

    /// True only when every heap in the represented model set is empty. A
    /// recognized-false branch represents no heaps at all and is ignored.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
            && self.djns.iter().all(|d| {
                d.clauses()
                    .iter()
                    .all(|c| c.is_false() || c.is_empty())
            })
    }

    /// A pure over-approximation: unsatisfiable formulas map to an
    /// unsatisfiable constraint, and when the heap is provably empty the
    /// approximation carries the formula's full constraints. Existential
    /// structure is dropped, which only weakens the result.
    pub fn pure_approx(&self) -> Formula {
        let mut conjuncts = vec![self.ctx.to_formula(), self.pure.clone()];
        for d in &self.djns {
            conjuncts.push(Formula::or_all(
                d.clauses().iter().map(|c| c.pure_approx()).collect(),
            ));
        }
        Formula::and_all(conjuncts)
    }

    /// Free variables, always a subset of `us`. A recognized-false formula
    /// keeps its whole vocabulary visible.
    pub fn free_vars(&self) -> VarSet {
        self.fv(false)
    }

    /// Free variables disregarding the attached context.
    pub fn free_vars_ignore_ctx(&self) -> VarSet {
        self.fv(true)
    }

    fn fv(&self, ignore_ctx: bool) -> VarSet {
        if self.is_false() {
            return self.us.clone();
        }
        let mut vs = self.pure.free_vars();
        if !ignore_ctx {
            vs = vs.union(&self.ctx.free_vars());
        }
        for s in &self.heap {
            vs = vs.union(&s.free_vars());
        }
        for d in &self.djns {
            for c in d.clauses() {
                vs = vs.union(&c.fv(ignore_ctx));
            }
        }
        let vs = vs.difference(&self.xs);
        debug_assert!(vs.is_subset(&self.us));
        vs
    }

    /// Generic DNF fold. `conj` star-accumulates each clause body onto the
    /// growing cube (tracking the existentials opened along the path), and
    /// `disj` folds each completed cube into the accumulator.
    pub fn fold_dnf<D, FC, FD>(
        &self,
        conj: &mut FC,
        disj: &mut FD,
        cube: (VarSet, Starjunction),
        acc: D,
    ) -> D
    where
        FC: FnMut(Starjunction, (VarSet, Starjunction)) -> (VarSet, Starjunction),
        FD: FnMut((VarSet, Starjunction), D) -> D,
    {
        self.fold_dnf_pending(&[], conj, disj, cube, acc)
    }

    fn fold_dnf_pending<D, FC, FD>(
        &self,
        pending: &[Disjunction],
        conj: &mut FC,
        disj: &mut FD,
        cube: (VarSet, Starjunction),
        acc: D,
    ) -> D
    where
        FC: FnMut(Starjunction, (VarSet, Starjunction)) -> (VarSet, Starjunction),
        FD: FnMut((VarSet, Starjunction), D) -> D,
    {
        let (path_xs, cube_body) = cube;
        let avoid = path_xs.union(&cube_body.all_vars());
        let (opened, body) = self.clone().bind_exists(&avoid);
        let path_xs = path_xs.union(&opened);
        let Starjunction {
            us,
            xs,
            ctx,
            pure,
            heap,
            djns,
        } = body;
        let flat = Starjunction::mk(us, xs, ctx, pure, heap, Vec::new());
        let cube = conj(flat, (path_xs, cube_body));
        let mut splits = djns;
        splits.extend(pending.iter().cloned());
        Starjunction::fold_splits(&splits, conj, disj, cube, acc)
    }

    fn fold_splits<D, FC, FD>(
        splits: &[Disjunction],
        conj: &mut FC,
        disj: &mut FD,
        cube: (VarSet, Starjunction),
        acc: D,
    ) -> D
    where
        FC: FnMut(Starjunction, (VarSet, Starjunction)) -> (VarSet, Starjunction),
        FD: FnMut((VarSet, Starjunction), D) -> D,
    {
        match splits.split_first() {
            None => disj(cube, acc),
            Some((djn, rest)) => {
                let mut acc = acc;
                for branch in djn.clauses() {
                    acc = branch.fold_dnf_pending(rest, conj, disj, cube.clone(), acc);
                }
                acc
            }
        }
    }

    /// Flatten the nested disjunction tree into a list of clauses with no
    /// further disjunctions, whose OR is semantically equivalent to `self`.
    pub fn dnf(&self) -> Vec<Starjunction> {
        self.fold_dnf(
            &mut |clause, (xs, cube): (VarSet, Starjunction)| (xs, cube.star(clause)),
            &mut |(xs, cube): (VarSet, Starjunction), mut acc: Vec<Starjunction>| {
                let bound = xs.intersection(cube.us());
                acc.push(cube.exists(&bound));
                acc
            },
            (VarSet::new(), Starjunction::emp()),
            Vec::new(),
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

    fn points_to(loc: &str) -> Starjunction {
        Starjunction::seg(Segment::new(
            v(loc),
            v(loc),
            Term::int(8),
            Term::int(8),
            Term::var(Var::new("d")),
        ))
    }

    #[test]
    fn emp_is_empty_and_satisfiable() {
        assert!(Starjunction::emp().is_empty());
        assert!(!Starjunction::emp().is_false());
        assert!(!points_to("p").is_empty());
    }

    #[test]
    fn false_is_recognized() {
        let vs = VarSet::singleton(Var::new("a"));
        let q = Starjunction::false_(vs.clone());
        assert!(q.is_false());
        assert_eq!(q.free_vars(), vs);
        assert!(q.pure_approx().is_ff());
    }

    #[test]
    fn pure_approx_carries_constraints() {
        let q = Starjunction::pure(Formula::eq(v("a"), Term::int(1)));
        let approx = q.pure_approx();
        assert!(!approx.is_ff());
        assert!(approx
            .conjuncts()
            .contains(&&Formula::eq(v("a"), Term::int(1))));
    }

    #[test]
    fn dnf_flattens_nested_disjunctions() {
        let q = points_to("r").star(points_to("a").or(points_to("b").or(points_to("c"))));
        let clauses = q.dnf();
        assert_eq!(clauses.len(), 3);
        for clause in &clauses {
            assert!(clause.djns().is_empty());
            assert_eq!(clause.heap().len(), 2);
        }
        // deterministic left-to-right branch order
        let locs: Vec<_> = clauses
            .iter()
            .map(|c| {
                c.heap()
                    .iter()
                    .map(|s| s.loc.clone())
                    .find(|l| *l != v("r"))
                    .into_iter()
                    .collect::<Vec<_>>()
            })
            .collect();
        assert_eq!(locs, vec![vec![v("a")], vec![v("b")], vec![v("c")]]);
    }

    #[test]
    fn dnf_of_false_has_no_clauses() {
        let q = Starjunction::false_(VarSet::new());
        assert!(q.dnf().is_empty());
    }

    #[test]
    fn dnf_requantifies_opened_existentials() {
        let xs = VarSet::singleton(Var::new("d"));
        let q = points_to("a").exists(&xs).or(points_to("b"));
        let clauses = q.dnf();
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0].xs().len(), 1);
        assert!(clauses[0].free_vars().is_disjoint(&xs));
        assert!(clauses[1].xs().is_empty());
    }

    #[test]
    fn nested_splits_expand_depth_first() {
        let inner = points_to("a").or(points_to("b"));
        let q = inner.star(points_to("c").or(points_to("d")));
        // (a \/ b) * (c \/ d) has four cubes
        assert_eq!(q.dnf().len(), 4);
    }
}
