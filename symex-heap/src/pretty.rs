// © 2019, ETH Zurich
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Diagnostic rendering. None of this is load-bearing for the algebra; it
//! exists for logs and debugging only.

use crate::{
    segment::Segment,
    starjunction::{Disjunction, Starjunction},
};
use itertools::Itertools;
use std::fmt;
use symex_terms::{Context, Formula};

impl fmt::Display for Starjunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.xs().is_empty() {
            write!(f, "exists {} . ", self.xs().iter().join(", "))?;
        }
        let mut parts: Vec<String> = Vec::new();
        if !self.ctx().is_empty() {
            parts.push(self.ctx().to_string());
        }
        if !self.pure_part().is_tt() {
            parts.push(self.pure_part().to_string());
        }
        let constraints = parts.join(" /\\ ");
        let spatial = self
            .heap()
            .iter()
            .map(|s| s.to_string())
            .chain(self.djns().iter().map(|d| d.to_string()))
            .join(" * ");
        match (constraints.is_empty(), spatial.is_empty()) {
            (true, true) => write!(f, "emp"),
            (true, false) => write!(f, "{}", spatial),
            (false, true) => write!(f, "{}", constraints),
            (false, false) => write!(f, "{} /\\ {}", constraints, spatial),
        }
    }
}

impl fmt::Display for Disjunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "false");
        }
        write!(
            f,
            "( {} )",
            self.clauses().iter().map(|c| c.to_string()).join(" \\/ ")
        )
    }
}

/// The raw form: every field spelled out, nothing elided.
pub struct RawForm<'a>(&'a Starjunction);

pub fn pp_raw(q: &Starjunction) -> RawForm {
    RawForm(q)
}

impl fmt::Display for RawForm<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let q = self.0;
        write!(
            f,
            "{{ us = {}; xs = {}; ctx = {}; pure = {}; heap = [{}]; djns = [{}] }}",
            q.us(),
            q.xs(),
            q.ctx(),
            q.pure_part(),
            q.heap().iter().map(|s| s.to_string()).join(", "),
            q.djns()
                .iter()
                .map(|d| d.clauses().iter().map(|c| pp_raw(c).to_string()).join(" \\/ "))
                .join("; "),
        )
    }
}

/// A segment with every field canonicalized through a context before
/// display.
pub struct SegNorm<'a> {
    ctx: &'a Context,
    seg: &'a Segment,
}

pub fn pp_seg_norm<'a>(ctx: &'a Context, seg: &'a Segment) -> SegNorm<'a> {
    SegNorm { ctx, seg }
}

impl fmt::Display for SegNorm<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}[{}) in {}[{}) |-> {}",
            self.ctx.canon(&self.seg.loc),
            self.ctx.canon(&self.seg.siz),
            self.ctx.canon(&self.seg.bas),
            self.ctx.canon(&self.seg.len),
            self.ctx.canon(&self.seg.seq),
        )
    }
}

/// The clause with pure conjuncts an ambient context already entails
/// suppressed: what this formula adds over its surroundings.
pub struct DiffForm<'a> {
    ctx: &'a Context,
    q: &'a Starjunction,
}

pub fn pp_diff<'a>(ctx: &'a Context, q: &'a Starjunction) -> DiffForm<'a> {
    DiffForm { ctx, q }
}

impl fmt::Display for DiffForm<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let novel: Vec<&Formula> = self
            .q
            .pure_part()
            .conjuncts()
            .into_iter()
            .filter(|lit| match lit {
                Formula::Eq(a, b) => !self.ctx.implies_eq(a, b),
                _ => true,
            })
            .collect();
        let spatial = self
            .q
            .heap()
            .iter()
            .map(|s| pp_seg_norm(self.ctx, s).to_string())
            .chain(self.q.djns().iter().map(|d| d.to_string()))
            .join(" * ");
        let constraints = novel.iter().map(|g| g.to_string()).join(" /\\ ");
        match (constraints.is_empty(), spatial.is_empty()) {
            (true, true) => write!(f, "emp"),
            (true, false) => write!(f, "{}", spatial),
            (false, true) => write!(f, "{}", constraints),
            (false, false) => write!(f, "{} /\\ {}", constraints, spatial),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use symex_terms::{Term, Var, VarSet};

    fn v(name: &str) -> Term {
        Term::var(Var::new(name))
    }

    #[test]
    fn emp_prints_as_emp() {
        assert_eq!(Starjunction::emp().to_string(), "emp");
    }

    #[test]
    fn false_prints_its_empty_disjunction() {
        let q = Starjunction::false_(VarSet::new());
        assert_eq!(q.to_string(), "false");
    }

    #[test]
    fn quantified_clause_shows_existentials() {
        let s = Segment::new(v("p"), v("p"), Term::int(8), Term::int(8), v("x"));
        let q = Starjunction::seg(s).exists(&VarSet::singleton(Var::new("x")));
        let shown = q.to_string();
        assert!(shown.starts_with("exists x . "));
        assert!(shown.contains("|->"));
    }

    #[test]
    fn seg_norm_canonicalizes_fields() {
        let mut ctx = Context::empty();
        ctx.conjoin_eq(&v("p"), &Term::int(64));
        let s = Segment::new(v("p"), v("p"), Term::int(8), Term::int(8), v("x"));
        let shown = pp_seg_norm(&ctx, &s).to_string();
        assert_eq!(shown, "64[8) in 64[8) |-> x");
    }

    #[test]
    fn diff_form_hides_entailed_equations() {
        let q = Starjunction::pure(Formula::eq(v("a"), Term::int(1)));
        let shown = pp_diff(q.ctx(), &q).to_string();
        assert_eq!(shown, "emp");
    }
}
