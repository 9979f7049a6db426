// © 2019, ETH Zurich
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{
    subst::{Renaming, Subst},
    var::{Var, VarSet},
};
use std::fmt;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
}

/// A symbolic term over program values: variables, integer literals, and
/// arithmetic, enough to express address and length computations.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Term {
    Var(Var),
    Integer(i128),
    BinOp(BinOpKind, Box<Term>, Box<Term>),
}

impl Term {
    pub fn var(v: Var) -> Term {
        Term::Var(v)
    }

    pub fn int(value: i128) -> Term {
        Term::Integer(value)
    }

    fn raw(kind: BinOpKind, left: Term, right: Term) -> Term {
        Term::BinOp(kind, Box::new(left), Box::new(right))
    }

    pub fn binop(kind: BinOpKind, left: Term, right: Term) -> Term {
        match kind {
            BinOpKind::Add => Term::add(left, right),
            BinOpKind::Sub => Term::sub(left, right),
            BinOpKind::Mul => Term::mul(left, right),
        }
    }

    /// Addition with constant evaluation. Integer summands move to the
    /// right and adjacent constants merge, so `(p + 8) + 8` and `p + 16`
    /// construct the same term.
    pub fn add(left: Term, right: Term) -> Term {
        match (left, right) {
            (Term::Integer(a), Term::Integer(b)) => match a.checked_add(b) {
                Some(n) => Term::Integer(n),
                None => Term::raw(BinOpKind::Add, Term::Integer(a), Term::Integer(b)),
            },
            (t, Term::Integer(0)) => t,
            (Term::Integer(0), t) => t,
            (Term::Integer(a), t) => Term::add(t, Term::Integer(a)),
            (Term::BinOp(BinOpKind::Add, x, b), Term::Integer(a)) => match (*b, a) {
                (Term::Integer(bv), a) => match bv.checked_add(a) {
                    Some(n) => Term::add(*x, Term::Integer(n)),
                    None => Term::raw(
                        BinOpKind::Add,
                        Term::raw(BinOpKind::Add, *x, Term::Integer(bv)),
                        Term::Integer(a),
                    ),
                },
                (other, a) => Term::raw(
                    BinOpKind::Add,
                    Term::raw(BinOpKind::Add, *x, other),
                    Term::Integer(a),
                ),
            },
            (l, r) => Term::raw(BinOpKind::Add, l, r),
        }
    }

    pub fn sub(left: Term, right: Term) -> Term {
        match (left, right) {
            (Term::Integer(a), Term::Integer(b)) => match a.checked_sub(b) {
                Some(n) => Term::Integer(n),
                None => Term::raw(BinOpKind::Sub, Term::Integer(a), Term::Integer(b)),
            },
            (t, Term::Integer(0)) => t,
            (l, r) if l == r => Term::Integer(0),
            (l, r) => Term::raw(BinOpKind::Sub, l, r),
        }
    }

    pub fn mul(left: Term, right: Term) -> Term {
        match (left, right) {
            (Term::Integer(a), Term::Integer(b)) => match a.checked_mul(b) {
                Some(n) => Term::Integer(n),
                None => Term::raw(BinOpKind::Mul, Term::Integer(a), Term::Integer(b)),
            },
            (t, Term::Integer(1)) => t,
            (Term::Integer(1), t) => t,
            (_, Term::Integer(0)) | (Term::Integer(0), _) => Term::Integer(0),
            (Term::Integer(a), t) => Term::mul(t, Term::Integer(a)),
            (l, r) => Term::raw(BinOpKind::Mul, l, r),
        }
    }

    pub fn free_vars(&self) -> VarSet {
        let mut vs = VarSet::new();
        self.collect_free_vars(&mut vs);
        vs
    }

    fn collect_free_vars(&self, vs: &mut VarSet) {
        match self {
            Term::Var(v) => {
                vs.insert(v.clone());
            }
            Term::Integer(_) => {}
            Term::BinOp(_, l, r) => {
                l.collect_free_vars(vs);
                r.collect_free_vars(vs);
            }
        }
    }

    /// Apply a term substitution, re-simplifying along the way.
    #[must_use]
    pub fn subst(&self, sub: &Subst) -> Term {
        match self {
            Term::Var(v) => match sub.get(v) {
                Some(t) => t.clone(),
                None => self.clone(),
            },
            Term::Integer(_) => self.clone(),
            Term::BinOp(kind, l, r) => Term::binop(*kind, l.subst(sub), r.subst(sub)),
        }
    }

    /// Apply a variable renaming.
    #[must_use]
    pub fn rename(&self, r: &Renaming) -> Term {
        match self {
            Term::Var(v) => Term::Var(r.apply(v)),
            Term::Integer(_) => self.clone(),
            Term::BinOp(kind, l, rt) => Term::binop(*kind, l.rename(r), rt.rename(r)),
        }
    }
}

impl fmt::Display for BinOpKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BinOpKind::Add => write!(f, "+"),
            BinOpKind::Sub => write!(f, "-"),
            BinOpKind::Mul => write!(f, "*"),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Term::Var(v) => write!(f, "{}", v),
            Term::Integer(value) => write!(f, "{}", value),
            Term::BinOp(kind, l, r) => write!(f, "({} {} {})", l, kind, r),
        }
    }
}
