// © 2019, ETH Zurich
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    sync::atomic::{self, AtomicU64},
};
use symex_terms::{Renaming, Subst, Term, VarSet};

static NEXT_TAG: AtomicU64 = AtomicU64::new(1);

/// A points-to atom: bytes `seq` of length `siz` starting at `loc`, inside
/// an allocation block of length `len` starting at `bas`.
///
/// Equality and hashing are structural over the five terms. The `tag` is an
/// identity assigned at construction and preserved by `Clone`: two
/// structurally equal but separately constructed segments are distinct
/// instances, and `Starjunction::rem_seg` matches instances, not values.
#[derive(Debug, Clone, Eq, serde::Serialize, serde::Deserialize)]
pub struct Segment {
    pub loc: Term,
    pub bas: Term,
    pub len: Term,
    pub siz: Term,
    pub seq: Term,
    tag: u64,
}

impl Segment {
    pub fn new(loc: Term, bas: Term, len: Term, siz: Term, seq: Term) -> Segment {
        Segment {
            loc,
            bas,
            len,
            siz,
            seq,
            tag: NEXT_TAG.fetch_add(1, atomic::Ordering::Relaxed),
        }
    }

    pub fn tag(&self) -> u64 {
        self.tag
    }

    /// Instance identity: true exactly when both sides are the same
    /// construction (or clones of it).
    pub fn same(&self, other: &Segment) -> bool {
        self.tag == other.tag
    }

    /// A structurally identical segment with a fresh identity.
    pub(crate) fn retag(&self) -> Segment {
        Segment::new(
            self.loc.clone(),
            self.bas.clone(),
            self.len.clone(),
            self.siz.clone(),
            self.seq.clone(),
        )
    }

    pub fn free_vars(&self) -> VarSet {
        let mut vs = VarSet::new();
        for t in [&self.loc, &self.bas, &self.len, &self.siz, &self.seq] {
            vs.extend(t.free_vars());
        }
        vs
    }

    /// Rewriting a formula preserves segment identity, so the tag survives.
    #[must_use]
    pub(crate) fn subst(&self, sub: &Subst) -> Segment {
        Segment {
            loc: self.loc.subst(sub),
            bas: self.bas.subst(sub),
            len: self.len.subst(sub),
            siz: self.siz.subst(sub),
            seq: self.seq.subst(sub),
            tag: self.tag,
        }
    }

    #[must_use]
    pub(crate) fn rename(&self, r: &Renaming) -> Segment {
        Segment {
            loc: self.loc.rename(r),
            bas: self.bas.rename(r),
            len: self.len.rename(r),
            siz: self.siz.rename(r),
            seq: self.seq.rename(r),
            tag: self.tag,
        }
    }

    fn fields(&self) -> (&Term, &Term, &Term, &Term, &Term) {
        (&self.loc, &self.bas, &self.len, &self.siz, &self.seq)
    }
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.fields() == other.fields()
    }
}

impl Hash for Segment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fields().hash(state);
    }
}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fields().cmp(&other.fields())
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}[{}) in {}[{}) |-> {}",
            self.loc, self.siz, self.bas, self.len, self.seq
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use symex_terms::Var;

    fn byte_range(name: &str) -> Segment {
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
    fn structural_equality_ignores_identity() {
        let a = byte_range("p");
        let b = byte_range("p");
        assert_eq!(a, b);
        assert!(!a.same(&b));
        assert!(a.same(&a.clone()));
    }

    #[test]
    fn free_vars_cover_all_fields() {
        let s = byte_range("p");
        let vs = s.free_vars();
        assert!(vs.contains(&Var::new("p")));
        assert!(vs.contains(&Var::new("v")));
        assert_eq!(vs.len(), 2);
    }

    #[test]
    fn subst_keeps_identity() {
        let s = byte_range("p");
        let sub = Subst::single(Var::new("p"), Term::int(16));
        let t = s.subst(&sub);
        assert!(s.same(&t));
        assert_eq!(t.loc, Term::int(16));
    }
}
