#![deny(unused_must_use)]
#![deny(unreachable_patterns)]
#![deny(unused_mut)]

pub mod context;
pub mod pure;
pub mod subst;
pub mod term;
pub mod var;

pub use context::Context;
pub use pure::Formula;
pub use subst::{Renaming, Subst};
pub use term::{BinOpKind, Term};
pub use var::{Var, VarSet};
