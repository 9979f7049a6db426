#![deny(unused_must_use)]
#![deny(unreachable_patterns)]
#![deny(unused_mut)]

mod algebra;
mod normalize;
pub mod pretty;
mod quantify;
mod query;
pub mod segment;
pub mod starjunction;

pub use segment::Segment;
pub use starjunction::{Disjunction, Starjunction};
