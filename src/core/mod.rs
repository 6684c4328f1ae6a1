mod capacity;
mod evaluation;
mod precedence;
pub(crate) mod problem;
mod profile;
mod solution;

pub use capacity::*;
pub use evaluation::*;
pub use precedence::*;
pub use problem::*;
pub use profile::*;
pub use solution::*;
