pub mod netlist;
pub mod sexp;

pub use netlist::{NetlistParser, DEFAULT_TARGET_REF};
pub use sexp::{ParseError, SExp, SExpParser};
