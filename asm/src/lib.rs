//! Two-pass assembler for the qCore 16-bit processor.
//!
//! Source text is parsed into [`Statement`]s, laid out by [`first_pass`],
//! encoded by [`second_pass`] and written as a MIF memory image.

pub mod assembler;
pub mod encoder;
pub mod error;
pub mod mif;
pub mod msg;
pub mod parser;
pub mod stmt;
pub mod symbols;
pub mod util;

pub use assembler::{assemble, first_pass, second_pass, Image, Layout};
pub use encoder::{encode_immediate, Encoder};
pub use error::{AsmError, Error, ErrorKind, Result};
pub use mif::{render_mif, write_mif, DEFAULT_DEPTH};
pub use parser::parse;
pub use stmt::{Instruction, Pos, Program, Statement, Stmt};
pub use symbols::SymbolTable;

/// Parse and assemble in one go.
pub fn assemble_source(source: &str) -> std::result::Result<Image, Vec<AsmError>> {
    let program = parse(source)?;
    assemble(&program).map_err(|err| vec![err])
}
