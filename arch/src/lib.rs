//! qCore instruction set: definition tables, disassembler and reference
//! generator.
//!
//! Every 16-bit instruction word shares one layout:
//!
//! ```text
//!  15  13  12  11   9  8             0
//! +------+---+-------+----------------+
//! | class| I |  rX   |  rY / imm      |
//! +------+---+-------+----------------+
//! ```

pub mod directive;
pub mod doc;
pub mod inst;
pub mod op;
pub mod reg;

pub use directive::{lookup_directive, Directive, DirectiveDef, DIRECTIVES};
pub use inst::{disassemble, Args, Inst};
pub use op::{lookup_instruction, Category, Format, InstructionDef, INSTRUCTIONS};
pub use reg::{lookup_register, Reg, RegisterDef, REGISTERS};

/// Shift amount of the destination / condition field.
pub const RX_SHIFT: u16 = 9;
