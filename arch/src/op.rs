use bimap::BiMap;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use strum::{Display, EnumIter};

/// Operand shape of a mnemonic. Decides both parsing and bit packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Format {
    /// `op rX, rY`
    RegReg,
    /// `op rX, #imm`
    RegImm,
    /// `op rX, rY | rX, #imm | rX, =value`
    RegImmOrReg,
    /// `b<cond> label`
    Branch,
    /// `push/pop rX`
    RegOnly,
    /// `ld/st rX, [rY]`
    RegMem,
    /// `lsl/lsr/asr/ror rX, rY | rX, #imm`
    Shift,
    /// `la rX, =value`, always MVT + ADD
    LabelLoad,
    /// `halt`
    NoOperand,
}

impl Format {
    pub fn syntax(&self) -> &'static str {
        match self {
            Format::RegReg => "rX, rY",
            Format::RegImm => "rX, #imm",
            Format::RegImmOrReg => "rX, rY | rX, #imm | rX, =label",
            Format::Branch => "label",
            Format::RegOnly => "rX",
            Format::RegMem => "rX, [rY]",
            Format::Shift => "rX, rY | rX, #imm",
            Format::LabelLoad => "rX, =label",
            Format::NoOperand => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Category {
    #[strum(to_string = "Data Movement")]
    DataMovement,
    #[strum(to_string = "Arithmetic/Logic")]
    Alu,
    #[strum(to_string = "Memory")]
    Memory,
    #[strum(to_string = "Shift/Rotate")]
    Shift,
    #[strum(to_string = "Branch")]
    Branch,
    #[strum(to_string = "Control")]
    Control,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionDef {
    pub mnemonic: &'static str,
    pub format: Format,
    pub category: Category,
    pub opcode_reg: u16,
    pub opcode_imm: u16,
    pub imm_bits: u8,
    /// Branch condition, shift kind, or implicit second register.
    pub extra: u8,
    /// Emits MVT + op when the second operand is `=value`.
    pub expands: bool,
    pub description: &'static str,
}

impl InstructionDef {
    /// Number of words this instruction occupies once encoded.
    pub fn size(&self, resolved_operand: bool) -> u16 {
        match self.format {
            Format::LabelLoad => 2,
            _ if resolved_operand && self.expands => 2,
            _ => 1,
        }
    }

    pub fn hint(&self) -> String {
        let syntax = self.format.syntax();
        if syntax.is_empty() {
            format!("Expected format: {}", self.mnemonic)
        } else {
            format!("Expected format: {} {}", self.mnemonic, syntax)
        }
    }

    /// Inclusive range of a signed immediate of `imm_bits` bits.
    pub fn imm_range(&self) -> (i64, i64) {
        signed_range(self.imm_bits)
    }
}

pub fn signed_range(bits: u8) -> (i64, i64) {
    let half = 1i64 << (bits.max(1) - 1);
    (-half, half - 1)
}

macro_rules! def {
    (
        $mn:expr, $fmt:ident, $cat:ident, $reg:expr, $imm:expr,
        $bits:expr, $extra:expr, $exp:expr, $desc:expr
    ) => {
        InstructionDef {
            mnemonic: $mn,
            format: Format::$fmt,
            category: Category::$cat,
            opcode_reg: $reg,
            opcode_imm: $imm,
            imm_bits: $bits,
            extra: $extra,
            expands: $exp,
            description: $desc,
        }
    };
}

// mnemonic, format, category, opReg, opImm, immBits, extra, expands, description
#[rustfmt::skip]
pub static INSTRUCTIONS: &[InstructionDef] = &[
    def!("mv",   RegImmOrReg, DataMovement, 0x0000, 0x1000, 9, 0, true,  "Move register or immediate to register"),
    def!("mvt",  RegImm,      DataMovement, 0x3000, 0x3000, 8, 0, false, "Move to top byte of register"),
    def!("la",   LabelLoad,   DataMovement, 0x3000, 0x5000, 8, 0, true,  "Load a 16-bit address or constant (MVT + ADD)"),
    def!("add",  RegImmOrReg, Alu,          0x4000, 0x5000, 9, 0, true,  "Add register or immediate"),
    def!("sub",  RegImmOrReg, Alu,          0x6000, 0x7000, 9, 0, true,  "Subtract register or immediate"),
    def!("and",  RegImmOrReg, Alu,          0xC000, 0xD000, 9, 0, true,  "Bitwise AND register or immediate"),
    def!("xor",  RegReg,      Alu,          0xE110, 0xE110, 0, 0, false, "Bitwise XOR registers"),
    def!("cmp",  RegImmOrReg, Alu,          0xE000, 0xF000, 9, 0, false, "Compare register with register or immediate"),
    def!("ld",   RegMem,      Memory,       0x8000, 0x8000, 0, 0, false, "Load from memory"),
    def!("st",   RegMem,      Memory,       0xA000, 0xA000, 0, 0, false, "Store to memory"),
    def!("push", RegOnly,     Memory,       0xB000, 0xB000, 0, 5, false, "Push register to stack"),
    def!("pop",  RegOnly,     Memory,       0x9000, 0x9000, 0, 5, false, "Pop from stack to register"),
    def!("lsl",  Shift,       Shift,        0xE000, 0xE000, 4, 0, false, "Logical shift left"),
    def!("lsr",  Shift,       Shift,        0xE000, 0xE000, 4, 1, false, "Logical shift right"),
    def!("asr",  Shift,       Shift,        0xE000, 0xE000, 4, 2, false, "Arithmetic shift right"),
    def!("ror",  Shift,       Shift,        0xE000, 0xE000, 4, 3, false, "Rotate right"),
    def!("b",    Branch,      Branch,       0x2000, 0x2000, 9, 0, false, "Unconditional branch"),
    def!("beq",  Branch,      Branch,       0x2000, 0x2000, 9, 1, false, "Branch if equal (Z=1)"),
    def!("bne",  Branch,      Branch,       0x2000, 0x2000, 9, 2, false, "Branch if not equal (Z=0)"),
    def!("bcc",  Branch,      Branch,       0x2000, 0x2000, 9, 3, false, "Branch if carry clear (C=0)"),
    def!("bcs",  Branch,      Branch,       0x2000, 0x2000, 9, 4, false, "Branch if carry set (C=1)"),
    def!("bpl",  Branch,      Branch,       0x2000, 0x2000, 9, 5, false, "Branch if positive (N=0)"),
    def!("bmi",  Branch,      Branch,       0x2000, 0x2000, 9, 6, false, "Branch if negative (N=1)"),
    def!("bl",   Branch,      Branch,       0x2000, 0x2000, 9, 7, false, "Branch and link (call)"),
    def!("halt", NoOperand,   Control,      0xE080, 0xE080, 0, 0, false, "Stop the processor"),
];

/// Bits of the class 7 register form that shifts and `xor` set.
pub const SHIFT_MARK: u16 = 0b10 << 7;
pub const SHIFT_IMM: u16 = 1 << 7;
pub const XOR_MARK: u16 = 1 << 4;

static INSTRUCTION_MAP: Lazy<HashMap<&'static str, &'static InstructionDef>> =
    Lazy::new(|| INSTRUCTIONS.iter().map(|def| (def.mnemonic, def)).collect());

static CONDITIONS: Lazy<BiMap<u8, &'static str>> = Lazy::new(|| by_extra(Format::Branch));

static SHIFTS: Lazy<BiMap<u8, &'static str>> = Lazy::new(|| by_extra(Format::Shift));

fn by_extra(format: Format) -> BiMap<u8, &'static str> {
    INSTRUCTIONS
        .iter()
        .filter(|def| def.format == format)
        .map(|def| (def.extra, def.mnemonic))
        .collect()
}

/// Case-insensitive mnemonic lookup.
pub fn lookup_instruction(mnemonic: &str) -> Option<&'static InstructionDef> {
    match INSTRUCTION_MAP.get(mnemonic) {
        Some(def) => Some(*def),
        None => INSTRUCTION_MAP
            .get(mnemonic.to_ascii_lowercase().as_str())
            .copied(),
    }
}

/// Branch mnemonic for a condition code.
pub fn condition_mnemonic(cond: u8) -> Option<&'static str> {
    CONDITIONS.get_by_left(&cond).copied()
}

/// Shift mnemonic for a shift kind.
pub fn shift_mnemonic(kind: u8) -> Option<&'static str> {
    SHIFTS.get_by_left(&kind).copied()
}

pub fn condition_text(cond: u8) -> &'static str {
    match cond {
        0 => "Always",
        1 => "Z=1",
        2 => "Z=0",
        3 => "C=0",
        4 => "C=1",
        5 => "N=0",
        6 => "N=1",
        7 => "Link",
        _ => "?",
    }
}
