use crate::op::{
    condition_mnemonic, shift_mnemonic, Format, InstructionDef, INSTRUCTIONS, SHIFT_IMM, XOR_MARK,
};
use crate::reg::Reg;
use crate::RX_SHIFT;
use color_print::cformat;
use std::fmt;

const CLASS_MASK: u16 = 0xF000;
const BRANCH: u16 = 0x2000;
const CLASS7_REG: u16 = 0xE000;
const HALT: u16 = 0xE080;

/// Operands of a decoded word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Args {
    None,
    Reg(Reg),
    RegReg(Reg, Reg),
    RegImm(Reg, i64),
    RegByte(Reg, u8),
    RegMem(Reg, Reg),
    /// Absolute branch target.
    Target(u16),
    /// Pattern no instruction produces.
    Raw(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inst {
    pub mnemonic: &'static str,
    pub args: Args,
}

fn sign_extend(value: u16, bits: u8) -> i64 {
    let shift = 16 - bits as u32;
    (((value << shift) as i16) >> shift) as i64
}

fn rx(word: u16) -> Reg {
    Reg::from_field(word >> RX_SHIFT)
}

fn ry(word: u16) -> Reg {
    Reg::from_field(word)
}

fn raw(word: u16) -> Inst {
    Inst {
        mnemonic: ".word",
        args: Args::Raw(word),
    }
}

/// Entry whose register or immediate opcode owns the top nibble of `word`.
fn by_opcode(word: u16) -> Option<(&'static InstructionDef, bool)> {
    let top = word & CLASS_MASK;
    INSTRUCTIONS.iter().find_map(|def| match def.format {
        Format::RegImmOrReg if def.opcode_reg == top => Some((def, false)),
        Format::RegImmOrReg | Format::RegImm if def.opcode_imm == top => Some((def, true)),
        Format::RegMem | Format::RegOnly if def.opcode_reg == top => Some((def, false)),
        _ => None,
    })
}

/// Decode one word. `addr` is where the word sits, used for branch targets.
pub fn disassemble(word: u16, addr: u16) -> Inst {
    match word & CLASS_MASK {
        BRANCH => {
            let cond = ((word >> RX_SHIFT) & 0b111) as u8;
            let offset = sign_extend(word & 0x1FF, 9);
            let target = (addr as i64 + 1 + offset).rem_euclid(0x10000) as u16;
            match condition_mnemonic(cond) {
                Some(mnemonic) => Inst {
                    mnemonic,
                    args: Args::Target(target),
                },
                None => raw(word),
            }
        }
        CLASS7_REG => decode_class7(word),
        _ => match by_opcode(word) {
            Some((def, imm)) => {
                let args = match (def.format, imm) {
                    (Format::RegImm, _) => Args::RegByte(rx(word), (word & 0xFF) as u8),
                    (Format::RegMem, _) => Args::RegMem(rx(word), ry(word)),
                    (Format::RegOnly, _) => Args::Reg(rx(word)),
                    (_, true) => Args::RegImm(rx(word), sign_extend(word & 0x1FF, def.imm_bits)),
                    (_, false) => Args::RegReg(rx(word), ry(word)),
                };
                Inst {
                    mnemonic: def.mnemonic,
                    args,
                }
            }
            None => raw(word),
        },
    }
}

// cmp rX, rY / shifts / xor / halt all live in the register form of class 7.
fn decode_class7(word: u16) -> Inst {
    if word == HALT {
        return Inst {
            mnemonic: "halt",
            args: Args::None,
        };
    }
    let low = word & 0x1FF;
    if low & 0x100 == 0 {
        if low & 0xF8 != 0 {
            return raw(word);
        }
        return Inst {
            mnemonic: "cmp",
            args: Args::RegReg(rx(word), ry(word)),
        };
    }
    if low & SHIFT_IMM == 0 && low & XOR_MARK != 0 {
        return Inst {
            mnemonic: "xor",
            args: Args::RegReg(rx(word), ry(word)),
        };
    }
    let kind = ((low >> 5) & 0b11) as u8;
    let Some(mnemonic) = shift_mnemonic(kind) else {
        return raw(word);
    };
    let args = if low & SHIFT_IMM != 0 {
        Args::RegImm(rx(word), (low & 0xF) as i64)
    } else {
        Args::RegReg(rx(word), ry(word))
    };
    Inst { mnemonic, args }
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.mnemonic;
        match self.args {
            Args::None => write!(f, "{}", name),
            Args::Reg(r) => write!(f, "{} {}", name, r),
            Args::RegReg(a, b) => write!(f, "{} {}, {}", name, a, b),
            Args::RegImm(a, imm) => write!(f, "{} {}, #{}", name, a, imm),
            Args::RegByte(a, byte) => write!(f, "{} {}, #0x{:02x}", name, a, byte),
            Args::RegMem(a, b) => write!(f, "{} {}, [{}]", name, a, b),
            Args::Target(t) => write!(f, "{} 0x{:x}", name, t),
            Args::Raw(w) => write!(f, "{} 0x{:04x}", name, w),
        }
    }
}

impl Inst {
    pub fn cformat(&self) -> String {
        let name = self.mnemonic;
        match self.args {
            Args::None => cformat!("<r>{:<5}</>", name),
            Args::Reg(r) => cformat!("<r>{:<5}</><b>{}</>", name, r),
            Args::RegReg(a, b) => cformat!("<r>{:<5}</><b>{}, {}</>", name, a, b),
            Args::RegImm(a, imm) => cformat!("<r>{:<5}</><b>{}, </><y>#{}</>", name, a, imm),
            Args::RegByte(a, byte) => {
                cformat!("<r>{:<5}</><b>{}, </><y>#0x{:02x}</>", name, a, byte)
            }
            Args::RegMem(a, b) => cformat!("<r>{:<5}</><b>{}, [{}]</>", name, a, b),
            Args::Target(t) => cformat!("<r>{:<5}</><g>0x{:x}</>", name, t),
            Args::Raw(w) => cformat!("<m>{:<5} 0x{:04x}</>", name, w),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_dis {
        ($($name:ident: $word:expr, $addr:expr => $text:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    let inst = disassemble($word, $addr);
                    assert_eq!(inst.to_string(), $text, "word {:04x}", $word);
                }
            )*
        }
    }

    test_dis! {
        dis_mv_reg: 0x0201, 0 => "mv r1, r1",
        dis_mv_imm: 0x11FF, 0 => "mv r0, #-1",
        dis_mvt: 0x3012, 0 => "mvt r0, #0x12",
        dis_add_imm: 0x5034, 0 => "add r0, #52",
        dis_sub_reg: 0x6603, 0 => "sub r3, r3",
        dis_and_imm: 0xD40F, 0 => "and r2, #15",
        dis_ld: 0x8201, 0 => "ld r1, [r1]",
        dis_st: 0xA405, 0 => "st r2, [r5]",
        dis_push: 0xB605, 0 => "push r3",
        dis_pop: 0x9605, 0 => "pop r3",
        dis_cmp_reg: 0xE203, 0 => "cmp r1, r3",
        dis_cmp_imm: 0xF3FE, 0 => "cmp r1, #-2",
        dis_xor: 0xE312, 0 => "xor r1, r2",
        dis_lsl_imm: 0xE183, 0 => "lsl r0, #3",
        dis_asr_reg: 0xE342, 0 => "asr r1, r2",
        dis_ror_imm: 0xE1EF, 0 => "ror r0, #15",
        dis_branch_forward: 0x2001, 0 => "b 0x2",
        dis_branch_backward: 0x23FF, 0x10 => "beq 0x10",
        dis_bl: 0x2E05, 0x20 => "bl 0x26",
        dis_halt: 0xE080, 0 => "halt",
        dis_unused_class7: 0xE0C0, 0 => ".word 0xe0c0",
    }

    #[test]
    fn branch_target_wraps() {
        // b -2 from address 0 lands at the top of memory
        assert_eq!(disassemble(0x21FE, 0).args, Args::Target(0xFFFF));
    }

    #[test]
    fn sign_extension() {
        assert_eq!(sign_extend(0x100, 9), -256);
        assert_eq!(sign_extend(0x0FF, 9), 255);
        assert_eq!(sign_extend(0x80, 8), -128);
    }
}
