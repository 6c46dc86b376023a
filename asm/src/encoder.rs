use crate::error::{AsmError, Error, ErrorKind};
use crate::stmt::{Instruction, Statement, Stmt};
use crate::symbols::SymbolTable;
use crate::util::unquote;
use qcore::op::{signed_range, SHIFT_IMM, SHIFT_MARK};
use qcore::{
    lookup_directive, lookup_instruction, lookup_register, Category, Directive, Format,
    InstructionDef, Reg, RX_SHIFT,
};

/// One past the last addressable word.
pub const ADDRESS_LIMIT: u32 = 0x10000;

const BRANCH_MIN: i64 = -256;
const BRANCH_MAX: i64 = 255;

/// Pack `value` into a `bits`-wide two's complement field.
pub fn encode_immediate(value: i64, bits: u8, context: &str) -> Result<u16, Error> {
    let (min, max) = signed_range(bits);
    if value < min || value > max {
        return Err(Error::ImmediateRange {
            value,
            min,
            max,
            context: context.to_string(),
        });
    }
    let mask = (1i64 << bits) - 1;
    Ok((value & mask) as u16)
}

/// Fit a value into one word, accepting both signed and unsigned spellings.
pub fn encode_word(value: i64, context: &str) -> Result<u16, Error> {
    if !(-0x8000..=0xFFFF).contains(&value) {
        return Err(Error::WordRange {
            value,
            context: context.to_string(),
        });
    }
    Ok((value & 0xFFFF) as u16)
}

fn register(text: &str) -> Result<Reg, Error> {
    lookup_register(text).ok_or_else(|| Error::UnknownRegister(text.trim().to_string()))
}

fn indirect_register(text: &str) -> Result<Reg, Error> {
    let t = text.trim();
    let inner = t
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .unwrap_or(t);
    register(inner)
}

fn def_of(mnemonic: &'static str) -> Result<&'static InstructionDef, Error> {
    lookup_instruction(mnemonic).ok_or_else(|| Error::UnknownInstruction(mnemonic.to_string()))
}

fn mismatch(def: &InstructionDef, what: &str) -> Error {
    Error::OperandMismatch(format!("`{}` {}", def.mnemonic, what))
}

/// Destination register, already shifted into the rX field.
fn destination(def: &InstructionDef, instr: &Instruction) -> Result<u16, Error> {
    if instr.operand1.is_empty() {
        return Err(mismatch(def, "requires a destination register"));
    }
    Ok(register(&instr.operand1)?.bits() << RX_SHIFT)
}

fn second<'i>(def: &InstructionDef, instr: &'i Instruction) -> Result<&'i str, Error> {
    if !instr.has_second {
        return Err(mismatch(def, "requires a second operand"));
    }
    Ok(instr.operand2.as_str())
}

/// Words produced by the space-filling directives. Pass 1 sizes with this
/// as well, so both passes agree by construction.
pub fn data_words(
    directive: Directive,
    value: &str,
    symbols: &SymbolTable,
    address: u32,
) -> Result<Vec<u16>, Error> {
    match directive {
        Directive::Define => Ok(vec![]),
        Directive::Word => Ok(vec![encode_word(symbols.resolve(value)?, ".word")?]),
        Directive::Org => {
            let target = symbols.resolve(value)?;
            if target < address as i64 {
                return Err(Error::OriginBackward {
                    target,
                    current: address,
                });
            }
            if target > ADDRESS_LIMIT as i64 {
                return Err(Error::AddressOverflow(target));
            }
            Ok(vec![0; (target - address as i64) as usize])
        }
        Directive::Space => {
            let count = symbols.resolve(value)?;
            let room = (ADDRESS_LIMIT - address.min(ADDRESS_LIMIT)) as i64;
            if count < 0 || count > room {
                return Err(Error::ImmediateRange {
                    value: count,
                    min: 0,
                    max: room,
                    context: ".space count".to_string(),
                });
            }
            Ok(vec![0; count as usize])
        }
        Directive::Ascii | Directive::Asciiz => {
            let text = unquote(value)?;
            let mut words = text
                .chars()
                .map(|c| encode_word(c as i64, &directive.to_string()))
                .collect::<Result<Vec<_>, _>>()?;
            if directive == Directive::Asciiz {
                words.push(0);
            }
            Ok(words)
        }
    }
}

/// Pass 2 encoder: turns statements into words using a finished symbol table.
pub struct Encoder<'a> {
    symbols: &'a SymbolTable,
    address: u32,
}

impl<'a> Encoder<'a> {
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Encoder { symbols, address: 0 }
    }

    /// Encode one statement at the current address and advance past it.
    pub fn encode(&mut self, stmt: &Statement) -> Result<Vec<u16>, AsmError> {
        let at = |err: Error| err.at(stmt.pos.line, stmt.pos.column);
        let words = match &stmt.stmt {
            Stmt::Label { .. } => vec![],
            Stmt::Directive { name, value, .. } => {
                let def = lookup_directive(name)
                    .ok_or_else(|| at(Error::UnknownDirective(name.clone())))?;
                data_words(def.directive, value, self.symbols, self.address).map_err(at)?
            }
            Stmt::Instruction(instr) => {
                let def = lookup_instruction(&instr.mnemonic)
                    .ok_or_else(|| at(Error::UnknownInstruction(instr.mnemonic.clone())))?;
                self.encode_instruction(def, instr).map_err(|err| {
                    let hinted = matches!(err.kind(), ErrorKind::Format | ErrorKind::Range);
                    let located = at(err);
                    if hinted {
                        located.with_hint(def.hint())
                    } else {
                        located
                    }
                })?
            }
        };
        self.address += words.len() as u32;
        Ok(words)
    }

    pub fn encode_instruction(
        &self,
        def: &InstructionDef,
        instr: &Instruction,
    ) -> Result<Vec<u16>, Error> {
        match def.format {
            Format::NoOperand => {
                if !instr.operand1.is_empty() || instr.has_second {
                    return Err(mismatch(def, "takes no operands"));
                }
                Ok(vec![def.opcode_reg])
            }
            Format::Branch => {
                if instr.operand1.is_empty() {
                    return Err(mismatch(def, "requires a branch target"));
                }
                if instr.has_second {
                    return Err(mismatch(def, "takes a single target operand"));
                }
                Ok(vec![self.encode_branch(def, &instr.operand1)?])
            }
            Format::RegOnly => {
                let rx = destination(def, instr)?;
                if instr.has_second {
                    return Err(mismatch(def, "takes a single register operand"));
                }
                Ok(vec![def.opcode_reg | rx | def.extra as u16])
            }
            Format::RegReg | Format::RegMem => {
                let (rx, op2) = (destination(def, instr)?, second(def, instr)?);
                if instr.is_imm || instr.is_label_imm {
                    return Err(mismatch(def, "expects a register as its second operand"));
                }
                let ry = match def.format {
                    Format::RegMem => indirect_register(op2)?,
                    _ => register(op2)?,
                };
                Ok(vec![def.opcode_reg | rx | ry.bits()])
            }
            Format::RegImm => {
                let (rx, op2) = (destination(def, instr)?, second(def, instr)?);
                if instr.is_label_imm {
                    return Err(mismatch(def, "does not accept `=value`, use #imm"));
                }
                if lookup_register(op2).is_some() {
                    return Err(mismatch(def, "expects an immediate as its second operand"));
                }
                let value = self.symbols.resolve(op2)?;
                let imm = encode_immediate(value, def.imm_bits, def.mnemonic)?;
                Ok(vec![def.opcode_imm | rx | imm])
            }
            Format::RegImmOrReg => {
                let (rx, op2) = (destination(def, instr)?, second(def, instr)?);
                if instr.is_label_imm {
                    if !def.expands {
                        return Err(mismatch(def, "does not accept `=value`"));
                    }
                    return self.expand(def, rx, op2);
                }
                if instr.is_imm {
                    let value = self.symbols.resolve(op2)?;
                    let (min, max) = def.imm_range();
                    if value < min || value > max {
                        return Err(Error::NarrowImmediate {
                            value,
                            bits: def.imm_bits,
                        });
                    }
                    let imm = encode_immediate(value, def.imm_bits, def.mnemonic)?;
                    return Ok(vec![def.opcode_imm | rx | imm]);
                }
                Ok(vec![def.opcode_reg | rx | register(op2)?.bits()])
            }
            Format::Shift => {
                let (rx, op2) = (destination(def, instr)?, second(def, instr)?);
                let base = def.opcode_reg | rx | SHIFT_MARK | ((def.extra as u16) << 5);
                if instr.is_label_imm {
                    return Err(mismatch(def, "does not accept `=value`"));
                }
                if instr.is_imm {
                    let amount = self.symbols.resolve(op2)?;
                    if !(0..=15).contains(&amount) {
                        return Err(Error::ShiftRange(amount));
                    }
                    return Ok(vec![base | SHIFT_IMM | amount as u16]);
                }
                Ok(vec![base | register(op2)?.bits()])
            }
            Format::LabelLoad => {
                let (rx, op2) = (destination(def, instr)?, second(def, instr)?);
                if instr.is_imm {
                    return Err(mismatch(def, "loads a full word, write `=value`"));
                }
                self.expand(def, rx, op2)
            }
        }
    }

    /// `MVT rX, #high` followed by the low-byte step. Moves and loads use ADD
    /// for the low byte; arithmetic uses its own immediate form.
    fn expand(&self, def: &InstructionDef, rx: u16, operand: &str) -> Result<Vec<u16>, Error> {
        let value = encode_word(self.symbols.resolve(operand)?, "=value")?;
        let mvt = def_of("mvt")?;
        let low_op = match def.category {
            Category::DataMovement => def_of("add")?.opcode_imm,
            _ => def.opcode_imm,
        };
        Ok(vec![
            mvt.opcode_imm | rx | (value >> 8),
            low_op | rx | (value & 0xFF),
        ])
    }

    fn encode_branch(&self, def: &InstructionDef, operand: &str) -> Result<u16, Error> {
        let target = self.symbols.resolve(operand)?;
        if !(0..ADDRESS_LIMIT as i64).contains(&target) {
            return Err(Error::AddressOverflow(target));
        }
        let offset = target - (self.address as i64 + 1);
        if !(BRANCH_MIN..=BRANCH_MAX).contains(&offset) {
            return Err(Error::BranchRange(offset));
        }
        let imm = encode_immediate(offset, def.imm_bits, "branch offset")?;
        Ok(def.opcode_reg | ((def.extra as u16) << RX_SHIFT) | imm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stmt::Pos;

    fn encode_at(
        symbols: &SymbolTable,
        address: u32,
        mnemonic: &str,
        op1: &str,
        op2: Option<&str>,
    ) -> Result<Vec<u16>, AsmError> {
        let mut encoder = Encoder::new(symbols);
        encoder.address = address;
        let stmt = Statement::instruction(Pos::new(1, 1), Instruction::new(mnemonic, op1, op2));
        encoder.encode(&stmt)
    }

    fn encode(mnemonic: &str, op1: &str, op2: Option<&str>) -> Result<Vec<u16>, AsmError> {
        encode_at(&SymbolTable::new(), 0, mnemonic, op1, op2)
    }

    macro_rules! test_enc {
        ($($name:ident: $mn:expr, $op1:expr, $op2:expr => $words:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    let words = encode($mn, $op1, $op2).unwrap();
                    assert_eq!(words, $words, "{:04x?}", words);
                }
            )*
        }
    }

    test_enc! {
        enc_mv_reg: "mv", "r1", Some("r2") => vec![0x0202],
        enc_mv_imm: "mv", "r0", Some("#5") => vec![0x1005],
        enc_mv_neg: "mv", "r0", Some("#-1") => vec![0x11FF],
        enc_mv_resolved: "mv", "r0", Some("=0x1234") => vec![0x3012, 0x5034],
        enc_add_resolved: "add", "r1", Some("=0x0180") => vec![0x3201, 0x5280],
        enc_sub_resolved: "sub", "r2", Some("=0x1234") => vec![0x3412, 0x7434],
        enc_mvt: "mvt", "r3", Some("#0x12") => vec![0x3612],
        enc_la: "la", "r4", Some("=0xBEEF") => vec![0x38BE, 0x58EF],
        enc_add_reg: "add", "r0", Some("r1") => vec![0x4001],
        enc_sub_imm: "sub", "r7", Some("#255") => vec![0x7EFF],
        enc_and_imm: "and", "r2", Some("#-256") => vec![0xD500],
        enc_xor: "xor", "r1", Some("r2") => vec![0xE312],
        enc_cmp_reg: "cmp", "r1", Some("r3") => vec![0xE203],
        enc_cmp_imm: "cmp", "r1", Some("#-2") => vec![0xF3FE],
        enc_ld: "ld", "r1", Some("[r1]") => vec![0x8201],
        enc_st: "st", "r2", Some("sp") => vec![0xA405],
        enc_push: "push", "r3", None => vec![0xB605],
        enc_pop: "pop", "lr", None => vec![0x9C05],
        enc_lsl_imm: "lsl", "r0", Some("#3") => vec![0xE183],
        enc_lsr_max: "lsr", "r0", Some("#15") => vec![0xE1AF],
        enc_asr_reg: "asr", "r1", Some("r2") => vec![0xE342],
        enc_halt: "halt", "", None => vec![0xE080],
    }

    #[test]
    fn immediate_bounds() {
        for bits in [4u8, 8, 9] {
            let (min, max) = signed_range(bits);
            assert!(encode_immediate(min, bits, "t").is_ok());
            assert!(encode_immediate(max, bits, "t").is_ok());
            assert!(encode_immediate(min - 1, bits, "t").is_err());
            assert!(encode_immediate(max + 1, bits, "t").is_err());
        }
        assert_eq!(encode_immediate(-1, 9, "t"), Ok(0x1FF));
        assert_eq!(encode_immediate(-256, 9, "t"), Ok(0x100));
    }

    #[test]
    fn narrow_immediate_rejected() {
        let err = encode("add", "r0", Some("#300")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        assert_eq!(err.error, Error::NarrowImmediate { value: 300, bits: 9 });
        assert!(err.to_string().contains("300"));
        assert_eq!(
            err.hint.as_deref(),
            Some("Expected format: add rX, rY | rX, #imm | rX, =label")
        );
    }

    #[test]
    fn shape_mismatch() {
        let cases = [
            ("xor", "r0", Some("#1")),
            ("ld", "r0", Some("#1")),
            ("mvt", "r0", Some("r1")),
            ("mvt", "r0", Some("=0x1234")),
            ("cmp", "r0", Some("=0x1234")),
            ("push", "r0", Some("r1")),
            ("halt", "r0", None),
            ("b", "", None),
            ("add", "r0", None),
            ("la", "r0", Some("#1")),
        ];
        for (mn, op1, op2) in cases {
            let err = encode(mn, op1, op2).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Format, "{} {} {:?}", mn, op1, op2);
            assert!(err.hint.is_some());
        }
    }

    #[test]
    fn unknown_names() {
        assert_eq!(
            encode("nop", "", None).unwrap_err().error,
            Error::UnknownInstruction("nop".to_string())
        );
        assert_eq!(
            encode("add", "r9", Some("r0")).unwrap_err().error,
            Error::UnknownRegister("r9".to_string())
        );
    }

    #[test]
    fn shift_amount_range() {
        let err = encode("lsl", "r0", Some("#16")).unwrap_err();
        assert_eq!(err.error, Error::ShiftRange(16));
        assert!(encode("lsl", "r0", Some("#-1")).is_err());
    }

    #[test]
    fn branches() {
        let mut symbols = SymbolTable::new();
        symbols.add_label("here", 0x10, 1).unwrap();
        symbols.add_label("far", 0x200, 2).unwrap();
        assert_eq!(encode_at(&symbols, 0x10, "b", "here", None).unwrap(), vec![0x21FF]);
        assert_eq!(encode_at(&symbols, 0x0F, "bne", "here", None).unwrap(), vec![0x2400]);
        assert_eq!(encode_at(&symbols, 0x100, "bl", "far", None).unwrap(), vec![0x2EFF]);
        let err = encode_at(&symbols, 0x0, "b", "far", None).unwrap_err();
        assert_eq!(err.error, Error::BranchRange(0x1FF));
        assert_eq!(encode_at(&symbols, 0xFF, "b", "0", None).unwrap(), vec![0x2100]);
        let err = encode_at(&symbols, 0x100, "b", "0", None).unwrap_err();
        assert_eq!(err.error, Error::BranchRange(-257));
        let err = encode_at(&symbols, 0x0, "b", "nowhere", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Symbol);
    }

    #[test]
    fn resolved_address_uses_symbols() {
        let mut symbols = SymbolTable::new();
        symbols.add_label("data", 0x0120, 1).unwrap();
        symbols.add_define("NEG", -2, 2).unwrap();
        let mv = |op2| encode_at(&symbols, 0, "mv", "r2", Some(op2)).unwrap();
        assert_eq!(mv("=data"), vec![0x3401, 0x5420]);
        assert_eq!(mv("=NEG"), vec![0x34FF, 0x54FE]);
        assert_eq!(mv("#NEG"), vec![0x15FE]);
        let err = encode_at(&symbols, 0, "mv", "r0", Some("=0x10000")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn directives() {
        let symbols = SymbolTable::new();
        assert_eq!(data_words(Directive::Word, "-1", &symbols, 0), Ok(vec![0xFFFF]));
        assert_eq!(data_words(Directive::Word, "65535", &symbols, 0), Ok(vec![0xFFFF]));
        assert!(data_words(Directive::Word, "65536", &symbols, 0).is_err());
        assert!(data_words(Directive::Word, "-32769", &symbols, 0).is_err());
        assert_eq!(data_words(Directive::Org, "4", &symbols, 1), Ok(vec![0, 0, 0]));
        assert_eq!(
            data_words(Directive::Org, "1", &symbols, 4),
            Err(Error::OriginBackward { target: 1, current: 4 })
        );
        assert_eq!(data_words(Directive::Space, "2", &symbols, 0), Ok(vec![0, 0]));
        assert!(data_words(Directive::Space, "-1", &symbols, 0).is_err());
        assert_eq!(data_words(Directive::Ascii, "\"Hi\"", &symbols, 0), Ok(vec![0x48, 0x69]));
        assert_eq!(data_words(Directive::Asciiz, "Hi", &symbols, 0), Ok(vec![0x48, 0x69, 0]));
        assert_eq!(data_words(Directive::Define, "3", &symbols, 0), Ok(vec![]));
    }
}
