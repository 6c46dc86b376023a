use num_enum::{FromPrimitive, IntoPrimitive};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    FromPrimitive,
    IntoPrimitive,
    EnumString,
    EnumIter,
    Display,
)]
#[strum(ascii_case_insensitive)]
#[repr(u8)]
pub enum Reg {
    #[default]
    #[strum(to_string = "r0")]
    R0,
    #[strum(to_string = "r1")]
    R1,
    #[strum(to_string = "r2")]
    R2,
    #[strum(to_string = "r3")]
    R3,
    #[strum(to_string = "r4")]
    R4,
    #[strum(to_string = "r5", serialize = "sp")]
    R5,
    #[strum(to_string = "r6", serialize = "lr")]
    R6,
    #[strum(to_string = "r7", serialize = "pc")]
    R7,
}

impl Reg {
    pub const SP: Reg = Reg::R5;
    pub const LR: Reg = Reg::R6;
    pub const PC: Reg = Reg::R7;

    /// Register held in the low three bits of `bits`.
    pub fn from_field(bits: u16) -> Reg {
        Reg::from((bits & 0b111) as u8)
    }

    pub fn bits(self) -> u16 {
        u8::from(self) as u16
    }
}

pub fn lookup_register(name: &str) -> Option<Reg> {
    name.trim().parse::<Reg>().ok()
}

#[derive(Debug, Clone, Copy)]
pub struct RegisterDef {
    pub name: &'static str,
    pub reg: Reg,
    pub description: &'static str,
}

#[rustfmt::skip]
pub static REGISTERS: &[RegisterDef] = &[
    RegisterDef { name: "r0", reg: Reg::R0, description: "General purpose register 0" },
    RegisterDef { name: "r1", reg: Reg::R1, description: "General purpose register 1" },
    RegisterDef { name: "r2", reg: Reg::R2, description: "General purpose register 2" },
    RegisterDef { name: "r3", reg: Reg::R3, description: "General purpose register 3" },
    RegisterDef { name: "r4", reg: Reg::R4, description: "General purpose register 4" },
    RegisterDef { name: "r5", reg: Reg::R5, description: "General purpose register 5 / Stack Pointer" },
    RegisterDef { name: "r6", reg: Reg::R6, description: "General purpose register 6 / Link Register" },
    RegisterDef { name: "r7", reg: Reg::R7, description: "General purpose register 7 / Program Counter" },
    RegisterDef { name: "sp", reg: Reg::SP, description: "Stack Pointer (alias for r5)" },
    RegisterDef { name: "lr", reg: Reg::LR, description: "Link Register (alias for r6)" },
    RegisterDef { name: "pc", reg: Reg::PC, description: "Program Counter (alias for r7)" },
];

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn aliases_share_slots() {
        assert_eq!(lookup_register("sp"), Some(Reg::R5));
        assert_eq!(lookup_register("lr"), Some(Reg::R6));
        assert_eq!(lookup_register("pc"), Some(Reg::R7));
        assert_eq!(lookup_register("R3"), Some(Reg::R3));
        assert_eq!(lookup_register("r8"), None);
        assert_eq!(lookup_register("hoge"), None);
    }

    #[test]
    fn table_matches_parser() {
        for def in REGISTERS {
            assert_eq!(lookup_register(def.name), Some(def.reg), "{}", def.name);
        }
    }

    #[test]
    fn field_round_trip() {
        for reg in Reg::iter() {
            assert_eq!(Reg::from_field(reg.bits()), reg);
            assert_eq!(reg.to_string(), format!("r{}", reg.bits()));
        }
    }
}
