use std::fmt;

/// 1-based source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pos {
    pub line: usize,
    pub column: usize,
}

impl Pos {
    pub fn new(line: usize, column: usize) -> Self {
        Pos { line, column }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub mnemonic: String,
    pub operand1: String,
    pub operand2: String,
    pub has_second: bool,
    /// Second operand was written `=value`.
    pub is_label_imm: bool,
    /// Second operand was written `#value`.
    pub is_imm: bool,
}

impl Instruction {
    pub fn new(mnemonic: &str, operand1: &str, operand2: Option<&str>) -> Self {
        let (operand2, is_imm, is_label_imm) = match operand2 {
            Some(op) => match op.trim().strip_prefix('#') {
                Some(rest) => (rest, true, false),
                None => match op.trim().strip_prefix('=') {
                    Some(rest) => (rest, false, true),
                    None => (op.trim(), false, false),
                },
            },
            None => ("", false, false),
        };
        Instruction {
            mnemonic: mnemonic.to_string(),
            operand1: operand1.trim().to_string(),
            operand2: operand2.trim().to_string(),
            has_second: !operand2.trim().is_empty() || is_imm || is_label_imm,
            is_label_imm,
            is_imm,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Label {
        name: String,
    },
    Directive {
        name: String,
        bind: Option<String>,
        value: String,
    },
    Instruction(Instruction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub pos: Pos,
    pub stmt: Stmt,
}

impl Statement {
    pub fn label(pos: Pos, name: &str) -> Self {
        Statement {
            pos,
            stmt: Stmt::Label {
                name: name.to_string(),
            },
        }
    }

    pub fn directive(pos: Pos, name: &str, bind: Option<&str>, value: &str) -> Self {
        Statement {
            pos,
            stmt: Stmt::Directive {
                name: name.to_string(),
                bind: bind.map(str::to_string),
                value: value.to_string(),
            },
        }
    }

    pub fn instruction(pos: Pos, instruction: Instruction) -> Self {
        Statement {
            pos,
            stmt: Stmt::Instruction(instruction),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.stmt {
            Stmt::Label { name } => write!(f, "LABEL \"{}\"", name),
            Stmt::Directive { name, bind, value } => {
                write!(f, "DIRECTIVE {}", name)?;
                if let Some(bind) = bind {
                    write!(f, " {}", bind)?;
                }
                if !value.is_empty() {
                    write!(f, " \"{}\"", value.escape_debug())?;
                }
                Ok(())
            }
            Stmt::Instruction(instr) => {
                write!(f, "INSTR {}", instr.mnemonic)?;
                if !instr.operand1.is_empty() {
                    write!(f, " {}", instr.operand1)?;
                }
                if instr.has_second {
                    write!(f, ", {}", instr.operand2)?;
                }
                if instr.is_label_imm {
                    write!(f, " [label_imm]")?;
                }
                if instr.is_imm {
                    write!(f, " [imm]")?;
                }
                Ok(())
            }
        }
    }
}

/// Statements of one source, in order.
pub type Program = Vec<Statement>;
