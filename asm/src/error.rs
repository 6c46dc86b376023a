use std::fmt;
use thiserror::Error;

/// Coarse classification of every assembly failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Symbol,
    Range,
    Format,
    Origin,
    Syntax,
    Io,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Symbols
    #[error("Undefined symbol: `{0}`")]
    UndefinedSymbol(String),

    #[error("Re-defined symbol: `{name}` (already defined at line {first})")]
    RedefinedSymbol { name: String, first: usize },

    // Ranges
    #[error("Immediate value {value} out of range [{min}, {max}] for {context}")]
    ImmediateRange {
        value: i64,
        min: i64,
        max: i64,
        context: String,
    },

    #[error("Immediate with # must fit in {bits} bits, got: {value}. Use = for larger values")]
    NarrowImmediate { value: i64, bits: u8 },

    #[error("Branch target too far (offset {0} words)")]
    BranchRange(i64),

    #[error("Shift amount must be between 0 and 15, got: {0}")]
    ShiftRange(i64),

    #[error("{context} value {value} out of range [-32768, 65535]")]
    WordRange { value: i64, context: String },

    #[error("Address 0x{0:X} is outside the 16-bit address space")]
    AddressOverflow(i64),

    #[error("Image of {size} words does not fit in a memory of depth {depth}")]
    ImageTooLarge { size: usize, depth: usize },

    // Formats
    #[error("Unknown instruction: `{0}`")]
    UnknownInstruction(String),

    #[error("Invalid register name: `{0}`")]
    UnknownRegister(String),

    #[error("Unknown directive: `{0}`")]
    UnknownDirective(String),

    #[error("Cannot parse `{0}` as a number")]
    InvalidNumber(String),

    #[error("{0}")]
    OperandMismatch(String),

    // Origin
    #[error(".org address 0x{target:X} is less than current address 0x{current:X}")]
    OriginBackward { target: i64, current: u32 },

    // Front end
    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Failed to access `{0}`: {1}")]
    Io(String, String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        use Error::*;
        match self {
            UndefinedSymbol(_) | RedefinedSymbol { .. } => ErrorKind::Symbol,
            ImmediateRange { .. }
            | NarrowImmediate { .. }
            | BranchRange(_)
            | ShiftRange(_)
            | WordRange { .. }
            | AddressOverflow(_)
            | ImageTooLarge { .. } => ErrorKind::Range,
            UnknownInstruction(_)
            | UnknownRegister(_)
            | UnknownDirective(_)
            | InvalidNumber(_)
            | OperandMismatch(_) => ErrorKind::Format,
            OriginBackward { .. } => ErrorKind::Origin,
            Syntax(_) => ErrorKind::Syntax,
            Io(..) => ErrorKind::Io,
        }
    }

    /// Attach the statement position.
    pub fn at(self, line: usize, column: usize) -> AsmError {
        AsmError {
            error: self,
            line,
            column,
            hint: None,
        }
    }
}

/// An [`Error`] located in the source, with an optional operand-syntax hint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct AsmError {
    #[source]
    pub error: Error,
    pub line: usize,
    pub column: usize,
    pub hint: Option<String>,
}

impl AsmError {
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(f, "Error at line {}: {}", self.line, self.error)?;
        } else {
            write!(f, "{}", self.error)?;
        }
        if let Some(hint) = &self.hint {
            write!(f, "\n  {}", hint)?;
        }
        Ok(())
    }
}

pub type Result<T> = std::result::Result<T, AsmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_line_and_hint() {
        let err = Error::UnknownRegister("r9".to_string())
            .at(4, 5)
            .with_hint("Expected format: ld rX, [rY]");
        assert_eq!(
            err.to_string(),
            "Error at line 4: Invalid register name: `r9`\n  Expected format: ld rX, [rY]"
        );
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn kinds() {
        assert_eq!(Error::BranchRange(300).kind(), ErrorKind::Range);
        assert_eq!(
            Error::OriginBackward { target: 1, current: 2 }.kind(),
            ErrorKind::Origin
        );
        assert_eq!(Error::UndefinedSymbol("x".into()).kind(), ErrorKind::Symbol);
    }
}
