use crate::encoder::{data_words, Encoder, ADDRESS_LIMIT};
use crate::error::{Error, Result};
use crate::stmt::{Statement, Stmt};
use crate::symbols::SymbolTable;
use crate::util::parse_number;
use qcore::{lookup_directive, lookup_instruction, Directive};

/// Assembled memory image. `is_data[i]` tells whether `words[i]` came from a
/// directive rather than an instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Image {
    pub words: Vec<u16>,
    pub is_data: Vec<bool>,
}

impl Image {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// `(address, word, is_data)` in address order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, u16, bool)> + '_ {
        self.words
            .iter()
            .zip(&self.is_data)
            .enumerate()
            .map(|(addr, (word, data))| (addr as u16, *word, *data))
    }
}

/// Result of pass 1: every symbol bound and every word accounted for.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub symbols: SymbolTable,
    pub is_data: Vec<bool>,
}

impl Layout {
    pub fn size(&self) -> usize {
        self.is_data.len()
    }

    fn address(&self) -> u32 {
        self.is_data.len() as u32
    }

    fn reserve(&mut self, count: usize, data: bool, stmt: &Statement) -> Result<()> {
        let end = self.is_data.len() + count;
        if end > ADDRESS_LIMIT as usize {
            return Err(Error::AddressOverflow(end as i64).at(stmt.pos.line, stmt.pos.column));
        }
        self.is_data.resize(end, data);
        Ok(())
    }
}

/// Pass 1: bind labels and defines, size every statement.
pub fn first_pass(program: &[Statement]) -> Result<Layout> {
    let mut layout = Layout::default();
    for stmt in program {
        let (line, column) = (stmt.pos.line, stmt.pos.column);
        match &stmt.stmt {
            Stmt::Label { name } => {
                let address = layout.address();
                if address >= ADDRESS_LIMIT {
                    return Err(Error::AddressOverflow(address as i64).at(line, column));
                }
                layout
                    .symbols
                    .add_label(name, address as u16, line)
                    .map_err(|err| err.at(line, column))?;
            }
            Stmt::Directive { name, bind, value } => {
                let def = lookup_directive(name)
                    .ok_or_else(|| Error::UnknownDirective(name.clone()).at(line, column))?;
                match def.directive {
                    Directive::Define => {
                        let name = bind.as_deref().ok_or_else(|| {
                            Error::Syntax(".define requires a name and a value".to_string())
                                .at(line, column)
                        })?;
                        let value = define_value(&layout.symbols, value)
                            .map_err(|err| err.at(line, column))?;
                        layout
                            .symbols
                            .add_define(name, value, line)
                            .map_err(|err| err.at(line, column))?;
                    }
                    // The operand may name a label defined further down.
                    Directive::Word => layout.reserve(1, true, stmt)?,
                    directive => {
                        let address = layout.address();
                        let words = data_words(directive, value, &layout.symbols, address)
                            .map_err(|err| err.at(line, column))?;
                        layout.reserve(words.len(), true, stmt)?;
                    }
                }
            }
            Stmt::Instruction(instr) => {
                let def = lookup_instruction(&instr.mnemonic).ok_or_else(|| {
                    Error::UnknownInstruction(instr.mnemonic.clone()).at(line, column)
                })?;
                layout.reserve(def.size(instr.is_label_imm) as usize, false, stmt)?;
            }
        }
    }
    Ok(layout)
}

/// A literal, or the value of an earlier define.
fn define_value(symbols: &SymbolTable, text: &str) -> std::result::Result<i64, Error> {
    match parse_number(text) {
        Ok(value) => Ok(value),
        Err(err) => match symbols.define_value(text.trim()) {
            Ok(value) => Ok(value),
            Err(_) => Err(err),
        },
    }
}

/// Pass 2: encode every statement against the finished symbol table.
pub fn second_pass(program: &[Statement], layout: &Layout) -> Result<Image> {
    let mut encoder = Encoder::new(&layout.symbols);
    let mut words = Vec::with_capacity(layout.size());
    for stmt in program {
        words.extend(encoder.encode(stmt)?);
    }
    debug_assert_eq!(words.len(), layout.size(), "passes disagree on image size");
    Ok(Image {
        words,
        is_data: layout.is_data.clone(),
    })
}

/// Assemble a parsed program into a memory image.
pub fn assemble(program: &[Statement]) -> Result<Image> {
    let layout = first_pass(program)?;
    second_pass(program, &layout)
}
