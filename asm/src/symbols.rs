use crate::error::Error;
use crate::util::{is_identifier, parse_number};
use indexmap::IndexMap;

/// Labels and `.define` constants, each with the line that bound it.
///
/// Bindings are write-once: a name may appear in at most one of the two
/// tables, once.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    labels: IndexMap<String, (usize, u16)>,
    defines: IndexMap<String, (usize, i64)>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    fn defined_at(&self, name: &str) -> Option<usize> {
        self.labels
            .get(name)
            .map(|(line, _)| *line)
            .or_else(|| self.defines.get(name).map(|(line, _)| *line))
    }

    fn check_unbound(&self, name: &str) -> Result<(), Error> {
        match self.defined_at(name) {
            Some(first) => Err(Error::RedefinedSymbol {
                name: name.to_string(),
                first,
            }),
            None => Ok(()),
        }
    }

    pub fn add_label(&mut self, name: &str, address: u16, line: usize) -> Result<(), Error> {
        self.check_unbound(name)?;
        self.labels.insert(name.to_string(), (line, address));
        Ok(())
    }

    pub fn add_define(&mut self, name: &str, value: i64, line: usize) -> Result<(), Error> {
        self.check_unbound(name)?;
        self.defines.insert(name.to_string(), (line, value));
        Ok(())
    }

    pub fn has_label(&self, name: &str) -> bool {
        self.labels.contains_key(name)
    }

    pub fn has_define(&self, name: &str) -> bool {
        self.defines.contains_key(name)
    }

    pub fn label_address(&self, name: &str) -> Result<u16, Error> {
        self.labels
            .get(name)
            .map(|(_, addr)| *addr)
            .ok_or_else(|| Error::UndefinedSymbol(name.to_string()))
    }

    pub fn define_value(&self, name: &str) -> Result<i64, Error> {
        self.defines
            .get(name)
            .map(|(_, val)| *val)
            .ok_or_else(|| Error::UndefinedSymbol(name.to_string()))
    }

    /// Value of a define, a label, or a numeric literal, in that order.
    /// A leading `#` or `=` is ignored.
    pub fn resolve(&self, text: &str) -> Result<i64, Error> {
        let text = text.trim();
        let text = text
            .strip_prefix('#')
            .or_else(|| text.strip_prefix('='))
            .unwrap_or(text)
            .trim();
        if let Some((_, val)) = self.defines.get(text) {
            return Ok(*val);
        }
        if let Some((_, addr)) = self.labels.get(text) {
            return Ok(*addr as i64);
        }
        match parse_number(text) {
            Ok(val) => Ok(val),
            Err(_) if is_identifier(text) => Err(Error::UndefinedSymbol(text.to_string())),
            Err(err) => Err(err),
        }
    }

    /// Labels in definition order as `(name, address, line)`.
    pub fn labels(&self) -> impl Iterator<Item = (&str, u16, usize)> {
        self.labels
            .iter()
            .map(|(name, (line, addr))| (name.as_str(), *addr, *line))
    }

    /// Defines in definition order as `(name, value, line)`.
    pub fn defines(&self) -> impl Iterator<Item = (&str, i64, usize)> {
        self.defines
            .iter()
            .map(|(name, (line, val))| (name.as_str(), *val, *line))
    }
}
