use crate::error::AsmError;
use color_print::cprintln;

#[derive(Debug)]
pub enum Msg {
    Error(String),
    Note(String),
}

impl Msg {
    pub fn print(&self) {
        match self {
            Msg::Error(msg) => cprintln!("<red,bold>error</>: {}", msg),
            Msg::Note(msg) => cprintln!("<green,bold>note</>: {}", msg),
        }
    }

    /// Print with a `-->` pointer and the offending source line.
    pub fn diag(&self, file: &str, line: usize, column: usize, raw: &str) {
        self.print();
        cprintln!("     <blue>--></> <underline>{}:{}:{}</>", file, line, column);
        cprintln!("      <blue>|</>");
        cprintln!(" <blue>{:>4} |</> {}", line, raw);
        cprintln!("      <blue>|</> {}<red,bold>^</>", " ".repeat(column.saturating_sub(1)));
    }
}

/// Render an assembly error against the source it came from.
pub fn report(file: &str, source: &str, err: &AsmError) {
    let msg = Msg::Error(err.error.to_string());
    match source.lines().nth(err.line.wrapping_sub(1)) {
        Some(raw) if err.line > 0 => msg.diag(file, err.line, err.column.max(1), raw),
        _ => msg.print(),
    }
    if let Some(hint) = &err.hint {
        Msg::Note(hint.clone()).print();
    }
}
