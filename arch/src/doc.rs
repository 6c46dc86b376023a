use crate::directive::DIRECTIVES;
use crate::op::{condition_text, Category, Format, INSTRUCTIONS};
use crate::reg::REGISTERS;
use std::fmt::Write;
use strum::IntoEnumIterator;

/// Markdown reference of the instruction, register and directive tables.
pub fn generate_reference() -> String {
    let mut doc = String::new();
    doc.push_str("# qCore Instruction Set Reference\n\n");
    doc.push_str("Auto-generated from instruction definitions.\n");

    for category in Category::iter() {
        let defs: Vec<_> = INSTRUCTIONS
            .iter()
            .filter(|def| def.category == category)
            .collect();
        if defs.is_empty() {
            continue;
        }
        let _ = writeln!(doc, "\n## {}\n", category);
        if category == Category::Branch {
            doc.push_str("| Mnemonic | Format | Condition | Description |\n");
            doc.push_str("|----------|--------|-----------|-------------|\n");
        } else {
            doc.push_str("| Mnemonic | Format | Description |\n");
            doc.push_str("|----------|--------|-------------|\n");
        }
        for def in defs {
            if def.format == Format::Branch {
                let _ = writeln!(
                    doc,
                    "| `{}` | {} | {} | {} |",
                    def.mnemonic,
                    def.format.syntax(),
                    condition_text(def.extra),
                    def.description
                );
            } else {
                let _ = writeln!(
                    doc,
                    "| `{}` | {} | {} |",
                    def.mnemonic,
                    def.format.syntax(),
                    def.description
                );
            }
        }
    }

    doc.push_str("\n## Registers\n\n");
    doc.push_str("| Name | Number | Description |\n");
    doc.push_str("|------|--------|-------------|\n");
    for reg in REGISTERS {
        let _ = writeln!(doc, "| `{}` | {} | {} |", reg.name, reg.reg.bits(), reg.description);
    }

    doc.push_str("\n## Directives\n\n");
    doc.push_str("| Directive | Syntax | Description |\n");
    doc.push_str("|-----------|--------|-------------|\n");
    for dir in DIRECTIVES {
        let _ = writeln!(doc, "| `{}` | `{}` | {} |", dir.directive, dir.syntax, dir.description);
    }

    doc
}

#[test]
fn test() {
    let doc = generate_reference();
    assert!(doc.starts_with("# qCore Instruction Set Reference"));
    assert!(doc.contains("## Shift/Rotate"));
    assert!(doc.contains("| `ld` | rX, [rY] | Load from memory |"));
    assert!(doc.contains("| `bne` | label | Z=0 | Branch if not equal (Z=0) |"));
    assert!(doc.contains("| `sp` | 5 | Stack Pointer (alias for r5) |"));
    assert!(doc.contains("| `.asciiz` |"));
    for def in INSTRUCTIONS {
        assert!(doc.contains(&format!("| `{}` |", def.mnemonic)), "{}", def.mnemonic);
    }
}
