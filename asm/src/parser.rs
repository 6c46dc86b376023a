use crate::error::{AsmError, Error};
use crate::stmt::{Instruction, Pos, Program, Statement};
use crate::util::{is_identifier, unquote};
use qcore::{lookup_directive, Directive};

/// Parse a whole source file. Errors from every line are collected before
/// giving up.
pub fn parse(source: &str) -> Result<Program, Vec<AsmError>> {
    let mut program = Program::new();
    let mut errors = vec![];
    for (idx, raw) in source.lines().enumerate() {
        match parse_line(idx + 1, raw) {
            Ok(stmts) => program.extend(stmts),
            Err(err) => errors.push(err),
        }
    }
    if errors.is_empty() {
        Ok(program)
    } else {
        Err(errors)
    }
}

/// Code part of a line: everything before `;` or `//` outside a string.
pub fn strip_comment(raw: &str) -> &str {
    let bytes = raw.as_bytes();
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b';' => return &raw[..i],
            b'/' if bytes.get(i + 1) == Some(&b'/') => return &raw[..i],
            _ => {}
        }
    }
    raw
}

/// Text with leading blanks removed, and the 1-based column it starts at.
fn skip_blank(text: &str, column: usize) -> (&str, usize) {
    let trimmed = text.trim_start();
    (trimmed, column + (text.len() - trimmed.len()))
}

fn split_word(text: &str) -> (&str, &str) {
    match text.find(char::is_whitespace) {
        Some(i) => (&text[..i], text[i..].trim()),
        None => (text, ""),
    }
}

pub fn parse_line(line: usize, raw: &str) -> Result<Vec<Statement>, AsmError> {
    let mut stmts = vec![];
    let (mut rest, mut column) = skip_blank(strip_comment(raw).trim_end(), 1);

    // name: [name: ...] [statement]
    while let Some(colon) = rest.find(':') {
        let name = &rest[..colon];
        if !is_identifier(name) {
            break;
        }
        stmts.push(Statement::label(Pos::new(line, column), name));
        (rest, column) = skip_blank(&rest[colon + 1..], column + colon + 1);
    }

    if rest.is_empty() {
        return Ok(stmts);
    }
    let pos = Pos::new(line, column);
    let stmt = if rest.starts_with('.') {
        parse_directive(pos, rest)?
    } else {
        parse_instruction(pos, rest)?
    };
    stmts.push(stmt);
    Ok(stmts)
}

fn parse_directive(pos: Pos, text: &str) -> Result<Statement, AsmError> {
    let (name, value) = split_word(text);
    let name = name.to_ascii_lowercase();
    let err = |e: Error| e.at(pos.line, pos.column);
    let def = lookup_directive(&name)
        .ok_or_else(|| err(Error::UnknownDirective(name.clone())))?;
    let incomplete = || {
        let msg = format!("incomplete `{}`, expected `{}`", name, def.syntax);
        err(Error::Syntax(msg))
    };
    if value.is_empty() {
        return Err(incomplete());
    }
    match def.directive {
        Directive::Define => {
            let (bind, value) = split_word(value);
            if value.is_empty() || !is_identifier(bind) {
                return Err(incomplete());
            }
            Ok(Statement::directive(pos, &name, Some(bind), value))
        }
        Directive::Ascii | Directive::Asciiz => {
            if !value.starts_with('"') {
                return Err(err(Error::Syntax(format!("`{}` expects a quoted string", name))));
            }
            unquote(value).map_err(err)?;
            Ok(Statement::directive(pos, &name, None, value))
        }
        _ => Ok(Statement::directive(pos, &name, None, value)),
    }
}

fn parse_instruction(pos: Pos, text: &str) -> Result<Statement, AsmError> {
    let err = |e: Error| e.at(pos.line, pos.column);
    let (mnemonic, operands) = split_word(text);
    if !mnemonic.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(err(Error::Syntax(format!("unexpected `{}`", mnemonic))));
    }
    let mnemonic = mnemonic.to_ascii_lowercase();
    let mut parts = operands.split(',');
    let op1 = parts.next().unwrap_or("").trim();
    let op2 = parts.next().map(str::trim);
    if parts.next().is_some() {
        return Err(err(Error::Syntax(format!("too many operands for `{}`", mnemonic))));
    }
    if op1.is_empty() && op2.is_some() {
        return Err(err(Error::Syntax("missing operand before `,`".to_string())));
    }
    if let Some(op2) = op2 {
        if op2.is_empty() || op2 == "#" || op2 == "=" {
            let msg = format!("missing operand after `,` in `{}`", mnemonic);
            return Err(err(Error::Syntax(msg)));
        }
    }
    Ok(Statement::instruction(pos, Instruction::new(&mnemonic, op1, op2)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::stmt::Stmt;

    fn one(raw: &str) -> Stmt {
        let mut stmts = parse_line(1, raw).unwrap();
        assert_eq!(stmts.len(), 1, "{}", raw);
        stmts.remove(0).stmt
    }

    #[test]
    fn comments() {
        assert_eq!(strip_comment("add r0, r1 ; note"), "add r0, r1 ");
        assert_eq!(strip_comment("add r0, r1 // note"), "add r0, r1 ");
        assert_eq!(strip_comment(".ascii \"a;b//c\" ; x"), ".ascii \"a;b//c\" ");
        assert_eq!(strip_comment(".ascii \"q\\\";\""), ".ascii \"q\\\";\"");
        assert!(parse_line(1, "   ; only a comment").unwrap().is_empty());
    }

    #[test]
    fn instructions() {
        let Stmt::Instruction(i) = one("  MV r0, =0x1234") else { panic!() };
        assert_eq!(i.mnemonic, "mv");
        assert_eq!(i.operand1, "r0");
        assert_eq!(i.operand2, "0x1234");
        assert!(i.is_label_imm && !i.is_imm && i.has_second);

        let Stmt::Instruction(i) = one("ld r1, [sp]") else { panic!() };
        assert_eq!(i.operand2, "[sp]");
        assert!(!i.is_imm && !i.is_label_imm);

        let Stmt::Instruction(i) = one("add r1,#-3") else { panic!() };
        assert_eq!(i.operand2, "-3");
        assert!(i.is_imm);

        let Stmt::Instruction(i) = one("halt") else { panic!() };
        assert!(i.operand1.is_empty() && !i.has_second);
    }

    #[test]
    fn labels() {
        let stmts = parse_line(3, "loop: sub r0, #1").unwrap();
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0].stmt, Stmt::Label { name: "loop".to_string() });
        assert_eq!(stmts[0].pos, Pos::new(3, 1));
        assert_eq!(stmts[1].pos, Pos::new(3, 7));

        let stmts = parse_line(1, "a: b:").unwrap();
        assert_eq!(stmts.len(), 2);
    }

    #[test]
    fn directives() {
        assert_eq!(
            one(".define SIZE 0x10"),
            Stmt::Directive {
                name: ".define".to_string(),
                bind: Some("SIZE".to_string()),
                value: "0x10".to_string(),
            }
        );
        let stmts = parse_line(1, "msg: .asciiz \"hi; there\"").unwrap();
        assert_eq!(stmts[1].stmt, one(".asciiz \"hi; there\""));
        let Stmt::Directive { name, value, .. } = one(".WORD -1") else { panic!() };
        assert_eq!((name.as_str(), value.as_str()), (".word", "-1"));
    }

    #[test]
    fn errors_are_collected() {
        let source = "add r0, r1, r2\n.define X\nok: halt\n.bogus 1\n.ascii \"open\n";
        let errs = parse(source).unwrap_err();
        let lines: Vec<usize> = errs.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![1, 2, 4, 5]);
        assert_eq!(errs[0].kind(), ErrorKind::Syntax);
        assert_eq!(errs[2].kind(), ErrorKind::Format);
    }

    #[test]
    fn missing_operands() {
        assert!(parse_line(1, "add r0,").is_err());
        assert!(parse_line(1, "add r0, #").is_err());
        assert!(parse_line(1, "add , r1").is_err());
        assert!(parse_line(1, ".word").is_err());
    }
}
