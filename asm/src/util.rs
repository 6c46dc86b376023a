use crate::error::Error;

/// Parse an integer literal: optional sign, then `0x`/`0X` hex, `0b`/`0B`
/// binary, a leading `0` for octal, or decimal.
pub fn parse_number(text: &str) -> Result<i64, Error> {
    let invalid = || Error::InvalidNumber(text.to_string());
    let s = text.trim();
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (radix, digits) = match s.get(..2) {
        Some("0x") | Some("0X") => (16, &s[2..]),
        Some("0b") | Some("0B") => (2, &s[2..]),
        _ if s.len() > 1 && s.starts_with('0') => (8, &s[1..]),
        _ => (10, s),
    };
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err(invalid());
    }
    let value = i64::from_str_radix(digits, radix).map_err(|_| invalid())?;
    Ok(if negative { -value } else { value })
}

/// Symbol names start with a letter, `_` or `.` and continue with
/// alphanumerics, `_` or `.`.
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '.' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        }
        _ => false,
    }
}

/// Content of a `"..."` literal with escapes processed; text without quotes
/// is returned unchanged.
pub fn unquote(text: &str) -> Result<String, Error> {
    let t = text.trim();
    if !t.starts_with('"') {
        return Ok(text.to_string());
    }
    let inner = match t.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
        Some(inner) if t.len() >= 2 => inner,
        _ => return Err(Error::Syntax(format!("unterminated string {}", t))),
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some(other) => return Err(Error::Syntax(format!("unknown escape `\\{}`", other))),
            None => return Err(Error::Syntax("dangling `\\` in string".to_string())),
        }
    }
    Ok(out)
}
