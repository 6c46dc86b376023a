use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum Directive {
    #[strum(to_string = ".word")]
    Word,
    #[strum(to_string = ".define")]
    Define,
    #[strum(to_string = ".org")]
    Org,
    #[strum(to_string = ".space")]
    Space,
    #[strum(to_string = ".ascii")]
    Ascii,
    #[strum(to_string = ".asciiz")]
    Asciiz,
}

#[derive(Debug, Clone, Copy)]
pub struct DirectiveDef {
    pub directive: Directive,
    pub syntax: &'static str,
    pub description: &'static str,
}

#[rustfmt::skip]
pub static DIRECTIVES: &[DirectiveDef] = &[
    DirectiveDef { directive: Directive::Word, syntax: ".word value", description: "Emit a 16-bit word value" },
    DirectiveDef { directive: Directive::Define, syntax: ".define NAME value", description: "Define a symbolic constant" },
    DirectiveDef { directive: Directive::Org, syntax: ".org address", description: "Advance the location counter, padding with zeros" },
    DirectiveDef { directive: Directive::Space, syntax: ".space count", description: "Reserve zero-filled words" },
    DirectiveDef { directive: Directive::Ascii, syntax: ".ascii \"text\"", description: "Emit one word per character" },
    DirectiveDef { directive: Directive::Asciiz, syntax: ".asciiz \"text\"", description: "Emit one word per character plus a terminating zero" },
];

pub fn lookup_directive(name: &str) -> Option<&'static DirectiveDef> {
    let directive = name.trim().to_ascii_lowercase().parse::<Directive>().ok()?;
    DIRECTIVES.iter().find(|def| def.directive == directive)
}

#[test]
fn test() {
    assert_eq!(lookup_directive(".word").map(|d| d.directive), Some(Directive::Word));
    assert_eq!(lookup_directive(".ASCIIZ").map(|d| d.directive), Some(Directive::Asciiz));
    assert!(lookup_directive(".include").is_none());
    assert!(lookup_directive("word").is_none());
    assert_eq!(Directive::Space.to_string(), ".space");
}
