use {
    crate::core::{
        automaton::{Automaton, ConstructionError, TerminalId, EOF},
        lex::{
            alphabet::{self, Symbol, SymbolRange},
            longest_match::Scanner,
        },
        description::Error,
        table::CompressedTable,
        util::string_utils,
    },
    std::str::Chars,
};

const RANGE: TerminalId = 1;
const ESCAPE: TerminalId = 2;
const CHAR: TerminalId = 3;

lazy_static! {
    static ref CLASS_TABLE: CompressedTable =
        build_class_table().expect("character class lexer failed to build");
}

fn build_class_table() -> Result<CompressedTable, ConstructionError> {
    let mut automaton = Automaton::new();

    automaton.add_macro("item", |a| {
        let backslash = a.literal(b'\\')?;
        let escaped = a.any()?;
        let escape = a.append(backslash, escaped)?;
        let plain = a.exclude(&[SymbolRange::single(b'\\')])?;
        a.alternate(&[escape, plain])
    })?;

    automaton.add_terminal("RANGE", |a| {
        let start = a.instantiate("item")?;
        let dash = a.literal(b'-')?;
        let end = a.instantiate("item")?;
        a.sequence(&[start, dash, end])
    })?;
    automaton.add_terminal("ESCAPE", |a| {
        let backslash = a.literal(b'\\')?;
        let escaped = a.any()?;
        a.append(backslash, escaped)
    })?;
    automaton.add_terminal("CHAR", |a| a.exclude(&[SymbolRange::single(b'\\')]))?;

    Ok(automaton.to_deterministic()?.compile()?.compress())
}

/// Parses a character class such as `a-z_0-9\n` into the ranges it covers.
///
/// `x-y` denotes an inclusive range, a backslash escapes the char after it (`\n`, `\t`, `\r` and
/// `\0` denote control chars), and every other char stands for itself. A `-` that does not sit
/// between two items is literal.
pub fn parse_class(class: &str) -> Result<Vec<SymbolRange>, Error> {
    let mut scanner = Scanner::new(&*CLASS_TABLE, class.chars(), &[])?;
    let mut ranges: Vec<SymbolRange> = vec![];

    loop {
        let token = scanner.advance()?;
        let mut chars = token.lexeme().chars();

        match token.kind() {
            EOF => return Ok(ranges),
            RANGE => {
                let start = item(&mut chars, class)?;
                chars.next();
                let end = item(&mut chars, class)?;

                let range = SymbolRange::new(start, end);
                if range.is_empty() {
                    return Err(Error::FormatErr(format!(
                        "Empty range '{}' in character class \"{}\"",
                        token.lexeme(),
                        class
                    )));
                }
                ranges.push(range);
            }
            ESCAPE | CHAR => ranges.push(SymbolRange::single(item(&mut chars, class)?)),
            kind => {
                return Err(Error::FormatErr(format!(
                    "Unexpected class token {} in \"{}\"",
                    kind, class
                )))
            }
        }
    }
}

fn item(chars: &mut Chars, class: &str) -> Result<Symbol, Error> {
    let c = match chars.next() {
        Some('\\') => chars.next().map(string_utils::unescape),
        c => c,
    };

    c.and_then(alphabet::symbol_of).ok_or_else(|| {
        Error::FormatErr(format!("Truncated character class \"{}\"", class))
    })
}

#[cfg(test)]
mod tests {
    use {super::*, crate::core::lex};

    fn parse(class: &str) -> String {
        let ranges = parse_class(class).unwrap();
        ranges
            .iter()
            .map(|range| range.to_string())
            .collect::<Vec<String>>()
            .join(" ")
    }

    #[test]
    fn class_terminal_ids() {
        //exercise/verify
        assert_eq!(CLASS_TABLE.terminals().id("RANGE"), Ok(RANGE));
        assert_eq!(CLASS_TABLE.terminals().id("ESCAPE"), Ok(ESCAPE));
        assert_eq!(CLASS_TABLE.terminals().id("CHAR"), Ok(CHAR));
    }

    #[test]
    fn parse_class_ranges() {
        //exercise/verify
        assert_eq!(parse("a-z"), "'a'-'z'");
        assert_eq!(parse("a-zA-Z_"), "'a'-'z' 'A'-'Z' '_'");
        assert_eq!(parse("0-9."), "'0'-'9' '.'");
    }

    #[test]
    fn parse_class_escapes() {
        //exercise/verify
        assert_eq!(parse(" \\t\\n"), "' ' '\\t' '\\n'");
        assert_eq!(parse("\\\\"), "'\\\\'");
        assert_eq!(parse("\\-"), "'-'");
        assert_eq!(parse("\\0-\\x"), "'\\0'-'x'");
    }

    #[test]
    fn parse_class_literal_dash() {
        //exercise/verify
        assert_eq!(parse("-"), "'-'");
        assert_eq!(parse("a-"), "'a' '-'");
        assert_eq!(parse("+-"), "'+' '-'");
    }

    #[test]
    fn parse_class_empty() {
        //exercise/verify
        assert!(parse_class("").unwrap().is_empty());
    }

    #[test]
    fn parse_class_reversed() {
        //exercise
        let res = parse_class("z-a");

        //verify
        assert_eq!(
            format!("{}", res.err().unwrap()),
            "Malformed description: Empty range 'z-a' in character class \"z-a\""
        );
    }

    #[test]
    fn parse_class_dangling_escape() {
        //exercise
        let res = parse_class("ab\\");

        //verify
        match res.err().unwrap() {
            Error::ClassErr(lex::Error::LexicalErr(err)) => assert_eq!(err.found(), None),
            err => panic!("unexpected error: {}", err),
        }
    }

    #[test]
    fn parse_class_outside_alphabet() {
        //exercise
        let res = parse_class("aλ");

        //verify
        match res.err().unwrap() {
            Error::ClassErr(lex::Error::LexicalErr(err)) => assert_eq!(err.found(), Some('λ')),
            err => panic!("unexpected error: {}", err),
        }
    }
}
