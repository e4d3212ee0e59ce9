use crate::core::lex::alphabet::Symbol;

/// Returns the char denoted by the backslash escape `\c`, i.e. \n, \t, \r and \0 map to
/// "newline", "tab", "carriage return" and "null" characters, and any other escaped char stands
/// for itself.
pub fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '0' => '\0',
        _ => c,
    }
}

/// Returns a printable rendering of `symbol`, escaping control characters, quotes and
/// backslashes.
pub fn escape_symbol(symbol: Symbol) -> String {
    match symbol {
        b'\n' => "\\n".to_string(),
        b'\t' => "\\t".to_string(),
        b'\r' => "\\r".to_string(),
        0 => "\\0".to_string(),
        b'\\' => "\\\\".to_string(),
        b'\'' => "\\'".to_string(),
        0x20..=0x7e => (symbol as char).to_string(),
        _ => format!("\\x{:02x}", symbol),
    }
}

/// Returns `lexeme` with newlines, tabs and carriage returns escaped, for single-line display.
pub fn escape_lexeme(lexeme: &str) -> String {
    lexeme
        .replace('\n', "\\n")
        .replace('\t', "\\t")
        .replace('\r', "\\r")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescape_known() {
        //exercise/verify
        assert_eq!(unescape('n'), '\n');
        assert_eq!(unescape('t'), '\t');
        assert_eq!(unescape('0'), '\0');
        assert_eq!(unescape('-'), '-');
        assert_eq!(unescape('\\'), '\\');
    }

    #[test]
    fn escape_symbol_printable() {
        //exercise/verify
        assert_eq!(escape_symbol(b'a'), "a");
        assert_eq!(escape_symbol(b' '), " ");
        assert_eq!(escape_symbol(b'\n'), "\\n");
        assert_eq!(escape_symbol(b'\''), "\\'");
        assert_eq!(escape_symbol(b'\\'), "\\\\");
        assert_eq!(escape_symbol(0x7f), "\\x7f");
        assert_eq!(escape_symbol(0xe9), "\\xe9");
    }

    #[test]
    fn escape_lexeme_whitespace() {
        //exercise
        let res = escape_lexeme("a\tb\r\nc");

        //verify
        assert_eq!(res, "a\\tb\\r\\nc");
    }
}
