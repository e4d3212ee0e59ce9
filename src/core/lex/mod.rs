use {
    crate::core::{
        automaton::{StateId, TerminalId, TerminalRegistry, UnknownTerminalError, EOF},
        lex::alphabet::{Symbol, ALPHABET_SIZE},
        table::{CompressedTable, Table},
        util::string_utils,
    },
    std::{error, fmt, sync::Arc},
};

pub mod alphabet;
pub mod longest_match;

/// Transition Table: The view of a compiled lexer that the scanner drives.
///
/// Implementations must be immutable so that one table can back any number of scanners.
pub trait TransitionTable: Send + Sync {
    fn initial(&self) -> StateId;
    fn next(&self, state: StateId, symbol: Symbol) -> Option<StateId>;
    fn accepts(&self, state: StateId) -> Option<TerminalId>;

    /// Returns every symbol on which `state` has a transition, in ascending order.
    fn expected(&self, state: StateId) -> Vec<Symbol>;
    fn terminals(&self) -> &TerminalRegistry;
}

impl TransitionTable for Table {
    fn initial(&self) -> StateId {
        Table::initial(self)
    }

    fn next(&self, state: StateId, symbol: Symbol) -> Option<StateId> {
        self.destination(state, symbol as usize)
    }

    fn accepts(&self, state: StateId) -> Option<TerminalId> {
        self.accepting(state)
    }

    fn expected(&self, state: StateId) -> Vec<Symbol> {
        self.live_columns(state)
            .into_iter()
            .filter(|column| *column < ALPHABET_SIZE)
            .map(|column| column as Symbol)
            .collect()
    }

    fn terminals(&self) -> &TerminalRegistry {
        Table::terminals(self)
    }
}

impl TransitionTable for CompressedTable {
    fn initial(&self) -> StateId {
        CompressedTable::initial(self)
    }

    fn next(&self, state: StateId, symbol: Symbol) -> Option<StateId> {
        self.destination(state, symbol)
    }

    fn accepts(&self, state: StateId) -> Option<TerminalId> {
        self.table().accepting(state)
    }

    fn expected(&self, state: StateId) -> Vec<Symbol> {
        self.live_symbols(state)
    }

    fn terminals(&self) -> &TerminalRegistry {
        CompressedTable::terminals(self)
    }
}

impl<'a, T: TransitionTable + ?Sized> TransitionTable for &'a T {
    fn initial(&self) -> StateId {
        (**self).initial()
    }

    fn next(&self, state: StateId, symbol: Symbol) -> Option<StateId> {
        (**self).next(state, symbol)
    }

    fn accepts(&self, state: StateId) -> Option<TerminalId> {
        (**self).accepts(state)
    }

    fn expected(&self, state: StateId) -> Vec<Symbol> {
        (**self).expected(state)
    }

    fn terminals(&self) -> &TerminalRegistry {
        (**self).terminals()
    }
}

impl<T: TransitionTable + ?Sized> TransitionTable for Arc<T> {
    fn initial(&self) -> StateId {
        (**self).initial()
    }

    fn next(&self, state: StateId, symbol: Symbol) -> Option<StateId> {
        (**self).next(state, symbol)
    }

    fn accepts(&self, state: StateId) -> Option<TerminalId> {
        (**self).accepts(state)
    }

    fn expected(&self, state: StateId) -> Vec<Symbol> {
        (**self).expected(state)
    }

    fn terminals(&self) -> &TerminalRegistry {
        (**self).terminals()
    }
}

/// Location: A 1-based line and column position in scanned text.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn start() -> Self {
        Location { line: 1, column: 1 }
    }

    /// Returns the location following `c`.
    pub fn after(self, c: char) -> Self {
        if c == '\n' {
            Location {
                line: self.line + 1,
                column: 1,
            }
        } else {
            Location {
                line: self.line,
                column: self.column + 1,
            }
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Location::start()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct Token {
    kind: TerminalId,
    lexeme: String,
    location: Location,
}

impl Token {
    pub fn new(kind: TerminalId, lexeme: String, location: Location) -> Self {
        Token {
            kind,
            lexeme,
            location,
        }
    }

    pub fn eof(location: Location) -> Self {
        Token::new(EOF, String::new(), location)
    }

    pub fn kind(&self) -> TerminalId {
        self.kind
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn is_eof(&self) -> bool {
        self.kind == EOF
    }

    pub fn lexeme_escaped(&self) -> String {
        string_utils::escape_lexeme(&self.lexeme)
    }

    /// Renders this token as `NAME <- 'lexeme'`, naming its kind through `terminals`.
    pub fn describe(&self, terminals: &TerminalRegistry) -> String {
        let lexeme_string = format!(" <- '{}'", self.lexeme_escaped());

        match terminals.name(self.kind) {
            None => format!("#{}{}", self.kind, lexeme_string),
            Some(name) => format!("{}{}", name, lexeme_string),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Error {
    LexicalErr(LexicalError),
    EofIgnoredErr,
    TerminalIdErr(TerminalId),
    UnknownTerminalErr(UnknownTerminalError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::LexicalErr(ref err) => write!(f, "{}", err),
            Error::EofIgnoredErr => write!(f, "The end of input cannot be ignored"),
            Error::TerminalIdErr(id) => write!(f, "No terminal has id {}", id),
            Error::UnknownTerminalErr(ref err) => write!(f, "{}", err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::LexicalErr(ref err) => Some(err),
            Error::UnknownTerminalErr(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<LexicalError> for Error {
    fn from(err: LexicalError) -> Error {
        Error::LexicalErr(err)
    }
}

impl From<UnknownTerminalError> for Error {
    fn from(err: UnknownTerminalError) -> Error {
        Error::UnknownTerminalErr(err)
    }
}

/// Lexical Error: No terminal accepts any non-empty prefix of the remaining input.
///
/// # Fields
///
/// * `found` - the char the scanner could not continue on, or `None` at the end of input.
/// * `location` - the location of `found` (or of the end of input).
/// * `expected` - the symbols that would have let the scan continue.
#[derive(Debug, PartialEq, Clone)]
pub struct LexicalError {
    found: Option<char>,
    location: Location,
    expected: Vec<Symbol>,
}

impl LexicalError {
    pub fn new(found: Option<char>, location: Location, expected: Vec<Symbol>) -> Self {
        LexicalError {
            found,
            location,
            expected,
        }
    }

    pub fn found(&self) -> Option<char> {
        self.found
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn expected(&self) -> &[Symbol] {
        &self.expected
    }
}

impl fmt::Display for LexicalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "No accepting tokens after ({},{}): ",
            self.location.line, self.location.column
        )?;

        match self.found.and_then(alphabet::symbol_of) {
            Some(symbol) => write!(f, "unexpected '{}'", string_utils::escape_symbol(symbol))?,
            None => match self.found {
                Some(c) => write!(f, "unexpected {:?} outside the lexer alphabet", c)?,
                None => write!(f, "unexpected end of input")?,
            },
        }

        if !self.expected.is_empty() {
            write!(f, ", expected one of {}", alphabet::describe(&self.expected))?;
        }
        Ok(())
    }
}

impl error::Error for LexicalError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        None
    }
}
