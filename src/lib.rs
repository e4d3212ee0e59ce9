#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

use std::{error, fmt, str::Chars, sync::Arc};

pub use crate::core::{
    automaton::{
        AmbiguityPolicy, Automaton, BuildConfig, ConstructionError, Fragment, State, StateId,
        TerminalId, TerminalRegistry, UnknownTerminalError, EOF,
    },
    lex::{
        alphabet::{Symbol, SymbolRange, ALPHABET_SIZE},
        longest_match::Scanner,
        Error, LexicalError, Location, Token, TransitionTable,
    },
    description::{parse_class, Description, Error as DescriptionError, Options, Pattern},
    table::{CompressedTable, Error as TableError, Table, NO_TRANSITION},
};

mod core;

/// Lexicon: A token description compiled all the way to a scanner-ready table.
pub struct Lexicon {
    table: Arc<Table>,
    compressed: Option<Arc<CompressedTable>>,
    ignored: Vec<TerminalId>,
}

impl Lexicon {
    /// Parses a YAML token description and compiles it using the description's own options.
    pub fn build(description: &str) -> Result<Lexicon, BuildError> {
        Lexicon::from_description(&Description::parse(description)?)
    }

    pub fn from_description(description: &Description) -> Result<Lexicon, BuildError> {
        let nfa = description.build()?;

        let mut dfa = nfa.to_deterministic()?;
        if description.options.minimize {
            dfa = dfa.minimize()?;
        }

        let table = dfa.compile()?;
        let ignored = description.ignored_ids(table.terminals())?;
        let compressed = if description.options.compress {
            Some(Arc::new(table.compress()))
        } else {
            None
        };

        Ok(Lexicon {
            table: Arc::new(table),
            compressed,
            ignored,
        })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn compressed(&self) -> Option<&CompressedTable> {
        self.compressed.as_ref().map(|compressed| &**compressed)
    }

    pub fn terminals(&self) -> &TerminalRegistry {
        self.table.terminals()
    }

    pub fn ignored(&self) -> &[TerminalId] {
        &self.ignored
    }

    /// Returns a scanner over `text`, driven by the compressed table when there is one.
    pub fn scanner<'a>(
        &self,
        text: &'a str,
    ) -> Result<Scanner<Arc<dyn TransitionTable>, Chars<'a>>, Error> {
        let table: Arc<dyn TransitionTable> = match self.compressed {
            Some(ref compressed) => compressed.clone(),
            None => self.table.clone(),
        };
        Scanner::new(table, text.chars(), &self.ignored)
    }

    pub fn scan(&self, text: &str) -> Result<Vec<Token>, Error> {
        self.scanner(text)?.scan_all()
    }

    /// Serializes the table the scanners use.
    pub fn to_json(&self) -> Result<String, TableError> {
        match self.compressed {
            Some(ref compressed) => compressed.to_json(),
            None => self.table.to_json(),
        }
    }

    /// Emits Rust source for the table the scanners use.
    pub fn to_rust(&self) -> String {
        match self.compressed {
            Some(ref compressed) => compressed.to_rust(),
            None => self.table.to_rust(),
        }
    }
}

#[derive(Debug)]
pub enum BuildError {
    DescriptionErr(DescriptionError),
    ConstructionErr(ConstructionError),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            BuildError::DescriptionErr(ref err) => {
                write!(f, "Failed to load description: {}", err)
            }
            BuildError::ConstructionErr(ref err) => {
                write!(f, "Failed to compile description: {}", err)
            }
        }
    }
}

impl error::Error for BuildError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            BuildError::DescriptionErr(ref err) => Some(err),
            BuildError::ConstructionErr(ref err) => Some(err),
        }
    }
}

impl From<DescriptionError> for BuildError {
    fn from(err: DescriptionError) -> BuildError {
        BuildError::DescriptionErr(err)
    }
}

impl From<ConstructionError> for BuildError {
    fn from(err: ConstructionError) -> BuildError {
        BuildError::ConstructionErr(err)
    }
}
