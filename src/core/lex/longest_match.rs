use {
    crate::core::{
        automaton::{TerminalId, TerminalRegistry, EOF},
        lex::{self, alphabet, LexicalError, Location, Token, TransitionTable},
    },
    std::collections::{HashSet, VecDeque},
};

/// Scanner: Pull-based longest-match scanner over a compiled transition table.
///
/// Each token is the longest prefix of the remaining input accepted by the table. Input read past
/// the end of that prefix while searching for a longer one is kept as lookahead and never re-read
/// from the source. Tokens whose kind is ignored are dropped silently, and once the input is
/// exhausted every request yields the same `EOF` token.
///
/// # Type Parameters
///
/// * `T` - the transition table driving the scan, e.g. `&Table` or `Arc<CompressedTable>`.
/// * `S` - the source of input chars.
pub struct Scanner<T: TransitionTable, S: Iterator<Item = char>> {
    table: T,
    source: S,
    lookahead: VecDeque<char>,
    ignored: HashSet<TerminalId>,
    current: Option<Token>,
    eof: Option<Token>,
    location: Location,
}

/// Scan-One Result: What a single pass from the initial state found.
enum ScanOneResult {
    Token(Token),
    Eof,
}

impl<T: TransitionTable, S: Iterator<Item = char>> Scanner<T, S> {
    pub fn new(table: T, source: S, ignored: &[TerminalId]) -> Result<Self, lex::Error> {
        let mut scanner = Scanner {
            table,
            source,
            lookahead: VecDeque::new(),
            ignored: HashSet::new(),
            current: None,
            eof: None,
            location: Location::start(),
        };

        for id in ignored {
            scanner.ignore(*id)?;
        }
        Ok(scanner)
    }

    /// Discards every later token of kind `id`. Tokens already peeked through `current` are kept.
    pub fn ignore(&mut self, id: TerminalId) -> Result<&mut Self, lex::Error> {
        if id == EOF {
            return Err(lex::Error::EofIgnoredErr);
        }
        if !self.table.terminals().contains(id) {
            return Err(lex::Error::TerminalIdErr(id));
        }

        self.ignored.insert(id);
        Ok(self)
    }

    pub fn ignore_named(&mut self, name: &str) -> Result<&mut Self, lex::Error> {
        let id = self.table.terminals().id(name)?;
        self.ignore(id)
    }

    pub fn is_ignored(&self, id: TerminalId) -> bool {
        self.ignored.contains(&id)
    }

    pub fn terminal_set(&self) -> &TerminalRegistry {
        self.table.terminals()
    }

    /// Returns the next token without consuming it.
    pub fn current(&mut self) -> Result<Token, lex::Error> {
        if let Some(ref token) = self.current {
            return Ok(token.clone());
        }

        let token = self.scan()?;
        self.current = Some(token.clone());
        Ok(token)
    }

    /// Consumes and returns the next token.
    pub fn advance(&mut self) -> Result<Token, lex::Error> {
        match self.current.take() {
            Some(token) => Ok(token),
            None => self.scan(),
        }
    }

    /// Discards the next char that has not yet been scanned into a token, returning it. Used to
    /// resynchronize after a lexical error.
    pub fn skip(&mut self) -> Option<char> {
        if self.eof.is_some() {
            return None;
        }

        let c = self.next_char()?;
        trace!("Skipped {:?} at {}", c, self.location);
        self.location = self.location.after(c);
        Some(c)
    }

    /// Consumes every remaining token, including the final `EOF`.
    pub fn scan_all(&mut self) -> Result<Vec<Token>, lex::Error> {
        let mut tokens: Vec<Token> = vec![];
        loop {
            let token = self.advance()?;
            let done = token.is_eof();
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn scan(&mut self) -> Result<Token, lex::Error> {
        loop {
            let token = match self.scan_one()? {
                ScanOneResult::Token(token) => token,
                ScanOneResult::Eof => {
                    let location = self.location;
                    let eof = self.eof.get_or_insert_with(|| Token::eof(location));
                    return Ok(eof.clone());
                }
            };

            if self.ignored.contains(&token.kind()) {
                trace!("Ignored {}", token.describe(self.table.terminals()));
                continue;
            }

            trace!(
                "Scanned {} at {}",
                token.describe(self.table.terminals()),
                token.location()
            );
            return Ok(token);
        }
    }

    /// Scans a single token from the head of the input by traversing the table until no
    /// transition exists, then keeps the input up to the most recently accepting state and
    /// returns the rest to the lookahead.
    fn scan_one(&mut self) -> Result<ScanOneResult, lex::Error> {
        if self.eof.is_some() {
            return Ok(ScanOneResult::Eof);
        }

        let mut state = self.table.initial();
        let mut buffer: Vec<char> = vec![];
        let mut last_accepting: Option<(usize, TerminalId)> = None;

        let found = loop {
            let c = match self.next_char() {
                Some(c) => c,
                None => break None,
            };

            let dest = alphabet::symbol_of(c).and_then(|symbol| self.table.next(state, symbol));
            match dest {
                Some(dest) => {
                    buffer.push(c);
                    state = dest;

                    // Remember the latest accepting state, so the scan can backtrack to it.
                    if let Some(kind) = self.table.accepts(dest) {
                        last_accepting = Some((buffer.len(), kind));
                    }
                }
                None => {
                    self.lookahead.push_front(c);
                    break Some(c);
                }
            }
        };

        match last_accepting {
            Some((consumed, kind)) => {
                for c in buffer.drain(consumed..).rev() {
                    self.lookahead.push_front(c);
                }

                let start = self.location;
                for c in &buffer {
                    self.location = self.location.after(*c);
                }

                Ok(ScanOneResult::Token(Token::new(
                    kind,
                    buffer.into_iter().collect(),
                    start,
                )))
            }
            None if buffer.is_empty() && found.is_none() => Ok(ScanOneResult::Eof),
            None => {
                // The partial match is dropped, the offending char stays in the lookahead.
                for c in &buffer {
                    self.location = self.location.after(*c);
                }

                let err = LexicalError::new(found, self.location, self.table.expected(state));
                trace!("{}", err);
                Err(lex::Error::from(err))
            }
        }
    }

    fn next_char(&mut self) -> Option<char> {
        match self.lookahead.pop_front() {
            Some(c) => Some(c),
            None => self.source.next(),
        }
    }
}
