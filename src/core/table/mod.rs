use {
    crate::core::{
        automaton::{
            terminal::EOF_NAME, Automaton, ConstructionError, StateId, TerminalId,
            TerminalRegistry, EOF,
        },
        lex::alphabet::{Symbol, ALPHABET_SIZE},
    },
    serde::{Deserialize, Serialize},
    std::{error, fmt},
};

pub use self::compress::CompressedTable;

pub mod codegen;
pub mod compress;

/// The cell value marking the absence of a transition.
pub const NO_TRANSITION: i32 = -1;

/// Table: A dense, row-major transition table compiled from a deterministic automaton.
///
/// # Fields
///
/// * `columns` - the number of input columns per row, `ALPHABET_SIZE` for dense tables.
/// * `transitions` - `states * columns` cells, each a destination state or `NO_TRANSITION`.
/// * `finals` - the terminal accepted by each state, if any.
/// * `initial` - the state every scan starts from.
/// * `terminals` - the names of the terminals referenced by `finals`.
#[derive(PartialEq, Clone, Debug, Serialize, Deserialize)]
pub struct Table {
    columns: usize,
    transitions: Vec<i32>,
    finals: Vec<Option<TerminalId>>,
    initial: StateId,
    terminals: TerminalRegistry,
}

impl Automaton {
    /// Flattens this deterministic automaton into a dense table with one column per symbol.
    pub fn compile(&self) -> Result<Table, ConstructionError> {
        if !self.is_deterministic() {
            return Err(ConstructionError::NotDeterministicErr);
        }

        let mut transitions: Vec<i32> = vec![NO_TRANSITION; self.len() * ALPHABET_SIZE];
        let mut finals: Vec<Option<TerminalId>> = Vec::with_capacity(self.len());

        for (id, state) in self.states().iter().enumerate() {
            let row = id * ALPHABET_SIZE;
            for (symbol, dest) in state.transitions() {
                transitions[row + symbol as usize] = dest as i32;
            }
            finals.push(if state.is_final() {
                state.terminal()
            } else {
                None
            });
        }

        debug!(
            "Compiled {} states into a {}x{} table",
            self.len(),
            self.len(),
            ALPHABET_SIZE
        );

        Ok(Table {
            columns: ALPHABET_SIZE,
            transitions,
            finals,
            initial: self.initial(),
            terminals: self.terminals().clone(),
        })
    }
}

impl Table {
    /// Assembles a table from its raw parts, validating every cross reference.
    pub fn from_parts(
        columns: usize,
        transitions: Vec<i32>,
        finals: Vec<Option<TerminalId>>,
        initial: StateId,
        terminals: Vec<String>,
    ) -> Result<Table, Error> {
        let table = Table {
            columns,
            transitions,
            finals,
            initial,
            terminals: TerminalRegistry::from(terminals),
        };
        table.validate()?;
        Ok(table)
    }

    pub fn from_json(json: &str) -> Result<Table, Error> {
        let table: Table = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn states(&self) -> usize {
        self.finals.len()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn initial(&self) -> StateId {
        self.initial
    }

    pub fn terminals(&self) -> &TerminalRegistry {
        &self.terminals
    }

    pub fn transitions(&self) -> &[i32] {
        &self.transitions
    }

    pub fn finals(&self) -> &[Option<TerminalId>] {
        &self.finals
    }

    pub fn row(&self, state: StateId) -> &[i32] {
        let start = state * self.columns;
        &self.transitions[start..start + self.columns]
    }

    pub fn cell(&self, state: StateId, column: usize) -> i32 {
        if state >= self.states() || column >= self.columns {
            return NO_TRANSITION;
        }
        self.transitions[state * self.columns + column]
    }

    /// Returns the destination of `state` on `column`, if there is one.
    pub fn destination(&self, state: StateId, column: usize) -> Option<StateId> {
        match self.cell(state, column) {
            NO_TRANSITION => None,
            dest => Some(dest as StateId),
        }
    }

    pub fn accepting(&self, state: StateId) -> Option<TerminalId> {
        self.finals.get(state).and_then(|terminal| *terminal)
    }

    /// Returns the columns on which `state` has a transition, in ascending order.
    pub fn live_columns(&self, state: StateId) -> Vec<usize> {
        if state >= self.states() {
            return Vec::new();
        }

        self.row(state)
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell != NO_TRANSITION)
            .map(|(column, _)| column)
            .collect()
    }

    pub(in crate::core::table) fn validate(&self) -> Result<(), Error> {
        if self.columns == 0 {
            return Err(Error::MalformedErr("table has no columns".to_string()));
        }
        if self.finals.is_empty() {
            return Err(Error::MalformedErr("table has no states".to_string()));
        }
        if self.transitions.len() != self.finals.len() * self.columns {
            return Err(Error::MalformedErr(format!(
                "expected {} transition cells for {} states and {} columns, found {}",
                self.finals.len() * self.columns,
                self.finals.len(),
                self.columns,
                self.transitions.len()
            )));
        }
        if self.initial >= self.states() {
            return Err(Error::MalformedErr(format!(
                "initial state {} is out of bounds",
                self.initial
            )));
        }
        if self.terminals.name(EOF) != Some(EOF_NAME) {
            return Err(Error::MalformedErr(
                "terminal names must start with EOF".to_string(),
            ));
        }

        for (i, cell) in self.transitions.iter().enumerate() {
            if *cell != NO_TRANSITION && (*cell < 0 || *cell as usize >= self.states()) {
                return Err(Error::MalformedErr(format!(
                    "state {} has an invalid transition to {} in column {}",
                    i / self.columns,
                    cell,
                    i % self.columns
                )));
            }
        }

        for (state, terminal) in self.finals.iter().enumerate() {
            if let Some(terminal) = terminal {
                if *terminal == EOF || !self.terminals.contains(*terminal) {
                    return Err(Error::MalformedErr(format!(
                        "state {} accepts unknown terminal {}",
                        state, terminal
                    )));
                }
            }
        }

        Ok(())
    }

    /// Returns the cells of `symbol`'s column, one per state. Symbols beyond the last column have
    /// no transitions.
    pub(in crate::core::table) fn column_cells(&self, symbol: Symbol) -> Vec<i32> {
        (0..self.states())
            .map(|state| self.cell(state, symbol as usize))
            .collect()
    }
}

#[derive(Debug)]
pub enum Error {
    MalformedErr(String),
    JsonErr(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MalformedErr(ref msg) => write!(f, "Malformed table: {}", msg),
            Error::JsonErr(ref err) => write!(f, "Failed to (de)serialize table: {}", err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::MalformedErr(_) => None,
            Error::JsonErr(ref err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::JsonErr(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identifiers() -> Table {
        let mut automaton = Automaton::new();
        automaton.add_terminal("IF", |a| a.string("if")).unwrap();
        automaton
            .add_terminal("ID", |a| {
                let letter = a.class(&[(b'a'..=b'z').into()])?;
                a.plus(letter)
            })
            .unwrap();
        automaton.to_deterministic().unwrap().compile().unwrap()
    }

    #[test]
    fn compile_dense() {
        //setup
        let table = identifiers();

        //exercise
        let after_i = table.destination(table.initial(), b'i' as usize).unwrap();
        let after_if = table.destination(after_i, b'f' as usize).unwrap();

        //verify
        assert_eq!(table.columns(), ALPHABET_SIZE);
        assert_eq!(table.transitions().len(), table.states() * ALPHABET_SIZE);
        assert_eq!(table.accepting(table.initial()), None);
        assert_eq!(table.accepting(after_i), Some(2));
        assert_eq!(table.accepting(after_if), Some(1));
        assert_eq!(table.destination(table.initial(), b'0' as usize), None);
        assert_eq!(table.cell(table.initial(), b'0' as usize), NO_TRANSITION);
        assert_eq!(table.live_columns(table.initial()).len(), 26);
    }

    #[test]
    fn compile_requires_deterministic() {
        //setup
        let mut automaton = Automaton::new();
        automaton.add_terminal("A", |a| a.literal(b'a')).unwrap();

        //exercise
        let res = automaton.compile();

        //verify
        assert_eq!(res.err().unwrap(), ConstructionError::NotDeterministicErr);
    }

    #[test]
    fn from_parts_validates() {
        //setup
        let names = vec!["EOF".to_string(), "A".to_string()];

        //exercise
        let ok = Table::from_parts(2, vec![1, -1, -1, -1], vec![None, Some(1)], 0, names.clone());
        let short = Table::from_parts(2, vec![1, -1, -1], vec![None, Some(1)], 0, names.clone());
        let dangling =
            Table::from_parts(2, vec![5, -1, -1, -1], vec![None, Some(1)], 0, names.clone());
        let unknown =
            Table::from_parts(2, vec![1, -1, -1, -1], vec![None, Some(4)], 0, names.clone());
        let initial = Table::from_parts(2, vec![1, -1, -1, -1], vec![None, Some(1)], 2, names);

        //verify
        assert_eq!(ok.unwrap().destination(0, 0), Some(1));
        assert_eq!(
            format!("{}", short.err().unwrap()),
            "Malformed table: expected 4 transition cells for 2 states and 2 columns, found 3"
        );
        assert_eq!(
            format!("{}", dangling.err().unwrap()),
            "Malformed table: state 0 has an invalid transition to 5 in column 0"
        );
        assert_eq!(
            format!("{}", unknown.err().unwrap()),
            "Malformed table: state 1 accepts unknown terminal 4"
        );
        assert_eq!(
            format!("{}", initial.err().unwrap()),
            "Malformed table: initial state 2 is out of bounds"
        );
    }

    #[test]
    fn json_round_trip() {
        //setup
        let table = identifiers();

        //exercise
        let json = table.to_json().unwrap();
        let parsed = Table::from_json(&json).unwrap();

        //verify
        assert_eq!(parsed, table);
        assert_eq!(parsed.terminals().id("ID"), Ok(2));
    }

    #[test]
    fn json_malformed() {
        //setup
        let json = r#"{"columns":1,"transitions":[3],"finals":[null],"initial":0,"terminals":["EOF"]}"#;

        //exercise
        let res = Table::from_json(json);
        let garbage = Table::from_json("{");

        //verify
        assert!(match res.err().unwrap() {
            Error::MalformedErr(_) => true,
            _ => false,
        });
        let err = garbage.err().unwrap();
        assert!(error::Error::source(&err).is_some());
    }
}
