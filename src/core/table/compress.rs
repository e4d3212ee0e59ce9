use {
    crate::core::{
        automaton::{StateId, TerminalId, TerminalRegistry},
        lex::alphabet::{Symbol, ALPHABET_SIZE},
        table::{Error, Table},
    },
    serde::{Deserialize, Serialize},
    std::collections::HashMap,
};

/// Compressed Table: A table whose columns are equivalence classes of symbols rather than
/// individual symbols. Two symbols share a column iff every state moves identically on both.
///
/// # Fields
///
/// * `table` - the transition table over compressed columns.
/// * `symbol_to_column` - the column of every alphabet symbol.
/// * `column_to_symbols` - the symbols merged into each column, in ascending order.
#[derive(PartialEq, Clone, Debug, Serialize, Deserialize)]
pub struct CompressedTable {
    table: Table,
    symbol_to_column: Vec<usize>,
    #[serde(skip)]
    column_to_symbols: Vec<Vec<Symbol>>,
}

impl Table {
    /// Merges identical columns, assigning compressed columns left to right in order of each
    /// column's first (representative) symbol. Scanning through the result behaves exactly like
    /// scanning through this table.
    pub fn compress(&self) -> CompressedTable {
        let mut classes: HashMap<Vec<i32>, usize> = HashMap::new();
        let mut representatives: Vec<Vec<i32>> = Vec::new();
        let mut symbol_to_column: Vec<usize> = Vec::with_capacity(ALPHABET_SIZE);

        for symbol in 0..ALPHABET_SIZE {
            let cells = self.column_cells(symbol as Symbol);
            let column = match classes.get(&cells) {
                Some(column) => *column,
                None => {
                    let column = representatives.len();
                    classes.insert(cells.clone(), column);
                    representatives.push(cells);
                    column
                }
            };
            symbol_to_column.push(column);
        }

        let columns = representatives.len();
        let mut transitions: Vec<i32> = Vec::with_capacity(self.states() * columns);
        for state in 0..self.states() {
            for cells in &representatives {
                transitions.push(cells[state]);
            }
        }

        debug!(
            "Compressed {} columns into {} ({} states)",
            self.columns(),
            columns,
            self.states()
        );

        CompressedTable::assemble(
            Table {
                columns,
                transitions,
                finals: self.finals.clone(),
                initial: self.initial,
                terminals: self.terminals.clone(),
            },
            symbol_to_column,
        )
    }
}

impl CompressedTable {
    fn assemble(table: Table, symbol_to_column: Vec<usize>) -> Self {
        let mut column_to_symbols: Vec<Vec<Symbol>> = vec![Vec::new(); table.columns()];
        for (symbol, column) in symbol_to_column.iter().enumerate() {
            if let Some(symbols) = column_to_symbols.get_mut(*column) {
                symbols.push(symbol as Symbol);
            }
        }

        CompressedTable {
            table,
            symbol_to_column,
            column_to_symbols,
        }
    }

    /// Assembles a compressed table from its raw parts, validating every cross reference.
    pub fn from_parts(
        columns: usize,
        transitions: Vec<i32>,
        finals: Vec<Option<TerminalId>>,
        initial: StateId,
        terminals: Vec<String>,
        symbol_to_column: Vec<usize>,
    ) -> Result<CompressedTable, Error> {
        let table = Table::from_parts(columns, transitions, finals, initial, terminals)?;
        let compressed = CompressedTable::assemble(table, symbol_to_column);
        compressed.validate()?;
        Ok(compressed)
    }

    pub fn from_json(json: &str) -> Result<CompressedTable, Error> {
        let parsed: CompressedTable = serde_json::from_str(json)?;
        parsed.table.validate()?;

        let compressed = CompressedTable::assemble(parsed.table, parsed.symbol_to_column);
        compressed.validate()?;
        Ok(compressed)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn symbol_to_column(&self) -> &[usize] {
        &self.symbol_to_column
    }

    pub fn column_to_symbols(&self) -> &[Vec<Symbol>] {
        &self.column_to_symbols
    }

    pub fn column_of(&self, symbol: Symbol) -> usize {
        self.symbol_to_column[symbol as usize]
    }

    pub fn symbols_of(&self, column: usize) -> &[Symbol] {
        self.column_to_symbols
            .get(column)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn states(&self) -> usize {
        self.table.states()
    }

    pub fn columns(&self) -> usize {
        self.table.columns()
    }

    pub fn initial(&self) -> StateId {
        self.table.initial()
    }

    pub fn terminals(&self) -> &TerminalRegistry {
        self.table.terminals()
    }

    /// Returns the destination of `state` on `symbol`, if there is one.
    pub fn destination(&self, state: StateId, symbol: Symbol) -> Option<StateId> {
        self.table.destination(state, self.column_of(symbol))
    }

    /// Returns every symbol on which `state` has a transition, in ascending order.
    pub fn live_symbols(&self, state: StateId) -> Vec<Symbol> {
        let mut symbols: Vec<Symbol> = self
            .table
            .live_columns(state)
            .into_iter()
            .flat_map(|column| self.symbols_of(column).to_vec())
            .collect();
        symbols.sort();
        symbols
    }

    fn validate(&self) -> Result<(), Error> {
        if self.symbol_to_column.len() != ALPHABET_SIZE {
            return Err(Error::MalformedErr(format!(
                "expected {} symbol columns, found {}",
                ALPHABET_SIZE,
                self.symbol_to_column.len()
            )));
        }

        if let Some(symbol) = self
            .symbol_to_column
            .iter()
            .position(|column| *column >= self.table.columns())
        {
            return Err(Error::MalformedErr(format!(
                "symbol {} maps to missing column {}",
                symbol, self.symbol_to_column[symbol]
            )));
        }

        if let Some(column) = self
            .column_to_symbols
            .iter()
            .position(|symbols| symbols.is_empty())
        {
            return Err(Error::MalformedErr(format!(
                "column {} has no symbols",
                column
            )));
        }

        Ok(())
    }
}
