use {
    crate::core::util::string_utils,
    std::{fmt, ops::RangeInclusive},
};

/// The number of distinct input symbols every automaton and table is defined over.
pub const ALPHABET_SIZE: usize = 256;

pub type Symbol = u8;

/// Returns the alphabet symbol for `c`, or `None` if `c` lies outside the alphabet.
pub fn symbol_of(c: char) -> Option<Symbol> {
    let value = c as u32;
    if (value as usize) < ALPHABET_SIZE {
        Some(value as Symbol)
    } else {
        None
    }
}

/// Symbol Range: An inclusive range of alphabet symbols, used by character classes and exclusions.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct SymbolRange {
    start: Symbol,
    end: Symbol,
}

impl SymbolRange {
    pub fn new(start: Symbol, end: Symbol) -> Self {
        SymbolRange { start, end }
    }

    pub fn single(symbol: Symbol) -> Self {
        SymbolRange::new(symbol, symbol)
    }

    pub fn start(&self) -> Symbol {
        self.start
    }

    pub fn end(&self) -> Symbol {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        self.start <= symbol && symbol <= self.end
    }

    pub fn symbols(&self) -> RangeInclusive<Symbol> {
        self.start..=self.end
    }
}

impl From<RangeInclusive<Symbol>> for SymbolRange {
    fn from(range: RangeInclusive<Symbol>) -> Self {
        SymbolRange::new(*range.start(), *range.end())
    }
}

impl fmt::Display for SymbolRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.start == self.end {
            write!(f, "'{}'", string_utils::escape_symbol(self.start))
        } else {
            write!(
                f,
                "'{}'-'{}'",
                string_utils::escape_symbol(self.start),
                string_utils::escape_symbol(self.end)
            )
        }
    }
}

/// Collapses `symbols` into the smallest list of maximal contiguous ranges.
pub fn collapse(symbols: &[Symbol]) -> Vec<SymbolRange> {
    let mut sorted = symbols.to_vec();
    sorted.sort();
    sorted.dedup();

    let mut ranges: Vec<SymbolRange> = Vec::new();
    for symbol in sorted {
        match ranges.last_mut() {
            Some(last) if last.end as usize + 1 == symbol as usize => last.end = symbol,
            _ => ranges.push(SymbolRange::single(symbol)),
        }
    }
    ranges
}

/// Renders `symbols` for diagnostics, e.g. `'0'-'9', 'a'`.
pub fn describe(symbols: &[Symbol]) -> String {
    collapse(symbols)
        .iter()
        .map(|range| range.to_string())
        .collect::<Vec<String>>()
        .join(", ")
}
