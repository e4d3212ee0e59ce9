// Generated by munch, do not edit.

pub static COLUMNS: usize = 5;

pub static INITIAL: usize = 0;

pub static TRANSITIONS: [i32; 25] = [
    -1, 1, 2, 2, 3, -1, 1, -1, -1, -1, -1, -1, 2, 2, 2, -1,
    -1, 2, 4, 2, -1, -1, 2, 2, 2,
];

pub static FINALS: [Option<usize>; 5] = [
    None, Some(3), Some(2), Some(2), Some(1),
];

pub static TERMINALS: [&str; 4] = [
    "EOF", "IF", "ID", "WS",
];

pub static SYMBOL_TO_COLUMN: [usize; 256] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 2, 2, 2, 2, 2, 3, 2, 2, 4, 2, 2, 2, 2, 2, 2,
    2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

pub fn table() -> Result<munch::CompressedTable, munch::TableError> {
    munch::CompressedTable::from_parts(
        COLUMNS,
        TRANSITIONS.to_vec(),
        FINALS.to_vec(),
        INITIAL,
        TERMINALS.iter().map(|name| name.to_string()).collect(),
        SYMBOL_TO_COLUMN.to_vec(),
    )
}
