use crate::core::{
    automaton::TerminalId,
    table::{CompressedTable, Table},
};

static VALUES_PER_LINE: usize = 16;

static HEADER: &str = "// Generated by munch, do not edit.\n\n";

impl Table {
    /// Returns Rust source declaring this table's parts as statics, plus a `table()` function
    /// rebuilding the table through `munch::Table::from_parts`.
    pub fn to_rust(&self) -> String {
        let mut out = String::from(HEADER);
        emit_parts(&mut out, self);

        out.push_str("pub fn table() -> Result<munch::Table, munch::TableError> {\n");
        out.push_str("    munch::Table::from_parts(\n");
        out.push_str(FROM_PARTS_ARGS);
        out.push_str("    )\n}\n");
        out
    }
}

impl CompressedTable {
    /// Returns Rust source declaring this table's parts as statics, plus a `table()` function
    /// rebuilding the table through `munch::CompressedTable::from_parts`.
    pub fn to_rust(&self) -> String {
        let mut out = String::from(HEADER);
        emit_parts(&mut out, self.table());
        emit_array(
            &mut out,
            "SYMBOL_TO_COLUMN",
            "usize",
            self.symbol_to_column().iter().map(|column| column.to_string()),
        );

        out.push_str(
            "pub fn table() -> Result<munch::CompressedTable, munch::TableError> {\n",
        );
        out.push_str("    munch::CompressedTable::from_parts(\n");
        out.push_str(FROM_PARTS_ARGS);
        out.push_str("        SYMBOL_TO_COLUMN.to_vec(),\n");
        out.push_str("    )\n}\n");
        out
    }
}

static FROM_PARTS_ARGS: &str = "        COLUMNS,
        TRANSITIONS.to_vec(),
        FINALS.to_vec(),
        INITIAL,
        TERMINALS.iter().map(|name| name.to_string()).collect(),
";

fn emit_parts(out: &mut String, table: &Table) {
    out.push_str(&format!("pub static COLUMNS: usize = {};\n\n", table.columns()));
    out.push_str(&format!("pub static INITIAL: usize = {};\n\n", table.initial()));
    emit_array(
        out,
        "TRANSITIONS",
        "i32",
        table.transitions().iter().map(|cell| cell.to_string()),
    );
    emit_array(
        out,
        "FINALS",
        "Option<usize>",
        table.finals().iter().map(|terminal| final_literal(*terminal)),
    );
    emit_array(
        out,
        "TERMINALS",
        "&str",
        table.terminals().iter().map(|(_, name)| format!("{:?}", name)),
    );
}

fn final_literal(terminal: Option<TerminalId>) -> String {
    match terminal {
        None => "None".to_string(),
        Some(id) => format!("Some({})", id),
    }
}

fn emit_array<I>(out: &mut String, name: &str, kind: &str, values: I)
where
    I: Iterator<Item = String>,
{
    let values: Vec<String> = values.collect();

    out.push_str(&format!(
        "pub static {}: [{}; {}] = [\n",
        name,
        kind,
        values.len()
    ));
    for line in values.chunks(VALUES_PER_LINE) {
        out.push_str("    ");
        out.push_str(&line.join(", "));
        out.push_str(",\n");
    }
    out.push_str("];\n\n");
}

#[cfg(test)]
mod tests {
    use {super::*, crate::core::automaton::Automaton};

    fn keyword() -> Table {
        let mut automaton = Automaton::new();
        automaton.add_terminal("IF", |a| a.string("if")).unwrap();
        automaton.add_terminal("QUOTE\"", |a| a.literal(b'"')).unwrap();
        automaton.to_deterministic().unwrap().compile().unwrap()
    }

    #[test]
    fn emit_dense() {
        //setup
        let table = keyword();

        //exercise
        let source = table.to_rust();

        //verify
        assert!(source.starts_with(HEADER));
        assert!(source.contains("pub static COLUMNS: usize = 256;\n"));
        assert!(source.contains("pub static INITIAL: usize = 0;\n"));
        assert!(source.contains(&format!(
            "pub static TRANSITIONS: [i32; {}] = [\n",
            table.states() * 256
        )));
        assert!(source.contains(&format!(
            "pub static FINALS: [Option<usize>; {}] = [\n    None, ",
            table.states()
        )));
        assert!(source.contains(
            "pub static TERMINALS: [&str; 3] = [\n    \"EOF\", \"IF\", \"QUOTE\\\"\",\n];\n"
        ));
        assert!(source.contains("munch::Table::from_parts(\n"));
        assert!(!source.contains("SYMBOL_TO_COLUMN"));
    }

    #[test]
    fn emit_compressed() {
        //setup
        let compressed = keyword().compress();

        //exercise
        let source = compressed.to_rust();

        //verify
        assert!(source.contains(&format!(
            "pub static COLUMNS: usize = {};\n",
            compressed.columns()
        )));
        assert!(source.contains("pub static SYMBOL_TO_COLUMN: [usize; 256] = [\n"));
        assert!(source.contains("munch::CompressedTable::from_parts(\n"));
        assert!(source.contains("        SYMBOL_TO_COLUMN.to_vec(),\n"));
    }

    #[test]
    fn emitted_parts_rebuild_table() {
        //setup
        let compressed = keyword().compress();
        let table = compressed.table();

        //exercise
        let rebuilt = CompressedTable::from_parts(
            table.columns(),
            table.transitions().to_vec(),
            table.finals().to_vec(),
            table.initial(),
            table.terminals().iter().map(|(_, name)| name.to_string()).collect(),
            compressed.symbol_to_column().to_vec(),
        )
        .unwrap();

        //verify
        assert_eq!(rebuilt, compressed);
    }

    #[test]
    fn array_lines_wrap() {
        //setup
        let mut out = String::new();

        //exercise
        emit_array(&mut out, "XS", "u8", (0..20).map(|x: u8| x.to_string()));

        //verify
        assert_eq!(
            out,
            "pub static XS: [u8; 20] = [\n    \
             0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15,\n    \
             16, 17, 18, 19,\n];\n\n"
        );
    }
}
