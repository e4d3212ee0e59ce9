pub mod automaton;
pub mod data;
pub mod description;
pub mod lex;
pub mod table;
pub mod util;
