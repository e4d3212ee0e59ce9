pub mod state_set;
