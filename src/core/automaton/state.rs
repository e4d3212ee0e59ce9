use {
    crate::core::{automaton::terminal::TerminalId, lex::alphabet::Symbol},
    std::collections::{BTreeMap, BTreeSet},
};

pub type StateId = usize;

/// State: A single node of an automaton's state graph.
///
/// Every state has at most one target per symbol. Non-determinism on a symbol is expressed by
/// routing that symbol through an intermediate state with epsilon edges (see
/// `Automaton::add_transition`).
#[derive(PartialEq, Clone, Debug, Default)]
pub struct State {
    is_final: bool,
    terminal: Option<TerminalId>,
    transitions: BTreeMap<Symbol, StateId>,
    epsilon: BTreeSet<StateId>,
}

impl State {
    pub fn new() -> Self {
        State::default()
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn terminal(&self) -> Option<TerminalId> {
        self.terminal
    }

    pub fn transition(&self, symbol: Symbol) -> Option<StateId> {
        self.transitions.get(&symbol).cloned()
    }

    pub fn transitions(&self) -> impl Iterator<Item = (Symbol, StateId)> + '_ {
        self.transitions.iter().map(|(symbol, dest)| (*symbol, *dest))
    }

    pub fn epsilon(&self) -> impl Iterator<Item = StateId> + '_ {
        self.epsilon.iter().cloned()
    }

    pub fn has_epsilon(&self) -> bool {
        !self.epsilon.is_empty()
    }

    pub(in crate::core::automaton) fn mark_final(&mut self, terminal: Option<TerminalId>) {
        self.is_final = true;
        self.terminal = terminal;
    }

    /// Sets the target for `symbol`, returning the previous target if there was one.
    pub(in crate::core::automaton) fn set_transition(
        &mut self,
        symbol: Symbol,
        dest: StateId,
    ) -> Option<StateId> {
        self.transitions.insert(symbol, dest)
    }

    pub(in crate::core::automaton) fn add_epsilon(&mut self, dest: StateId) {
        self.epsilon.insert(dest);
    }

    /// Returns a copy of this state with every referenced state id passed through `map`.
    pub(in crate::core::automaton) fn remapped(&self, map: impl Fn(StateId) -> StateId) -> State {
        self.restricted(|dest| Some(map(dest)))
    }

    /// Returns a copy of this state with every referenced state id passed through `map`, dropping
    /// the edges `map` rejects.
    pub(in crate::core::automaton) fn restricted(
        &self,
        map: impl Fn(StateId) -> Option<StateId>,
    ) -> State {
        State {
            is_final: self.is_final,
            terminal: self.terminal,
            transitions: self
                .transitions
                .iter()
                .filter_map(|(symbol, dest)| map(*dest).map(|dest| (*symbol, dest)))
                .collect(),
            epsilon: self.epsilon.iter().filter_map(|dest| map(*dest)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_replace() {
        //setup
        let mut state = State::new();

        //exercise
        let first = state.set_transition(b'a', 1);
        let second = state.set_transition(b'a', 2);

        //verify
        assert_eq!(first, None);
        assert_eq!(second, Some(1));
        assert_eq!(state.transition(b'a'), Some(2));
        assert_eq!(state.transition(b'b'), None);
    }

    #[test]
    fn remapped_shifts_targets() {
        //setup
        let mut state = State::new();
        state.set_transition(b'x', 3);
        state.add_epsilon(4);
        state.mark_final(Some(7));

        //exercise
        let copy = state.remapped(|id| id + 10);

        //verify
        assert_eq!(copy.transition(b'x'), Some(13));
        assert_eq!(copy.epsilon().collect::<Vec<StateId>>(), vec![14]);
        assert!(copy.is_final());
        assert_eq!(copy.terminal(), Some(7));
    }

    #[test]
    fn restricted_drops_edges() {
        //setup
        let mut state = State::new();
        state.set_transition(b'x', 3);
        state.set_transition(b'y', 5);
        state.add_epsilon(4);
        state.add_epsilon(6);

        //exercise
        let copy = state.restricted(|id| if id < 5 { Some(id + 10) } else { None });

        //verify
        assert_eq!(copy.transition(b'x'), Some(13));
        assert_eq!(copy.transition(b'y'), None);
        assert_eq!(copy.epsilon().collect::<Vec<StateId>>(), vec![14]);
    }
}
