use {
    crate::core::{
        automaton::{Automaton, ConstructionError, State, StateId, TerminalId},
        lex::alphabet::Symbol,
    },
    std::collections::{BTreeSet, HashMap},
};

/// Block Signature: What distinguishes a state during one refinement round, namely its current
/// block and the blocks its transitions lead to (`None` where it has no transition).
type BlockSignature = (usize, Vec<Option<usize>>);

impl Automaton {
    /// Returns an equivalent deterministic automaton in which states that are indistinguishable
    /// by any input (Moore partition refinement) are merged. States accepting different
    /// terminals are never merged.
    ///
    /// Non-deterministic automata are determinized first.
    pub fn minimize(&self) -> Result<Automaton, ConstructionError> {
        let dfa = self.to_deterministic()?;

        let symbols: Vec<Symbol> = dfa
            .states
            .iter()
            .flat_map(|state| state.transitions().map(|(symbol, _)| symbol))
            .collect::<BTreeSet<Symbol>>()
            .into_iter()
            .collect();

        let mut acceptance: HashMap<(bool, Option<TerminalId>), usize> = HashMap::new();
        let mut block_of: Vec<usize> = dfa
            .states
            .iter()
            .map(|state| {
                let next = acceptance.len();
                *acceptance
                    .entry((state.is_final(), state.terminal()))
                    .or_insert(next)
            })
            .collect();
        let mut blocks = acceptance.len();

        loop {
            let mut signatures: HashMap<BlockSignature, usize> = HashMap::new();
            let refined: Vec<usize> = dfa
                .states
                .iter()
                .enumerate()
                .map(|(id, state)| {
                    let signature: BlockSignature = (
                        block_of[id],
                        symbols
                            .iter()
                            .map(|symbol| state.transition(*symbol).map(|dest| block_of[dest]))
                            .collect(),
                    );
                    let next = signatures.len();
                    *signatures.entry(signature).or_insert(next)
                })
                .collect();

            block_of = refined;
            if signatures.len() == blocks {
                break;
            }
            blocks = signatures.len();
        }

        let mut states: Vec<Option<State>> = vec![None; blocks];
        for (id, state) in dfa.states.iter().enumerate() {
            let block = block_of[id];
            if states[block].is_none() {
                states[block] = Some(state.remapped(|dest: StateId| block_of[dest]));
            }
        }

        debug!("Minimized {} DFA states into {} states", dfa.len(), blocks);

        Ok(Automaton::frozen(
            states.into_iter().flatten().collect(),
            block_of[dfa.initial],
            dfa.terminals,
            dfa.config,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimize_classic() {
        //setup
        let mut automaton = Automaton::new();
        automaton
            .add_terminal("ABB", |a| {
                let a_symbol = a.literal(b'a')?;
                let b_symbol = a.literal(b'b')?;
                let either = a.alternate(&[a_symbol, b_symbol])?;
                let prefix = a.star(either)?;
                let suffix = a.string("abb")?;
                a.append(prefix, suffix)
            })
            .unwrap();

        //exercise
        let dfa = automaton.to_deterministic().unwrap();
        let minimal = automaton.minimize().unwrap();

        //verify
        assert!(minimal.is_deterministic());
        assert!(minimal.len() <= dfa.len());
        assert_eq!(minimal.len(), 4);
        for input in &["abb", "aabb", "babb", "ab", "abba", "", "bbabb", "abbabb"] {
            assert_eq!(minimal.matches(input), automaton.matches(input), "{}", input);
        }
    }

    #[test]
    fn minimize_keeps_terminals_apart() {
        //setup
        let mut automaton = Automaton::new();
        let a = automaton.add_terminal("A", |a| a.literal(b'a')).unwrap();
        let b = automaton.add_terminal("B", |a| a.literal(b'b')).unwrap();
        automaton.add_terminal("C", |a| a.literal(b'c')).unwrap();
        let c_again = automaton.add_terminal("C", |a| a.literal(b'd')).unwrap();

        //exercise
        let minimal = automaton.minimize().unwrap();

        //verify
        assert_eq!(minimal.len(), 4);
        assert_eq!(minimal.matches("a"), Some(a));
        assert_eq!(minimal.matches("b"), Some(b));
        assert_eq!(minimal.matches("c"), Some(c_again));
        assert_eq!(minimal.matches("d"), Some(c_again));
        assert_eq!(minimal.initial(), 0);
    }
}
