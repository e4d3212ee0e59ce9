use {
    crate::core::{
        automaton::{
            AmbiguityPolicy, Automaton, ConstructionError, State, StateId, TerminalId,
        },
        data::state_set::StateSet,
        lex::alphabet::{self, Symbol},
    },
    std::collections::{BTreeMap, HashMap, VecDeque},
};

impl Automaton {
    /// Returns the set of states reachable from `states` through zero or more epsilon edges.
    pub fn epsilon_closure(&self, states: &StateSet) -> StateSet {
        let mut closure = states.clone();
        let mut pending: Vec<StateId> = states.iter().collect();

        while let Some(id) = pending.pop() {
            for dest in self.states[id].epsilon() {
                if closure.insert(dest) {
                    pending.push(dest);
                }
            }
        }

        closure
    }

    /// Returns the terminal accepting all of `input`, if any, by tracing every state the
    /// automaton could be in simultaneously. Works on both deterministic and non-deterministic
    /// automata; overlapping terminals resolve to the smallest id.
    pub fn matches(&self, input: &str) -> Option<TerminalId> {
        let mut current = StateSet::with_capacity(self.len());
        current.insert(self.initial);
        current = self.epsilon_closure(&current);

        for c in input.chars() {
            let symbol = alphabet::symbol_of(c)?;

            let mut next = StateSet::with_capacity(self.len());
            for id in current.iter() {
                if let Some(dest) = self.states[id].transition(symbol) {
                    next.insert(dest);
                }
            }

            if next.is_empty() {
                return None;
            }
            current = self.epsilon_closure(&next);
        }

        current
            .iter()
            .filter_map(|id| self.states[id].terminal())
            .min()
    }

    /// Returns an equivalent deterministic automaton built by subset construction.
    ///
    /// Already-deterministic automata are returned as a copy.
    pub fn to_deterministic(&self) -> Result<Automaton, ConstructionError> {
        if self.deterministic {
            return Ok(self.clone());
        }

        Determinizer::new(self).run()
    }
}

/// Determinizer: Converts a non-deterministic automaton into a deterministic one.
///
/// Epsilon closures of single states are computed once and reused for every subset that
/// contains the state.
struct Determinizer<'nfa> {
    nfa: &'nfa Automaton,
    closures: Vec<Option<StateSet>>,
}

impl<'nfa> Determinizer<'nfa> {
    fn new(nfa: &'nfa Automaton) -> Self {
        Determinizer {
            nfa,
            closures: vec![None; nfa.len()],
        }
    }

    fn closure_of(&mut self, id: StateId) -> &StateSet {
        if self.closures[id].is_none() {
            let mut single = StateSet::with_capacity(self.nfa.len());
            single.insert(id);
            self.closures[id] = Some(self.nfa.epsilon_closure(&single));
        }

        match self.closures[id] {
            Some(ref closure) => closure,
            None => unreachable!(),
        }
    }

    fn closure(&mut self, states: &StateSet) -> StateSet {
        let mut closure = StateSet::with_capacity(self.nfa.len());
        for id in states.iter() {
            closure.union_with(self.closure_of(id));
        }
        closure
    }

    fn run(mut self) -> Result<Automaton, ConstructionError> {
        let mut start = StateSet::with_capacity(self.nfa.len());
        start.insert(self.nfa.initial);
        let start = self.closure(&start);

        let mut subsets: Vec<StateSet> = vec![start.clone()];
        let mut index: HashMap<StateSet, StateId> = HashMap::new();
        index.insert(start, 0);

        let mut deltas: Vec<BTreeMap<Symbol, StateId>> = vec![BTreeMap::new()];
        let mut pending: VecDeque<StateId> = VecDeque::new();
        pending.push_back(0);

        while let Some(dfa_state) = pending.pop_front() {
            let mut moves: BTreeMap<Symbol, StateSet> = BTreeMap::new();
            for id in subsets[dfa_state].iter() {
                for (symbol, dest) in self.nfa.states[id].transitions() {
                    moves
                        .entry(symbol)
                        .or_insert_with(|| StateSet::with_capacity(self.nfa.len()))
                        .insert(dest);
                }
            }

            for (symbol, targets) in moves {
                let target = self.closure(&targets);

                let dest = match index.get(&target) {
                    Some(dest) => *dest,
                    None => {
                        let dest = subsets.len();
                        if dest >= self.nfa.config.state_limit {
                            return Err(ConstructionError::StateLimitErr(
                                self.nfa.config.state_limit,
                            ));
                        }

                        subsets.push(target.clone());
                        index.insert(target, dest);
                        deltas.push(BTreeMap::new());
                        pending.push_back(dest);
                        dest
                    }
                };

                deltas[dfa_state].insert(symbol, dest);
            }
        }

        let mut states: Vec<State> = Vec::with_capacity(subsets.len());
        for (subset, delta) in subsets.iter().zip(deltas.into_iter()) {
            let mut state = State::new();
            if let Some(terminal) = self.acceptance(subset)? {
                state.mark_final(Some(terminal));
            } else if subset.iter().any(|id| self.nfa.states[id].is_final()) {
                state.mark_final(None);
            }
            for (symbol, dest) in delta {
                state.set_transition(symbol, dest);
            }
            states.push(state);
        }

        debug!(
            "Determinized {} NFA states into {} DFA states",
            self.nfa.len(),
            states.len()
        );

        Ok(Automaton::frozen(
            states,
            0,
            self.nfa.terminals.clone(),
            self.nfa.config.clone(),
        ))
    }

    /// Returns the terminal accepted by `subset` under the configured ambiguity policy.
    fn acceptance(&self, subset: &StateSet) -> Result<Option<TerminalId>, ConstructionError> {
        let mut terminals: Vec<TerminalId> = subset
            .iter()
            .filter_map(|id| self.nfa.states[id].terminal())
            .collect();
        terminals.sort();
        terminals.dedup();

        match (self.nfa.config.ambiguity, terminals.len()) {
            (_, 0) => Ok(None),
            (AmbiguityPolicy::Strict, len) if len > 1 => {
                let name = |id: TerminalId| {
                    self.nfa.terminals.name(id).unwrap_or_default().to_string()
                };
                Err(ConstructionError::AmbiguityErr(name(terminals[0]), name(terminals[1])))
            }
            _ => Ok(Some(terminals[0])),
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::core::automaton::{BuildConfig, Fragment},
    };

    fn identifiers() -> Automaton {
        let mut automaton = Automaton::new();
        automaton.add_terminal("IF", |a| a.string("if")).unwrap();
        automaton
            .add_terminal("ID", |a| {
                let first = a.class(&[(b'a'..=b'z').into()])?;
                let rest = a.class(&[(b'a'..=b'z').into(), (b'0'..=b'9').into()])?;
                let rest = a.star(rest)?;
                a.append(first, rest)
            })
            .unwrap();
        automaton
            .add_terminal("INT", |a| {
                let digit = a.class(&[(b'0'..=b'9').into()])?;
                a.plus(digit)
            })
            .unwrap();
        automaton
    }

    fn set(capacity: usize, ids: &[StateId]) -> StateSet {
        let mut set = StateSet::with_capacity(capacity);
        for id in ids {
            set.insert(*id);
        }
        set
    }

    #[test]
    fn closure_idempotent() {
        //setup
        let automaton = identifiers();

        for id in 0..automaton.len() {
            let single = set(automaton.len(), &[id]);

            //exercise
            let once = automaton.epsilon_closure(&single);
            let twice = automaton.epsilon_closure(&once);

            //verify
            assert_eq!(once, twice);
            assert!(once.contains(id));
        }
    }

    #[test]
    fn closure_follows_chains() {
        //setup
        let mut automaton = Automaton::new();
        let a = automaton.literal(b'a').unwrap();
        let b = automaton.literal(b'b').unwrap();
        let b = automaton.optional(b).unwrap();
        let ab = automaton.append(a, b).unwrap();

        //exercise
        let closure = automaton.epsilon_closure(&set(automaton.len(), &[a.exit()]));

        //verify
        assert!(closure.contains(b.entry()));
        assert!(closure.contains(ab.exit()));
        assert!(!closure.contains(a.entry()));
    }

    #[test]
    fn deterministic_shape() {
        //setup
        let automaton = identifiers();

        //exercise
        let dfa = automaton.to_deterministic().unwrap();

        //verify
        assert!(dfa.is_deterministic());
        assert_eq!(dfa.initial(), 0);
        for state in dfa.states() {
            assert!(!state.has_epsilon());
        }
        assert!(!dfa.state(dfa.initial()).unwrap().is_final());
    }

    #[test]
    fn deterministic_agrees_with_simulation() {
        //setup
        let automaton = identifiers();
        let inputs = [
            "", "i", "if", "iff", "if2", "x", "abc123", "123", "0", "12a", "a-b", "ifif", "9if",
        ];

        //exercise
        let dfa = automaton.to_deterministic().unwrap();

        //verify
        for input in inputs.iter() {
            assert_eq!(dfa.matches(input), automaton.matches(input), "{}", input);
        }
        assert_eq!(dfa.matches("if"), Some(1));
        assert_eq!(dfa.matches("iff"), Some(2));
        assert_eq!(dfa.matches("42"), Some(3));
        assert_eq!(dfa.matches("4a"), None);
    }

    #[test]
    fn first_declared_wins() {
        //setup
        let mut automaton = Automaton::new();
        let keyword = automaton.add_terminal("KEYWORD", |a| a.string("if")).unwrap();
        let id = automaton
            .add_terminal("ID", |a| {
                let letter = a.class(&[(b'a'..=b'z').into()])?;
                a.plus(letter)
            })
            .unwrap();

        //exercise
        let dfa = automaton.to_deterministic().unwrap();

        //verify
        assert_eq!(dfa.matches("if"), Some(keyword));
        assert_eq!(dfa.matches("i"), Some(id));
    }

    #[test]
    fn strict_rejects_ambiguity() {
        //setup
        let mut automaton = Automaton::with_config(BuildConfig {
            ambiguity: AmbiguityPolicy::Strict,
            ..BuildConfig::default()
        });
        automaton.add_terminal("KEYWORD", |a| a.string("if")).unwrap();
        automaton
            .add_terminal("ID", |a| {
                let letter = a.class(&[(b'a'..=b'z').into()])?;
                a.plus(letter)
            })
            .unwrap();

        //exercise
        let res = automaton.to_deterministic();

        //verify
        assert_eq!(
            format!("{}", res.err().unwrap()),
            "Ambiguous acceptance between terminals 'KEYWORD' and 'ID'"
        );
    }

    #[test]
    fn strict_accepts_disjoint() {
        //setup
        let mut automaton = Automaton::with_config(BuildConfig {
            ambiguity: AmbiguityPolicy::Strict,
            ..BuildConfig::default()
        });
        automaton.add_terminal("A", |a| a.string("a")).unwrap();
        automaton.add_terminal("B", |a| a.string("b")).unwrap();

        //exercise
        let res = automaton.to_deterministic();

        //verify
        assert!(res.is_ok());
    }

    #[test]
    fn dfa_state_limit() {
        //setup
        let mut automaton = Automaton::with_config(BuildConfig {
            state_limit: 64,
            ..BuildConfig::default()
        });
        automaton
            .add_terminal("SEVENTH_FROM_LAST", |a| {
                let any = a.class(&[(b'a'..=b'b').into()])?;
                let prefix = a.star(any)?;
                let marker = a.literal(b'a')?;
                let tail_symbol = a.class(&[(b'a'..=b'b').into()])?;
                let tail = a.range(tail_symbol, 6, Some(6))?;
                a.sequence(&[prefix, marker, tail])
            })
            .unwrap();

        //exercise
        let res = automaton.to_deterministic();

        //verify
        assert!(automaton.len() < 64);
        assert_eq!(res.err().unwrap(), ConstructionError::StateLimitErr(64));
    }

    #[test]
    fn unreachable_macros_ignored() {
        //setup
        let mut automaton = Automaton::new();
        automaton.add_macro("unused", |a| a.string("zzz")).unwrap();
        automaton.add_terminal("A", |a| a.literal(b'a')).unwrap();
        let copy: Fragment = automaton.instantiate("unused").unwrap();

        //exercise
        let dfa = automaton.to_deterministic().unwrap();

        //verify
        assert!(copy.entry() < automaton.len());
        assert_eq!(dfa.len(), 2);
        assert_eq!(dfa.matches("zzz"), None);
    }
}
