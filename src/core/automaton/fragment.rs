use {
    crate::core::{
        automaton::{Automaton, ConstructionError, StateId},
        lex::alphabet::{self, Symbol, SymbolRange, ALPHABET_SIZE},
    },
    std::collections::{BTreeSet, HashMap, HashSet},
};

/// Fragment: A view of a sub-automaton with exactly one entry state and one exit state.
///
/// Fragments never own states, they only name two states of an `Automaton` arena, so the same
/// fragment can be handed to several combinators. Combinators that need a private instance of a
/// fragment (`range`, `instantiate`) take structural copies.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Fragment {
    entry: StateId,
    exit: StateId,
}

impl Fragment {
    pub fn new(entry: StateId, exit: StateId) -> Self {
        Fragment { entry, exit }
    }

    pub fn entry(&self) -> StateId {
        self.entry
    }

    pub fn exit(&self) -> StateId {
        self.exit
    }
}

impl Automaton {
    fn fragment(&mut self) -> Result<Fragment, ConstructionError> {
        self.ensure_mutable()?;

        let entry = self.new_state()?;
        let exit = self.new_state()?;
        Ok(Fragment::new(entry, exit))
    }

    /// Returns a fragment accepting only the empty string.
    pub fn epsilon(&mut self) -> Result<Fragment, ConstructionError> {
        let fragment = self.fragment()?;
        self.add_epsilon(fragment.entry, fragment.exit)?;
        Ok(fragment)
    }

    pub fn literal(&mut self, symbol: Symbol) -> Result<Fragment, ConstructionError> {
        let fragment = self.fragment()?;
        self.add_transition(fragment.entry, symbol, fragment.exit)?;
        Ok(fragment)
    }

    /// Returns a fragment accepting exactly `text`.
    pub fn string(&mut self, text: &str) -> Result<Fragment, ConstructionError> {
        if text.is_empty() {
            return self.epsilon();
        }

        self.ensure_mutable()?;

        let entry = self.new_state()?;
        let mut curr = entry;
        for c in text.chars() {
            let symbol = alphabet::symbol_of(c).ok_or(ConstructionError::AlphabetErr(c))?;
            let next = self.new_state()?;
            self.add_transition(curr, symbol, next)?;
            curr = next;
        }

        Ok(Fragment::new(entry, curr))
    }

    /// Returns a fragment accepting any single symbol covered by `ranges`.
    pub fn class(&mut self, ranges: &[SymbolRange]) -> Result<Fragment, ConstructionError> {
        let fragment = self.fragment()?;
        for range in ranges {
            for symbol in range.symbols() {
                self.add_transition(fragment.entry, symbol, fragment.exit)?;
            }
        }
        Ok(fragment)
    }

    /// Returns a fragment accepting any single symbol of the alphabet not covered by `ranges`.
    pub fn exclude(&mut self, ranges: &[SymbolRange]) -> Result<Fragment, ConstructionError> {
        let fragment = self.fragment()?;
        for value in 0..ALPHABET_SIZE {
            let symbol = value as Symbol;
            if !ranges.iter().any(|range| range.contains(symbol)) {
                self.add_transition(fragment.entry, symbol, fragment.exit)?;
            }
        }
        Ok(fragment)
    }

    /// Returns a fragment accepting any single symbol.
    pub fn any(&mut self) -> Result<Fragment, ConstructionError> {
        self.exclude(&[])
    }

    pub fn append(&mut self, a: Fragment, b: Fragment) -> Result<Fragment, ConstructionError> {
        self.check(a)?;
        self.check(b)?;

        self.add_epsilon(a.exit, b.entry)?;
        Ok(Fragment::new(a.entry, b.exit))
    }

    /// Appends every fragment of `parts` in order. An empty sequence accepts the empty string.
    pub fn sequence(&mut self, parts: &[Fragment]) -> Result<Fragment, ConstructionError> {
        let (first, rest) = match parts.split_first() {
            None => return self.epsilon(),
            Some(split) => split,
        };

        let mut fragment = *first;
        for part in rest {
            fragment = self.append(fragment, *part)?;
        }
        Ok(fragment)
    }

    pub fn alternate(&mut self, parts: &[Fragment]) -> Result<Fragment, ConstructionError> {
        if parts.is_empty() {
            return Err(ConstructionError::EmptyAlternationErr);
        }
        for part in parts {
            self.check(*part)?;
        }

        let fragment = self.fragment()?;
        for part in parts {
            self.add_epsilon(fragment.entry, part.entry)?;
            self.add_epsilon(part.exit, fragment.exit)?;
        }
        Ok(fragment)
    }

    /// Makes `a` optional in place by adding a bypass edge from its entry to its exit.
    pub fn optional(&mut self, a: Fragment) -> Result<Fragment, ConstructionError> {
        self.check(a)?;

        self.add_epsilon(a.entry, a.exit)?;
        Ok(a)
    }

    pub fn star(&mut self, a: Fragment) -> Result<Fragment, ConstructionError> {
        self.check(a)?;

        let fragment = self.fragment()?;
        self.add_epsilon(fragment.entry, fragment.exit)?;
        self.add_epsilon(fragment.entry, a.entry)?;
        self.add_epsilon(a.exit, fragment.exit)?;
        self.add_epsilon(fragment.exit, fragment.entry)?;
        Ok(fragment)
    }

    pub fn plus(&mut self, a: Fragment) -> Result<Fragment, ConstructionError> {
        self.check(a)?;
        self.ensure_mutable()?;

        let entry = self.new_state()?;
        self.add_epsilon(entry, a.entry)?;
        self.add_epsilon(a.exit, entry)?;
        Ok(Fragment::new(entry, a.exit))
    }

    /// Returns a fragment accepting between `min` and `max` repetitions of `a`, or at least `min`
    /// repetitions if `max` is `None`. Every repetition is a fresh structural copy of `a`.
    pub fn range(
        &mut self,
        a: Fragment,
        min: usize,
        max: Option<usize>,
    ) -> Result<Fragment, ConstructionError> {
        self.check(a)?;
        if let Some(max) = max {
            if min > max {
                return Err(ConstructionError::RangeErr(min, max));
            }
        }

        // Every copy takes at least one fresh state.
        if min >= self.config.state_limit {
            return Err(ConstructionError::StateLimitErr(self.config.state_limit));
        }

        let mut parts: Vec<Fragment> = Vec::new();
        for _ in 0..min {
            parts.push(self.copy(a)?);
        }

        match max {
            None => {
                let repeated = self.copy(a)?;
                parts.push(self.star(repeated)?);
            }
            Some(max) if max > min => {
                let tail = self.fragment()?;
                let mut curr = tail.entry;
                for _ in min..max {
                    let instance = self.copy(a)?;
                    self.add_epsilon(curr, tail.exit)?;
                    self.add_epsilon(curr, instance.entry)?;
                    curr = instance.exit;
                }
                self.add_epsilon(curr, tail.exit)?;
                parts.push(tail);
            }
            Some(_) => {}
        }

        self.sequence(&parts)
    }

    /// Returns an independent copy of the registered macro `name`.
    pub fn instantiate(&mut self, name: &str) -> Result<Fragment, ConstructionError> {
        let fragment = match self.macros.get(name) {
            Some(fragment) => *fragment,
            None => return Err(ConstructionError::UnknownMacroErr(name.to_string())),
        };

        self.copy(fragment)
    }

    /// Returns a structural copy of `a`. Only the states of `a` itself are duplicated, those
    /// reachable from its entry that can still reach its exit, along with the transitions, epsilon
    /// edges and finality between them. Edges leading out of `a` are dropped.
    pub fn copy(&mut self, a: Fragment) -> Result<Fragment, ConstructionError> {
        self.check(a)?;
        self.ensure_mutable()?;

        let members = self.members(a);
        let mut mapping: HashMap<StateId, StateId> = HashMap::with_capacity(members.len());
        for id in &members {
            let duplicate = self.new_state()?;
            mapping.insert(*id, duplicate);
        }

        for id in &members {
            let duplicate = self.states[*id].restricted(|dest| mapping.get(&dest).cloned());
            self.states[mapping[id]] = duplicate;
        }

        Ok(Fragment::new(mapping[&a.entry], mapping[&a.exit]))
    }

    /// Returns the states of `a` in ascending order.
    fn members(&self, a: Fragment) -> BTreeSet<StateId> {
        let mut reachable: HashSet<StateId> = HashSet::new();
        let mut predecessors: HashMap<StateId, Vec<StateId>> = HashMap::new();
        let mut pending: Vec<StateId> = vec![a.entry];
        reachable.insert(a.entry);

        while let Some(id) = pending.pop() {
            let state = &self.states[id];
            for dest in state.transitions().map(|(_, dest)| dest).chain(state.epsilon()) {
                predecessors.entry(dest).or_insert_with(Vec::new).push(id);
                if reachable.insert(dest) {
                    pending.push(dest);
                }
            }
        }

        let mut members: BTreeSet<StateId> = BTreeSet::new();
        members.insert(a.entry);
        members.insert(a.exit);
        let mut pending: Vec<StateId> = vec![a.exit];

        while let Some(id) = pending.pop() {
            for source in predecessors.get(&id).into_iter().flatten() {
                if members.insert(*source) {
                    pending.push(*source);
                }
            }
        }

        members
    }
}
