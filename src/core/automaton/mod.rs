use {
    crate::core::{automaton::terminal::EOF_NAME, lex::alphabet::Symbol},
    std::{collections::HashMap, error, fmt},
};

pub use self::{
    fragment::Fragment,
    state::{State, StateId},
    terminal::{TerminalId, TerminalRegistry, UnknownTerminalError, EOF},
};

pub mod determinize;
pub mod fragment;
pub mod minimize;
pub mod state;
pub mod terminal;

static DEFAULT_STATE_LIMIT: usize = 1 << 20;

/// Ambiguity Policy: How subset construction treats a DFA state that accepts several terminals.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum AmbiguityPolicy {
    /// The terminal declared first (smallest id) wins, e.g. keywords declared before identifiers.
    FirstDeclared,
    /// Overlapping acceptance is a construction error.
    Strict,
}

impl Default for AmbiguityPolicy {
    fn default() -> Self {
        AmbiguityPolicy::FirstDeclared
    }
}

/// Build Config: Options governing automaton construction.
///
/// # Fields
///
/// * `ambiguity` - the policy used when determinizing overlapping terminals.
/// * `state_limit` - the maximum number of states any automaton built with this config may hold,
/// bounding structural copies made by `range` and macro instantiation.
#[derive(PartialEq, Clone, Debug)]
pub struct BuildConfig {
    pub ambiguity: AmbiguityPolicy,
    pub state_limit: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            ambiguity: AmbiguityPolicy::default(),
            state_limit: DEFAULT_STATE_LIMIT,
        }
    }
}

/// Automaton: An arena of states plus the registries needed to build and compile a lexer.
///
/// Automata start out non-deterministic and mutable; `to_deterministic` and `minimize` produce
/// frozen deterministic automata on which every combinator fails with `FrozenErr`.
#[derive(Clone, Debug)]
pub struct Automaton {
    states: Vec<State>,
    initial: StateId,
    terminals: TerminalRegistry,
    macros: HashMap<String, Fragment>,
    deterministic: bool,
    config: BuildConfig,
}

impl Automaton {
    pub fn new() -> Self {
        Automaton::with_config(BuildConfig::default())
    }

    pub fn with_config(config: BuildConfig) -> Self {
        Automaton {
            states: vec![State::new()],
            initial: 0,
            terminals: TerminalRegistry::new(),
            macros: HashMap::new(),
            deterministic: false,
            config,
        }
    }

    /// Returns a frozen deterministic automaton over `states`.
    fn frozen(
        states: Vec<State>,
        initial: StateId,
        terminals: TerminalRegistry,
        config: BuildConfig,
    ) -> Self {
        Automaton {
            states,
            initial,
            terminals,
            macros: HashMap::new(),
            deterministic: true,
            config,
        }
    }

    /// Registers terminal `name` as accepting whatever the fragment returned by `build` accepts.
    ///
    /// Registering an existing name again adds another alternative for the same terminal id. The
    /// name `EOF` is reserved for the end of input.
    pub fn add_terminal<F>(&mut self, name: &str, build: F) -> Result<TerminalId, ConstructionError>
    where
        F: FnOnce(&mut Automaton) -> Result<Fragment, ConstructionError>,
    {
        self.ensure_mutable()?;
        if name == EOF_NAME {
            return Err(ConstructionError::ReservedNameErr(name.to_string()));
        }

        let fragment = build(self)?;
        self.check(fragment)?;

        let accept = self.new_state()?;
        let id = self.terminals.encode(name);
        self.states[accept].mark_final(Some(id));
        self.add_epsilon(fragment.exit(), accept)?;
        self.add_epsilon(self.initial, fragment.entry())?;

        debug!("Added terminal {} ({}), automaton has {} states", name, id, self.len());
        Ok(id)
    }

    /// Registers macro `name`. Every later `instantiate(name)` returns an independent copy of the
    /// fragment returned by `build`.
    pub fn add_macro<F>(&mut self, name: &str, build: F) -> Result<(), ConstructionError>
    where
        F: FnOnce(&mut Automaton) -> Result<Fragment, ConstructionError>,
    {
        self.ensure_mutable()?;

        let fragment = build(self)?;
        self.check(fragment)?;

        self.macros.insert(name.to_string(), fragment);
        Ok(())
    }

    pub fn has_macro(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    pub fn initial(&self) -> StateId {
        self.initial
    }

    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(id)
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn terminals(&self) -> &TerminalRegistry {
        &self.terminals
    }

    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    fn ensure_mutable(&self) -> Result<(), ConstructionError> {
        if self.deterministic {
            Err(ConstructionError::FrozenErr)
        } else {
            Ok(())
        }
    }

    fn check(&self, fragment: Fragment) -> Result<(), ConstructionError> {
        if fragment.entry() < self.states.len() && fragment.exit() < self.states.len() {
            Ok(())
        } else {
            Err(ConstructionError::FragmentErr(fragment))
        }
    }

    fn new_state(&mut self) -> Result<StateId, ConstructionError> {
        if self.states.len() >= self.config.state_limit {
            return Err(ConstructionError::StateLimitErr(self.config.state_limit));
        }

        self.states.push(State::new());
        Ok(self.states.len() - 1)
    }

    fn add_epsilon(&mut self, from: StateId, to: StateId) -> Result<(), ConstructionError> {
        self.ensure_mutable()?;

        if from != to {
            self.states[from].add_epsilon(to);
        }
        Ok(())
    }

    /// Adds a transition from `from` to `to` on `symbol`. If `from` already moves elsewhere on
    /// `symbol`, both targets are kept reachable through a fresh intermediate state with epsilon
    /// edges to each of them.
    fn add_transition(
        &mut self,
        from: StateId,
        symbol: Symbol,
        to: StateId,
    ) -> Result<(), ConstructionError> {
        self.ensure_mutable()?;

        match self.states[from].transition(symbol) {
            None => {
                self.states[from].set_transition(symbol, to);
            }
            Some(existing) if existing == to => {}
            Some(existing) => {
                let fork = self.new_state()?;
                self.states[fork].add_epsilon(existing);
                self.states[fork].add_epsilon(to);
                self.states[from].set_transition(symbol, fork);
            }
        }
        Ok(())
    }
}

impl Default for Automaton {
    fn default() -> Self {
        Automaton::new()
    }
}

#[derive(Debug, PartialEq)]
pub enum ConstructionError {
    FrozenErr,
    NotDeterministicErr,
    AmbiguityErr(String, String),
    UnknownMacroErr(String),
    RangeErr(usize, usize),
    EmptyAlternationErr,
    AlphabetErr(char),
    StateLimitErr(usize),
    FragmentErr(Fragment),
    ReservedNameErr(String),
}

impl fmt::Display for ConstructionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ConstructionError::FrozenErr => {
                write!(f, "Cannot modify a deterministic automaton")
            }
            ConstructionError::NotDeterministicErr => {
                write!(f, "Only deterministic automata can be compiled")
            }
            ConstructionError::AmbiguityErr(ref first, ref second) => write!(
                f,
                "Ambiguous acceptance between terminals '{}' and '{}'",
                first, second
            ),
            ConstructionError::UnknownMacroErr(ref name) => write!(f, "Unknown macro '{}'", name),
            ConstructionError::RangeErr(min, max) => {
                write!(f, "Invalid repetition range {{{},{}}}", min, max)
            }
            ConstructionError::EmptyAlternationErr => {
                write!(f, "Alternation requires at least one fragment")
            }
            ConstructionError::AlphabetErr(c) => {
                write!(f, "Character {:?} is outside the lexer alphabet", c)
            }
            ConstructionError::StateLimitErr(limit) => {
                write!(f, "Automaton exceeded the limit of {} states", limit)
            }
            ConstructionError::FragmentErr(ref fragment) => write!(
                f,
                "Fragment ({},{}) does not belong to this automaton",
                fragment.entry(),
                fragment.exit()
            ),
            ConstructionError::ReservedNameErr(ref name) => {
                write!(f, "Terminal name '{}' is reserved for the end of input", name)
            }
        }
    }
}

impl error::Error for ConstructionError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_terminal_wires_initial() {
        //setup
        let mut automaton = Automaton::new();

        //exercise
        let id = automaton.add_terminal("A", |a| a.literal(b'a')).unwrap();

        //verify
        assert_eq!(id, 1);
        assert_eq!(automaton.terminals().name(id), Some("A"));
        assert!(automaton.state(automaton.initial()).unwrap().has_epsilon());

        let finals: Vec<Option<TerminalId>> = automaton
            .states()
            .iter()
            .filter(|state| state.is_final())
            .map(State::terminal)
            .collect();
        assert_eq!(finals, vec![Some(1)]);
    }

    #[test]
    fn add_terminal_twice_shares_id() {
        //setup
        let mut automaton = Automaton::new();

        //exercise
        let first = automaton.add_terminal("X", |a| a.literal(b'x')).unwrap();
        let other = automaton.add_terminal("Y", |a| a.literal(b'y')).unwrap();
        let second = automaton.add_terminal("X", |a| a.literal(b'z')).unwrap();

        //verify
        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(automaton.matches("z"), Some(first));
    }

    #[test]
    fn failed_terminal_not_registered() {
        //setup
        let mut automaton = Automaton::new();

        //exercise
        let res = automaton.add_terminal("BAD", |a| a.instantiate("missing"));

        //verify
        assert_eq!(
            res.err().unwrap(),
            ConstructionError::UnknownMacroErr("missing".to_string())
        );
        assert!(automaton.terminals().id("BAD").is_err());
    }

    #[test]
    fn reserved_terminal_name() {
        //setup
        let mut automaton = Automaton::new();

        //exercise
        let res = automaton.add_terminal("EOF", |a| a.literal(b'a'));

        //verify
        assert_eq!(
            res.err().unwrap(),
            ConstructionError::ReservedNameErr("EOF".to_string())
        );
        assert_eq!(automaton.len(), 1);
        assert_eq!(automaton.terminals().len(), 1);
    }

    #[test]
    fn accept_state_over_limit_not_registered() {
        //setup
        let mut automaton = Automaton::with_config(BuildConfig {
            state_limit: 3,
            ..BuildConfig::default()
        });

        //exercise
        let res = automaton.add_terminal("A", |a| a.literal(b'a'));

        //verify
        assert_eq!(res.err().unwrap(), ConstructionError::StateLimitErr(3));
        assert!(automaton.terminals().id("A").is_err());
    }

    #[test]
    fn transition_conflict_forks() {
        //setup
        let mut automaton = Automaton::new();
        let first = automaton.new_state().unwrap();
        let second = automaton.new_state().unwrap();

        //exercise
        automaton.add_transition(0, b'a', first).unwrap();
        automaton.add_transition(0, b'a', second).unwrap();

        //verify
        let fork = automaton.state(0).unwrap().transition(b'a').unwrap();
        assert_ne!(fork, first);
        assert_ne!(fork, second);
        let targets: Vec<StateId> = automaton.state(fork).unwrap().epsilon().collect();
        assert_eq!(targets, vec![first, second]);
    }

    #[test]
    fn state_limit() {
        //setup
        let mut automaton = Automaton::with_config(BuildConfig {
            state_limit: 4,
            ..BuildConfig::default()
        });

        //exercise
        let res = automaton.add_terminal("ABC", |a| a.string("abc"));

        //verify
        assert_eq!(res.err().unwrap(), ConstructionError::StateLimitErr(4));
    }

    #[test]
    fn foreign_fragment_rejected() {
        //setup
        let mut automaton = Automaton::new();

        //exercise
        let res = automaton.add_terminal("F", |_| Ok(Fragment::new(40, 41)));

        //verify
        assert_eq!(
            format!("{}", res.err().unwrap()),
            "Fragment (40,41) does not belong to this automaton"
        );
    }
}
