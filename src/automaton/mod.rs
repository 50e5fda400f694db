//! Deterministic automata over Unicode code points.
//!
//! Patterns are parsed with `regex-syntax`, compiled ([`parser`]) into a
//! Thompson NFA ([`Nfa`]) and determinized into an [`Automaton`]. Transitions
//! are labelled with inclusive code point ranges, so `.` and negated classes
//! stay a single edge instead of a million. A state with no transition for a
//! code point is dead.
//!
//! Besides running forward, an automaton can be suffixed with `.*` and
//! reversed; the highlighter uses the reversed `(pattern).*` automaton to find
//! every legal match start in one backward sweep.

pub mod parser;

use ahash::AHashMap;

use crate::error::{HighlightError, Result};

/// Largest Unicode scalar value.
pub const MAX_CODE_POINT: u32 = 0x10FFFF;

/// Determinization gives up past this many states.
pub const MAX_DETERMINIZED_STATES: usize = 10_000;

/// Self-loops covering more code points than this mark a state as
/// unconstrained.
pub const UNCONSTRAINED_LOOP_THRESHOLD: u32 = 15;

/// A transition on the inclusive code point range `min..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Lowest code point of the range.
    pub min: u32,
    /// Highest code point of the range.
    pub max: u32,
    /// Target state.
    pub to: usize,
}

impl Transition {
    fn width(&self) -> u32 {
        self.max - self.min + 1
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct State {
    accept: bool,
    // sorted by `min`, non-overlapping
    transitions: Vec<Transition>,
}

/// A deterministic automaton over code points. State 0 is the initial state.
#[derive(Debug, Clone, PartialEq)]
pub struct Automaton {
    states: Vec<State>,
}

impl Automaton {
    /// The initial state.
    pub fn initial(&self) -> usize {
        0
    }

    /// Number of states.
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Whether `state` is accepting.
    pub fn is_accept(&self, state: usize) -> bool {
        self.states[state].accept
    }

    /// Outgoing transitions of `state`, sorted by range.
    pub fn transitions(&self, state: usize) -> &[Transition] {
        &self.states[state].transitions
    }

    /// Step from `state` on `c`. `None` means the automaton is dead.
    pub fn step(&self, state: usize, c: char) -> Option<usize> {
        let c = u32::from(c);
        let transitions = &self.states[state].transitions;
        let i = transitions.partition_point(|t| t.max < c);
        transitions.get(i).filter(|t| t.min <= c).map(|t| t.to)
    }

    /// Whether the automaton accepts the whole of `text`.
    pub fn run(&self, text: &str) -> bool {
        let mut state = self.initial();
        for c in text.chars() {
            match self.step(state, c) {
                Some(next) => state = next,
                None => return false,
            }
        }
        self.is_accept(state)
    }

    /// Whether the initial state, or a state one transition away from it,
    /// loops on itself over more than [`UNCONSTRAINED_LOOP_THRESHOLD`] code
    /// points.
    ///
    /// Such states come from leading `.*`, `.+` or wide character class
    /// repetitions, which make a plain forward scan quadratic.
    pub fn has_unconstrained_prefix(&self) -> bool {
        let initial = self.initial();
        std::iter::once(initial)
            .chain(self.transitions(initial).iter().map(|t| t.to))
            .any(|state| self.self_loop_width(state) > UNCONSTRAINED_LOOP_THRESHOLD)
    }

    fn self_loop_width(&self, state: usize) -> u32 {
        self.transitions(state)
            .iter()
            .filter(|t| t.to == state)
            .map(Transition::width)
            .fold(0u32, u32::saturating_add)
    }

    /// The same language minus the empty string.
    pub fn without_empty(&self) -> Automaton {
        if !self.is_accept(self.initial()) {
            return self.clone();
        }
        let shift = |t: &Transition| Transition {
            to: t.to + 1,
            ..*t
        };
        let mut states = Vec::with_capacity(self.states.len() + 1);
        states.push(State {
            accept: false,
            transitions: self.states[0].transitions.iter().map(shift).collect(),
        });
        states.extend(self.states.iter().map(|state| State {
            accept: state.accept,
            transitions: state.transitions.iter().map(shift).collect(),
        }));
        Automaton { states }
    }

    /// An automaton for `(self).*`: every string with a prefix in this
    /// language.
    pub fn concat_any_star(&self) -> Result<Automaton> {
        let mut nfa = self.to_nfa();
        let any = nfa.add_state();
        nfa.set_accept(any);
        nfa.add_edge(any, 0, MAX_CODE_POINT, any);
        for (i, state) in self.states.iter().enumerate() {
            if state.accept {
                nfa.add_epsilon(i, any);
            }
        }
        nfa.determinize()
    }

    /// An automaton accepting the reverse of every string this one accepts.
    pub fn reverse(&self) -> Result<Automaton> {
        let mut nfa = Nfa::new();
        for _ in 0..self.states.len() {
            nfa.add_state();
        }
        let start = nfa.add_state();
        nfa.set_start(start);
        nfa.set_accept(self.initial());
        for (from, state) in self.states.iter().enumerate() {
            if state.accept {
                nfa.add_epsilon(start, from);
            }
            for t in &state.transitions {
                nfa.add_edge(t.to, t.min, t.max, from);
            }
        }
        nfa.determinize()
    }

    fn to_nfa(&self) -> Nfa {
        let mut nfa = Nfa::new();
        for state in &self.states {
            let id = nfa.add_state();
            if state.accept {
                nfa.set_accept(id);
            }
        }
        for (from, state) in self.states.iter().enumerate() {
            for t in &state.transitions {
                nfa.add_edge(from, t.min, t.max, t.to);
            }
        }
        nfa.set_start(0);
        nfa
    }
}

#[derive(Debug, Clone, Default)]
struct NfaState {
    accept: bool,
    epsilon: Vec<usize>,
    edges: Vec<Transition>,
}

/// A nondeterministic automaton with epsilon moves, built up state by state
/// and then determinized.
#[derive(Debug, Clone, Default)]
pub struct Nfa {
    states: Vec<NfaState>,
    start: usize,
}

impl Nfa {
    /// Create an empty NFA.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a non-accepting state and return its id.
    pub fn add_state(&mut self) -> usize {
        self.states.push(NfaState::default());
        self.states.len() - 1
    }

    /// Number of states added so far.
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Set the start state.
    pub fn set_start(&mut self, state: usize) {
        self.start = state;
    }

    /// Mark a state as accepting.
    pub fn set_accept(&mut self, state: usize) {
        self.states[state].accept = true;
    }

    /// Add a transition on `min..=max`.
    pub fn add_edge(&mut self, from: usize, min: u32, max: u32, to: usize) {
        self.states[from].edges.push(Transition { min, max, to });
    }

    /// Add an epsilon move.
    pub fn add_epsilon(&mut self, from: usize, to: usize) {
        self.states[from].epsilon.push(to);
    }

    fn closure(&self, seeds: impl IntoIterator<Item = usize>) -> Vec<usize> {
        let mut seen = vec![false; self.states.len()];
        let mut stack: Vec<usize> = seeds.into_iter().collect();
        let mut set = Vec::new();
        while let Some(state) = stack.pop() {
            if seen[state] {
                continue;
            }
            seen[state] = true;
            set.push(state);
            stack.extend(self.states[state].epsilon.iter().copied());
        }
        set.sort_unstable();
        set
    }

    /// Subset construction.
    pub fn determinize(&self) -> Result<Automaton> {
        if self.states.is_empty() {
            return Ok(Automaton {
                states: vec![State::default()],
            });
        }

        let initial = self.closure([self.start]);
        let mut ids: AHashMap<Vec<usize>, usize> = AHashMap::new();
        let mut sets = vec![initial.clone()];
        ids.insert(initial, 0);
        let mut states: Vec<State> = Vec::new();

        let mut next = 0;
        while next < sets.len() {
            let set = sets[next].clone();
            next += 1;

            let accept = set.iter().any(|&s| self.states[s].accept);
            let mut points: Vec<u32> = Vec::new();
            for &s in &set {
                for edge in &self.states[s].edges {
                    points.push(edge.min);
                    if edge.max < MAX_CODE_POINT {
                        points.push(edge.max + 1);
                    }
                }
            }
            points.sort_unstable();
            points.dedup();

            let mut transitions: Vec<Transition> = Vec::new();
            for (i, &min) in points.iter().enumerate() {
                let max = points.get(i + 1).map_or(MAX_CODE_POINT, |p| p - 1);
                let targets = self.closure(set.iter().flat_map(|&s| {
                    self.states[s]
                        .edges
                        .iter()
                        .filter(move |e| e.min <= min && min <= e.max)
                        .map(|e| e.to)
                }));
                if targets.is_empty() {
                    continue;
                }
                let to = match ids.get(&targets) {
                    Some(&id) => id,
                    None => {
                        let id = sets.len();
                        if id >= MAX_DETERMINIZED_STATES {
                            return Err(HighlightError::invalid_argument(format!(
                                "pattern needs more than {MAX_DETERMINIZED_STATES} automaton states"
                            )));
                        }
                        ids.insert(targets.clone(), id);
                        sets.push(targets);
                        id
                    }
                };
                match transitions.last_mut() {
                    Some(last) if last.to == to && last.max + 1 == min => last.max = max,
                    _ => transitions.push(Transition { min, max, to }),
                }
            }
            states.push(State {
                accept,
                transitions,
            });
        }

        Ok(Automaton { states })
    }
}
