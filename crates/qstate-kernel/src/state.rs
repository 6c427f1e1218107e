//! Boolean state trees.
//!
//! A [`State`] is either a fundamental leaf, reducing one querier's raw
//! result to a boolean, or a composite combining other states with NOT,
//! OR or AND. The variant set is closed, so every operation is an
//! exhaustive match.
//!
//! Children are immutable `Arc`s that must exist before their parent is
//! built. A state can therefore never contain itself, and traversals
//! always terminate.

use crate::error::{BoxError, StateError};
use crate::fingerprint::{ContentHash, structure_hash};
use crate::id::{QuerierId, StateId};
use crate::naming::canonicalize;
use crate::policy::{EvalPolicy, InspectOptions};
use crate::querier::{AnyQuerier, Querier};
use crate::report::Evaluation;
use crate::truthy::Truthy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// The shape of a state node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    Fundamental,
    Negation,
    Disjunction,
    Conjunction,
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fundamental => write!(f, "fundamental"),
            Self::Negation => write!(f, "negation"),
            Self::Disjunction => write!(f, "disjunction"),
            Self::Conjunction => write!(f, "conjunction"),
        }
    }
}

/// The combinator of a composite state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeKind {
    /// Exactly one child, inverted.
    Negation,
    /// OR over one or more children.
    Disjunction,
    /// AND over one or more children.
    Conjunction,
}

impl CompositeKind {
    /// Separator used when deriving a default name from the children.
    fn joiner(self) -> &'static str {
        match self {
            Self::Negation => "",
            Self::Disjunction => " or ",
            Self::Conjunction => " and ",
        }
    }
}

impl From<CompositeKind> for StateKind {
    fn from(kind: CompositeKind) -> Self {
        match kind {
            CompositeKind::Negation => Self::Negation,
            CompositeKind::Disjunction => Self::Disjunction,
            CompositeKind::Conjunction => Self::Conjunction,
        }
    }
}

impl fmt::Display for CompositeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        StateKind::from(*self).fmt(f)
    }
}

/// Identity and naming shared by every state.
struct Header {
    id: StateId,
    name: String,
    canonical_name: OnceLock<String>,
    fingerprint: OnceLock<ContentHash>,
}

impl Header {
    fn new(name: String) -> Self {
        Self {
            id: StateId::generate(),
            name,
            canonical_name: OnceLock::new(),
            fingerprint: OnceLock::new(),
        }
    }

    fn canonical_name(&self) -> &str {
        self.canonical_name.get_or_init(|| canonicalize(&self.name))
    }

    // A canonical name already derived or supplied is kept.
    fn rename(&mut self, name: String) {
        self.name = name;
    }

    fn set_canonical_name(&mut self, canonical: String) {
        self.canonical_name = OnceLock::from(canonical);
        self.fingerprint = OnceLock::new();
    }
}

/// A boolean-valued, cacheable node.
#[derive(Debug)]
pub enum State {
    Fundamental(FundamentalState),
    Composite(CompositeState),
}

impl State {
    /// Logical NOT of `target`, named `"NOT <target name>"`.
    pub fn negation(target: impl Into<Arc<State>>) -> Self {
        Self::Composite(CompositeState::build(
            CompositeKind::Negation,
            vec![target.into()],
        ))
    }

    /// Logical OR over `children`, evaluated left to right.
    ///
    /// Fails when `children` is empty.
    pub fn disjunction<I, S>(children: I) -> Result<Self, StateError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<State>>,
    {
        CompositeState::many(CompositeKind::Disjunction, children).map(Self::Composite)
    }

    /// Logical AND over `children`, evaluated left to right.
    ///
    /// Fails when `children` is empty.
    pub fn conjunction<I, S>(children: I) -> Result<Self, StateError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<State>>,
    {
        CompositeState::many(CompositeKind::Conjunction, children).map(Self::Composite)
    }

    /// Replace the display name.
    ///
    /// The canonical name is derived at most once: if it was already read
    /// (or supplied) it stays as it was, otherwise it will come from `name`.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.header_mut().rename(name.into());
        self
    }

    /// Supply the canonical name instead of deriving it.
    pub fn with_canonical_name(mut self, canonical: impl Into<String>) -> Self {
        self.header_mut().set_canonical_name(canonical.into());
        self
    }

    /// Move into an `Arc` so the state can be a child of several trees.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn id(&self) -> StateId {
        self.header().id
    }

    pub fn name(&self) -> &str {
        &self.header().name
    }

    /// Lower-cased, punctuation-free, underscore-joined form of the name.
    ///
    /// Derived on first access and memoized for the life of the state.
    pub fn canonical_name(&self) -> &str {
        self.header().canonical_name()
    }

    pub fn kind(&self) -> StateKind {
        match self {
            Self::Fundamental(_) => StateKind::Fundamental,
            Self::Composite(c) => c.kind.into(),
        }
    }

    /// Immediate sub-states, empty for leaves.
    pub fn children(&self) -> &[Arc<State>] {
        match self {
            Self::Fundamental(_) => &[],
            Self::Composite(c) => &c.children,
        }
    }

    /// Every querier reachable from this state, each listed once.
    ///
    /// Queriers are deduplicated by identity and listed in depth-first,
    /// first-seen order.
    pub fn queriers(&self) -> &[Arc<dyn AnyQuerier>] {
        match self {
            Self::Fundamental(f) => std::slice::from_ref(&f.querier),
            Self::Composite(c) => c.queriers(),
        }
    }

    /// Clear every querier in the subtree exactly once.
    pub fn clear_caches(&self) {
        let queriers = self.queriers();
        tracing::debug!(
            state = %self.canonical_name(),
            queriers = queriers.len(),
            "flushing subtree caches"
        );
        for querier in queriers {
            querier.clear();
        }
    }

    /// Evaluate the state with the default short-circuit policy.
    ///
    /// With `use_cache == false` the whole subtree is flushed first, so
    /// every querier consulted by this call fetches a fresh value.
    pub fn inspect(&self, use_cache: bool) -> Result<bool, StateError> {
        self.inspect_with(InspectOptions {
            use_cache,
            ..InspectOptions::default()
        })
    }

    pub fn inspect_with(&self, options: InspectOptions) -> Result<bool, StateError> {
        self.prepare(options);
        let value = self.evaluate(options.policy)?;
        tracing::trace!(state = %self.canonical_name(), value, "inspected");
        Ok(value)
    }

    /// Evaluate the state and return the trace of every node visited.
    pub fn explain(&self, options: InspectOptions) -> Result<Evaluation, StateError> {
        self.prepare(options);
        let report = self.trace(options.policy)?;
        tracing::trace!(state = %self.canonical_name(), value = report.value, "explained");
        Ok(report)
    }

    /// Structural hash over kinds and canonical names.
    ///
    /// Independent of ids and cache contents; two trees built the same
    /// way from the same names share a fingerprint.
    pub fn fingerprint(&self) -> &ContentHash {
        self.header()
            .fingerprint
            .get_or_init(|| structure_hash(self))
    }

    fn prepare(&self, options: InspectOptions) {
        if !options.use_cache {
            self.clear_caches();
        }
    }

    fn evaluate(&self, policy: EvalPolicy) -> Result<bool, StateError> {
        match self {
            Self::Fundamental(f) => Ok(f.probe.read(&f.header.name)?.value),
            Self::Composite(c) => c
                .decide(policy, |child| child.evaluate(policy))
                .map(|(value, _)| value),
        }
    }

    fn trace(&self, policy: EvalPolicy) -> Result<Evaluation, StateError> {
        match self {
            Self::Fundamental(f) => {
                let reading = f.probe.read(&f.header.name)?;
                let mut report = self.report_node(reading.value);
                report.querier = Some(f.querier.name().to_string());
                report.cache_hit = Some(reading.cache_hit);
                Ok(report)
            }
            Self::Composite(c) => {
                let mut children = Vec::new();
                let (value, visited) = c.decide(policy, |child| {
                    let report = child.trace(policy)?;
                    let value = report.value;
                    children.push(report);
                    Ok(value)
                })?;
                let mut report = self.report_node(value);
                report.children = children;
                report.skipped = c.children[visited..]
                    .iter()
                    .map(|s| s.canonical_name().to_string())
                    .collect();
                Ok(report)
            }
        }
    }

    fn report_node(&self, value: bool) -> Evaluation {
        Evaluation {
            name: self.name().to_string(),
            canonical_name: self.canonical_name().to_string(),
            kind: self.kind(),
            value,
            querier: None,
            cache_hit: None,
            children: Vec::new(),
            skipped: Vec::new(),
        }
    }

    fn header(&self) -> &Header {
        match self {
            Self::Fundamental(f) => &f.header,
            Self::Composite(c) => &c.header,
        }
    }

    fn header_mut(&mut self) -> &mut Header {
        match self {
            Self::Fundamental(f) => &mut f.header,
            Self::Composite(c) => &mut c.header,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<FundamentalState> for State {
    fn from(state: FundamentalState) -> Self {
        Self::Fundamental(state)
    }
}

impl From<FundamentalState> for Arc<State> {
    fn from(state: FundamentalState) -> Self {
        Arc::new(State::Fundamental(state))
    }
}

type Evaluator<T> = Box<dyn Fn(&T) -> Result<bool, BoxError> + Send + Sync>;

struct Reading {
    value: bool,
    cache_hit: bool,
}

/// A querier bound to its evaluator, with the result type erased.
trait Probe: Send + Sync {
    fn read(&self, state: &str) -> Result<Reading, StateError>;
}

struct Bound<T> {
    querier: Arc<Querier<T>>,
    evaluator: Evaluator<T>,
}

impl<T: Clone + Send + 'static> Probe for Bound<T> {
    fn read(&self, state: &str) -> Result<Reading, StateError> {
        let (raw, cache_hit) = self.querier.lookup(true)?;
        let value = (self.evaluator)(&raw).map_err(|source| StateError::Evaluation {
            state: state.to_string(),
            source,
        })?;
        Ok(Reading { value, cache_hit })
    }
}

/// Leaf state: one querier and an evaluator turning its result into a
/// boolean.
pub struct FundamentalState {
    header: Header,
    querier: Arc<dyn AnyQuerier>,
    probe: Box<dyn Probe>,
}

impl FundamentalState {
    /// Bind `querier` with an evaluator that cannot fail.
    pub fn new<T, F>(name: impl Into<String>, querier: Arc<Querier<T>>, evaluator: F) -> Self
    where
        T: Clone + Send + 'static,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::fallible(name, querier, move |raw: &T| Ok(evaluator(raw)))
    }

    /// Bind `querier` with an evaluator that may reject the raw value.
    pub fn fallible<T, F>(name: impl Into<String>, querier: Arc<Querier<T>>, evaluator: F) -> Self
    where
        T: Clone + Send + 'static,
        F: Fn(&T) -> Result<bool, BoxError> + Send + Sync + 'static,
    {
        let erased: Arc<dyn AnyQuerier> = querier.clone();
        Self {
            header: Header::new(name.into()),
            querier: erased,
            probe: Box::new(Bound {
                querier,
                evaluator: Box::new(evaluator),
            }),
        }
    }

    /// Bind `querier` using the raw value's [`Truthy`] conversion.
    pub fn truthy<T>(name: impl Into<String>, querier: Arc<Querier<T>>) -> Self
    where
        T: Truthy + Clone + Send + 'static,
    {
        Self::new(name, querier, T::truthy)
    }

    /// Supply the canonical name instead of deriving it.
    pub fn with_canonical_name(mut self, canonical: impl Into<String>) -> Self {
        self.header.set_canonical_name(canonical.into());
        self
    }

    pub fn id(&self) -> StateId {
        self.header.id
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn canonical_name(&self) -> &str {
        self.header.canonical_name()
    }

    pub fn querier(&self) -> &Arc<dyn AnyQuerier> {
        &self.querier
    }

    /// Query (through the cache unless `use_cache` is false) and apply
    /// the evaluator.
    pub fn inspect(&self, use_cache: bool) -> Result<bool, StateError> {
        if !use_cache {
            self.querier.clear();
        }
        self.probe.read(&self.header.name).map(|r| r.value)
    }
}

impl fmt::Debug for FundamentalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FundamentalState")
            .field("id", &self.header.id)
            .field("name", &self.header.name)
            .field("querier", &self.querier.name())
            .finish()
    }
}

/// NOT / OR / AND over other states.
pub struct CompositeState {
    header: Header,
    kind: CompositeKind,
    children: Vec<Arc<State>>,
    queriers: OnceLock<Vec<Arc<dyn AnyQuerier>>>,
}

impl CompositeState {
    fn build(kind: CompositeKind, children: Vec<Arc<State>>) -> Self {
        let name = match kind {
            CompositeKind::Negation => format!("NOT {}", children[0].name()),
            CompositeKind::Disjunction | CompositeKind::Conjunction => children
                .iter()
                .map(|child| child.name())
                .collect::<Vec<_>>()
                .join(kind.joiner()),
        };
        Self {
            header: Header::new(name),
            kind,
            children,
            queriers: OnceLock::new(),
        }
    }

    fn many<I, S>(kind: CompositeKind, children: I) -> Result<Self, StateError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<State>>,
    {
        let children: Vec<Arc<State>> = children.into_iter().map(Into::into).collect();
        if children.is_empty() {
            return Err(StateError::EmptyComposite { kind });
        }
        Ok(Self::build(kind, children))
    }

    pub fn kind(&self) -> CompositeKind {
        self.kind
    }

    pub fn children(&self) -> &[Arc<State>] {
        &self.children
    }

    /// Combine child values left to right through `visit`.
    ///
    /// Returns the composite's value and how many children were visited;
    /// under `ShortCircuit` the rest were never evaluated.
    fn decide<F>(&self, policy: EvalPolicy, mut visit: F) -> Result<(bool, usize), StateError>
    where
        F: FnMut(&State) -> Result<bool, StateError>,
    {
        if self.kind == CompositeKind::Negation {
            let value = visit(&self.children[0])?;
            return Ok((!value, 1));
        }
        // OR is decided by the first true child, AND by the first false one.
        let decisive = self.kind == CompositeKind::Disjunction;
        let mut result = !decisive;
        for (index, child) in self.children.iter().enumerate() {
            if visit(child)? == decisive {
                result = decisive;
                if policy == EvalPolicy::ShortCircuit {
                    return Ok((result, index + 1));
                }
            }
        }
        Ok((result, self.children.len()))
    }

    fn queriers(&self) -> &[Arc<dyn AnyQuerier>] {
        self.queriers.get_or_init(|| {
            let mut seen: HashSet<QuerierId> = HashSet::new();
            let mut out = Vec::new();
            for child in &self.children {
                for querier in child.queriers() {
                    if seen.insert(querier.id()) {
                        out.push(Arc::clone(querier));
                    }
                }
            }
            out
        })
    }
}

impl fmt::Debug for CompositeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeState")
            .field("id", &self.header.id)
            .field("kind", &self.kind)
            .field("name", &self.header.name)
            .field("children", &self.children)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::counter;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn constant(name: &str, value: bool) -> FundamentalState {
        let q = Querier::infallible(format!("{name} Querier"), move || value).shared();
        FundamentalState::truthy(name, q)
    }

    fn switch(initial: bool) -> (Arc<AtomicBool>, Arc<Querier<bool>>) {
        let source = Arc::new(AtomicBool::new(initial));
        let reader = Arc::clone(&source);
        let q = Querier::infallible("Switch", move || reader.load(Ordering::SeqCst)).shared();
        (source, q)
    }

    #[test]
    fn fundamental_reads_through_evaluator() {
        let q = Querier::infallible("Level", || 0.75_f64).shared();
        let high = State::from(FundamentalState::new("High Level", q, |v: &f64| *v > 0.5));
        assert!(high.inspect(true).unwrap());
        assert!(high.children().is_empty());
        assert_eq!(high.queriers().len(), 1);
        assert_eq!(high.kind(), StateKind::Fundamental);
    }

    #[test]
    fn canonical_name_memoized() {
        let state = State::from(constant("Always True State", true));
        let before = counter::derivations();
        assert_eq!(state.canonical_name(), "always_true_state");
        assert_eq!(state.canonical_name(), "always_true_state");
        assert_eq!(counter::derivations(), before + 1);
    }

    #[test]
    fn supplied_canonical_name_skips_derivation() {
        let before = counter::derivations();
        let state = State::from(constant("Anything", true).with_canonical_name("custom"));
        assert_eq!(state.canonical_name(), "custom");
        let renamed = state.with_name("Something Else");
        assert_eq!(renamed.canonical_name(), "custom");
        assert_eq!(counter::derivations(), before);
    }

    #[test]
    fn rename_keeps_memoized_canonical_name() {
        let state = State::from(constant("First Name", true));
        let id = state.id();
        assert_eq!(state.canonical_name(), "first_name");
        let derived = counter::derivations();

        let state = state.with_name("Second Name");
        assert_eq!(state.id(), id);
        assert_eq!(state.name(), "Second Name");
        assert_eq!(state.canonical_name(), "first_name");
        assert_eq!(counter::derivations(), derived);
    }

    #[test]
    fn rename_before_first_read_derives_from_new_name() {
        let state = State::from(constant("First Name", true)).with_name("Second Name");
        assert_eq!(state.canonical_name(), "second_name");
    }

    #[test]
    fn cached_inspect_ignores_source_changes() {
        let (source, q) = switch(false);
        let state = State::from(FundamentalState::truthy("Switch On", q));

        assert!(!state.inspect(true).unwrap());
        source.store(true, Ordering::SeqCst);
        assert!(!state.inspect(true).unwrap());
        assert!(state.inspect(false).unwrap());

        source.store(false, Ordering::SeqCst);
        assert!(state.inspect(true).unwrap());
        state.clear_caches();
        assert!(!state.inspect(true).unwrap());
    }

    #[test]
    fn fundamental_inspect_directly() {
        let (source, q) = switch(true);
        let leaf = FundamentalState::truthy("Switch On", q);
        assert!(leaf.inspect(true).unwrap());
        source.store(false, Ordering::SeqCst);
        assert!(leaf.inspect(true).unwrap());
        assert!(!leaf.inspect(false).unwrap());
    }

    #[test]
    fn default_names() {
        let a = constant("A", true).into_shared();
        let b = constant("B", false).into_shared();

        let not_a = State::negation(Arc::clone(&a));
        assert_eq!(not_a.name(), "NOT A");

        let or = State::disjunction([Arc::clone(&a), Arc::clone(&b)]).unwrap();
        assert_eq!(or.name(), "A or B");

        let and = State::conjunction([a, b]).unwrap();
        assert_eq!(and.name(), "A and B");
        assert_eq!(and.canonical_name(), "a_and_b");

        let named = State::negation(and).with_name("Neither");
        assert_eq!(named.name(), "Neither");
    }

    #[test]
    fn empty_composites_fail() {
        let err = State::disjunction(Vec::<Arc<State>>::new()).unwrap_err();
        assert!(matches!(
            err,
            StateError::EmptyComposite {
                kind: CompositeKind::Disjunction
            }
        ));
        let err = State::conjunction(Vec::<State>::new()).unwrap_err();
        assert!(err.is_construction());
    }

    #[test]
    fn truth_tables() {
        for a in [false, true] {
            for b in [false, true] {
                let sa = constant("A", a).into_shared();
                let sb = constant("B", b).into_shared();
                let and = State::conjunction([Arc::clone(&sa), Arc::clone(&sb)]).unwrap();
                let or = State::disjunction([Arc::clone(&sa), Arc::clone(&sb)]).unwrap();
                let not = State::negation(sa);
                assert_eq!(and.inspect(true).unwrap(), a && b, "{a} AND {b}");
                assert_eq!(or.inspect(true).unwrap(), a || b, "{a} OR {b}");
                assert_eq!(not.inspect(true).unwrap(), !a, "NOT {a}");
            }
        }
    }

    #[test]
    fn queriers_deduplicated_across_shared_leaves() {
        let shared = Querier::infallible("Shared", || 3_u32).shared();
        let other = Querier::infallible("Other", || 0_u32).shared();

        let positive = FundamentalState::new("Positive", Arc::clone(&shared), |v: &u32| *v > 0);
        let odd = FundamentalState::new("Odd", Arc::clone(&shared), |v: &u32| v % 2 == 1);
        let zero = FundamentalState::new("Zero", Arc::clone(&other), |v: &u32| *v == 0);

        let inner = State::conjunction([positive, odd]).unwrap();
        let root = State::disjunction([inner, State::from(zero)]).unwrap();

        let ids: Vec<QuerierId> = root.queriers().iter().map(|q| q.id()).collect();
        assert_eq!(ids, vec![shared.id(), other.id()]);
    }

    #[test]
    fn uncached_inspect_flushes_whole_subtree() {
        let (source, q) = switch(false);
        let deep = FundamentalState::truthy("Deep", q);
        let root = State::negation(State::negation(State::negation(deep)));

        assert!(root.inspect(true).unwrap());
        source.store(true, Ordering::SeqCst);
        assert!(root.inspect(true).unwrap());
        assert!(!root.inspect(false).unwrap());
    }

    #[test]
    fn shared_querier_fetched_once_per_uncached_inspect() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let q = Querier::infallible("Counted", move || {
            seen.fetch_add(1, Ordering::SeqCst);
            true
        })
        .shared();

        let a = FundamentalState::truthy("A", Arc::clone(&q));
        let b = FundamentalState::truthy("B", Arc::clone(&q));
        let root = State::conjunction([a, b]).unwrap();

        root.inspect(false).unwrap();
        root.inspect(false).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn short_circuit_and_exhaustive_policies() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let probe = Querier::infallible("Probe", move || {
            seen.fetch_add(1, Ordering::SeqCst);
            false
        })
        .shared();

        let root = State::disjunction([
            State::from(constant("Yes", true)),
            State::from(FundamentalState::truthy("Probe Set", probe)),
        ])
        .unwrap();

        assert!(root.inspect_with(InspectOptions::fresh()).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let exhaustive = InspectOptions::fresh().with_policy(EvalPolicy::Exhaustive);
        assert!(root.inspect_with(exhaustive).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn evaluator_failure_propagates() {
        let q = Querier::infallible("Reading", || "n/a".to_string()).shared();
        let leaf = FundamentalState::fallible("Parsed", q, |raw: &String| {
            raw.parse::<i32>()
                .map(|n| n > 0)
                .map_err(|e| Box::new(e) as BoxError)
        });
        let root = State::negation(leaf);

        match root.inspect(true).unwrap_err() {
            StateError::Evaluation { state, source } => {
                assert_eq!(state, "Parsed");
                assert_eq!(source.to_string(), "invalid digit found in string");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn query_failure_propagates() {
        let q = Querier::<bool>::new("Broken", || Err("unreachable host".into())).shared();
        let root = State::conjunction([FundamentalState::truthy("Up", q)]).unwrap();
        let err = root.inspect(true).unwrap_err();
        assert!(matches!(err, StateError::Query(ref e) if e.querier == "Broken"));
    }

    #[test]
    fn ids_are_unique() {
        let a = State::from(constant("Same", true));
        let b = State::from(constant("Same", true));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn state_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<State>();
        assert_send_sync::<Querier<String>>();
    }

    #[test]
    fn explain_agrees_with_inspect() {
        for policy in [EvalPolicy::ShortCircuit, EvalPolicy::Exhaustive] {
            let options = InspectOptions::cached().with_policy(policy);
            for a in [false, true] {
                for b in [false, true] {
                    let or = State::disjunction([
                        constant("A", a).into_shared(),
                        constant("B", b).into_shared(),
                    ])
                    .unwrap();
                    let not = State::negation(or);
                    let report = not.explain(options).unwrap();
                    assert_eq!(report.value, not.inspect_with(options).unwrap());
                    assert_eq!(report.children.len(), 1);
                    assert!(report.skipped.is_empty());

                    let or_report = &report.children[0];
                    let expected_skipped: Vec<String> =
                        if a && policy == EvalPolicy::ShortCircuit {
                            vec!["b".to_string()]
                        } else {
                            Vec::new()
                        };
                    assert_eq!(or_report.skipped, expected_skipped);
                    assert_eq!(
                        or_report.children.len() + or_report.skipped.len(),
                        2
                    );
                }
            }
        }
    }

    impl FundamentalState {
        fn into_shared(self) -> Arc<State> {
            self.into()
        }
    }
}
