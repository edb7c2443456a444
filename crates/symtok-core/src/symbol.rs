use crate::fault::{max_ambiguity_breadth, Fault};
use crate::identity::Semantic;
use crate::memo::Memo;
use crate::stack::ParseStack;
use crate::state::State;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::{Rc, Weak};

pub type Cont<D, E> = Rc<dyn Fn(State<D, E>, &mut ParseStack<D, E>)>;

// Each memo entry stores the distinct results produced from one input
// state (keyed by identity, kept in publication order) together with the
// continuations subscribed to it. The transformer itself is scheduled at
// most once per input identity.
pub struct Symbol<D, E> {
    inner: Rc<SymbolInner<D, E>>,
}

pub(crate) struct SymbolInner<D, E> {
    #[allow(clippy::type_complexity)]
    pub(crate) transform: Box<dyn Fn(State<D, E>, Cont<D, E>, &mut ParseStack<D, E>)>,
    memo: RefCell<Memo<SymbolEntry<D, E>>>,
}

struct SymbolEntry<D, E> {
    results: Vec<State<D, E>>,
    seen: HashSet<String>,
    completed: usize,
    continuations: Vec<Cont<D, E>>,
}

impl<D, E> SymbolEntry<D, E> {
    fn subscribed(kont: Cont<D, E>) -> Self {
        Self {
            results: Vec::new(),
            seen: HashSet::new(),
            completed: 0,
            continuations: vec![kont],
        }
    }
}

impl<D, E> Clone for Symbol<D, E> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<D: Semantic, E: Semantic> Symbol<D, E> {
    pub fn new(transform: impl Fn(State<D, E>, Cont<D, E>, &mut ParseStack<D, E>) + 'static) -> Self {
        Self {
            inner: Rc::new(SymbolInner {
                transform: Box::new(transform),
                memo: RefCell::new(Memo::new()),
            }),
        }
    }

    pub fn apply(&self, state: State<D, E>, kont: Cont<D, E>, stack: &mut ParseStack<D, E>) {
        let key = state.identity();
        let replay = {
            let mut memo = self.inner.memo.borrow_mut();
            memo.roll(state.target_rc());
            match memo.get_mut(&key) {
                Some(entry) => {
                    entry.continuations.push(Rc::clone(&kont));
                    Some(entry.results.clone())
                }
                None => {
                    memo.insert(key.clone(), SymbolEntry::subscribed(Rc::clone(&kont)));
                    None
                }
            }
        };
        match replay {
            Some(results) => {
                tracing::trace!(key = %key, known = results.len(), "symbol memo hit");
                for result in results {
                    kont(result, stack);
                }
            }
            None => {
                let publisher = self.publisher(key);
                stack.push(Rc::clone(&self.inner), state, publisher);
            }
        }
    }

    // Stores each new distinct result under `key` and replays it to every
    // subscriber; results already seen are dropped.
    fn publisher(&self, key: String) -> Cont<D, E> {
        let inner: Weak<SymbolInner<D, E>> = Rc::downgrade(&self.inner);
        Rc::new(move |result: State<D, E>, stack: &mut ParseStack<D, E>| {
            let Some(inner) = inner.upgrade() else { return };
            if stack.faulted() {
                return;
            }
            let subscribers = {
                let mut memo = inner.memo.borrow_mut();
                let Some(entry) = memo.get_mut(&key) else { return };
                if !entry.seen.insert(result.identity()) {
                    return;
                }
                entry.results.push(result.clone());
                if result.index() == result.target().len() {
                    entry.completed += 1;
                    if let Some(limit) = max_ambiguity_breadth() {
                        if entry.completed > limit.get() {
                            stack.record_fault(Fault::BreadthExceeded { limit: limit.get() });
                            return;
                        }
                    }
                }
                entry.continuations.clone()
            };
            for subscriber in subscribers {
                subscriber(result.clone(), stack);
            }
        })
    }
}
