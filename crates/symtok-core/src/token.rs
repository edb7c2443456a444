use crate::identity::Semantic;
use crate::memo::Memo;
use crate::state::State;
use std::cell::RefCell;
use std::rc::Rc;

pub struct Token<D, E> {
    inner: Rc<TokenInner<D, E>>,
}

struct TokenInner<D, E> {
    transform: Box<dyn Fn(State<D, E>) -> State<D, E>>,
    memo: RefCell<Memo<State<D, E>>>,
}

impl<D, E> Clone for Token<D, E> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<D: Semantic, E: Semantic> Token<D, E> {
    pub fn new(transform: impl Fn(State<D, E>) -> State<D, E> + 'static) -> Self {
        Self {
            inner: Rc::new(TokenInner {
                transform: Box::new(transform),
                memo: RefCell::new(Memo::new()),
            }),
        }
    }

    pub fn apply(&self, state: State<D, E>) -> State<D, E> {
        let key = {
            let mut memo = self.inner.memo.borrow_mut();
            memo.roll(state.target_rc());
            let key = state.identity();
            if let Some(hit) = memo.get(&key) {
                tracing::trace!(key = %key, "token memo hit");
                return hit.clone();
            }
            key
        };
        // The borrow is released here: the transformer may apply this same
        // parser again at another position.
        let out = (self.inner.transform)(state);
        self.inner.memo.borrow_mut().insert(key, out.clone());
        out
    }

    pub fn run(&self, target: &str, seed: D) -> State<D, E> {
        self.run_at(target, seed, 0)
    }

    pub fn run_at(&self, target: &str, seed: D, index: usize) -> State<D, E> {
        let out = self.apply(State::start(target, seed, index));
        tracing::debug!(index = out.index(), failed = out.is_err(), "token run finished");
        out
    }
}
