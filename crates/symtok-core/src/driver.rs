use crate::fault::Fault;
use crate::identity::Semantic;
use crate::stack::ParseStack;
use crate::state::State;
use crate::symbol::{Cont, Symbol};
use std::cell::RefCell;
use std::rc::Rc;

impl<D: Semantic, E: Semantic> Symbol<D, E> {
    pub fn generate(&self, target: &str, seed: D) -> Parses<D, E> {
        self.generate_at(target, seed, 0)
    }

    pub fn generate_at(&self, target: &str, seed: D, index: usize) -> Parses<D, E> {
        let mut stack = ParseStack::new();
        let collected = Rc::new(RefCell::new(Vec::new()));
        let sink: Cont<D, E> = {
            let collected = Rc::clone(&collected);
            Rc::new(move |state, _stack: &mut ParseStack<D, E>| {
                collected.borrow_mut().push(state);
            })
        };
        self.apply(State::start(target, seed, index), sink, &mut stack);
        Parses { root: self.clone(), stack, collected, yielded: 0, done: false }
    }

    pub fn run(&self, target: &str, seed: D) -> Result<Vec<State<D, E>>, Fault> {
        self.run_at(target, seed, 0)
    }

    pub fn run_at(&self, target: &str, seed: D, index: usize) -> Result<Vec<State<D, E>>, Fault> {
        let mut all = Vec::new();
        for produced in self.generate_at(target, seed, index) {
            all.push(produced?);
        }
        let best = select_best(all);
        tracing::debug!(
            results = best.len(),
            index = ?best.first().map(State::index),
            "symbol run finished"
        );
        Ok(best)
    }

    pub async fn run_async(&self, target: &str, seed: D) -> Result<Vec<State<D, E>>, Fault> {
        self.run_async_at(target, seed, 0).await
    }

    pub async fn run_async_at(
        &self,
        target: &str,
        seed: D,
        index: usize,
    ) -> Result<Vec<State<D, E>>, Fault> {
        let mut all = Vec::new();
        for produced in self.generate_at(target, seed, index) {
            all.push(std::future::ready(produced).await?);
        }
        Ok(select_best(all))
    }
}

pub struct Parses<D, E> {
    // Keeps the grammar alive for as long as the search can still produce
    // results.
    #[allow(dead_code)]
    root: Symbol<D, E>,
    stack: ParseStack<D, E>,
    collected: Rc<RefCell<Vec<State<D, E>>>>,
    yielded: usize,
    done: bool,
}

impl<D: Semantic, E: Semantic> Iterator for Parses<D, E> {
    type Item = Result<State<D, E>, Fault>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let pending = self.collected.borrow().len();
            if self.yielded < pending {
                let state = self.collected.borrow()[self.yielded].clone();
                self.yielded += 1;
                return Some(Ok(state));
            }
            if let Some(fault) = self.stack.take_fault() {
                self.done = true;
                return Some(Err(fault));
            }
            let Some(item) = self.stack.pop() else {
                self.done = true;
                return None;
            };
            tracing::trace!("running deferred work item");
            item.run(&mut self.stack);
        }
    }
}

// The farthest-progress parses: maximum index, non-error states preferred,
// error states at that index otherwise.
fn select_best<D: Semantic, E: Semantic>(mut all: Vec<State<D, E>>) -> Vec<State<D, E>> {
    all.sort_by_key(State::index);
    let Some(max) = all.last().map(State::index) else { return all };
    let (oks, errs): (Vec<_>, Vec<_>) =
        all.into_iter().filter(|s| s.index() == max).partition(|s| !s.is_err());
    if oks.is_empty() {
        errs
    } else {
        oks
    }
}
