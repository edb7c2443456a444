use crate::fault::Fault;
use crate::state::State;
use crate::symbol::{Cont, SymbolInner};
use std::collections::HashSet;
use std::rc::Rc;

// A LIFO, so alternatives are explored depth first. The pending set keyed
// by (transformer address, state identity) refuses duplicate pushes.
pub struct ParseStack<D, E> {
    items: Vec<WorkItem<D, E>>,
    pending: HashSet<(usize, String)>,
    fault: Option<Fault>,
}

pub(crate) struct WorkItem<D, E> {
    key: (usize, String),
    task: Rc<SymbolInner<D, E>>,
    state: State<D, E>,
    kont: Cont<D, E>,
}

impl<D, E> ParseStack<D, E> {
    pub(crate) fn new() -> Self {
        Self { items: Vec::new(), pending: HashSet::new(), fault: None }
    }

    pub(crate) fn push(&mut self, task: Rc<SymbolInner<D, E>>, state: State<D, E>, kont: Cont<D, E>)
    where
        D: crate::identity::Semantic,
        E: crate::identity::Semantic,
    {
        let key = (Rc::as_ptr(&task) as *const () as usize, state.identity());
        if self.pending.contains(&key) {
            return;
        }
        self.pending.insert(key.clone());
        self.items.push(WorkItem { key, task, state, kont });
    }

    pub(crate) fn pop(&mut self) -> Option<WorkItem<D, E>> {
        let item = self.items.pop()?;
        self.pending.remove(&item.key);
        Some(item)
    }

    pub(crate) fn record_fault(&mut self, fault: Fault) {
        if self.fault.is_none() {
            self.fault = Some(fault);
        }
    }

    pub(crate) fn take_fault(&mut self) -> Option<Fault> {
        self.fault.take()
    }

    pub(crate) fn faulted(&self) -> bool {
        self.fault.is_some()
    }
}

impl<D, E> WorkItem<D, E> {
    pub(crate) fn run(self, stack: &mut ParseStack<D, E>) {
        (self.task.transform)(self.state, self.kont, stack);
    }
}
