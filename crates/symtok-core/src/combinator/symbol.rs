use super::token::Action;
use crate::identity::Semantic;
use crate::stack::ParseStack;
use crate::state::State;
use crate::symbol::{Cont, Symbol};
use crate::token::Token;
use std::cell::{OnceCell, RefCell};
use std::rc::Rc;

pub fn empty<D: Semantic, E: Semantic>() -> Symbol<D, E> {
    Symbol::new(|state, kont: Cont<D, E>, stack| kont(state, stack))
}

pub fn to_symbol<D: Semantic, E: Semantic>(token: Token<D, E>) -> Symbol<D, E> {
    Symbol::new(move |state, kont: Cont<D, E>, stack| {
        let out = token.apply(state);
        kont(out, stack);
    })
}

pub fn lazy<D: Semantic, E: Semantic>(thunk: impl Fn() -> Symbol<D, E> + 'static) -> Symbol<D, E> {
    let cell: OnceCell<Symbol<D, E>> = OnceCell::new();
    Symbol::new(move |state, kont, stack| {
        cell.get_or_init(&thunk).apply(state, kont, stack);
    })
}

// Ties the knot for a self-referential grammar: `build` receives a handle
// to the parser being defined and returns its definition.
pub fn recursive<D: Semantic, E: Semantic>(
    build: impl FnOnce(Symbol<D, E>) -> Symbol<D, E>,
) -> Symbol<D, E> {
    let slot: Rc<RefCell<Option<Symbol<D, E>>>> = Rc::new(RefCell::new(None));
    let handle = lazy({
        let slot = Rc::clone(&slot);
        move || slot.borrow().clone().unwrap()
    });
    let symbol = build(handle);
    *slot.borrow_mut() = Some(symbol.clone());
    symbol
}

pub fn alternatives<D: Semantic, E: Semantic>(ps: Vec<Symbol<D, E>>) -> Symbol<D, E> {
    Symbol::new(move |state: State<D, E>, kont: Cont<D, E>, stack| {
        if state.is_err() {
            kont(state, stack);
            return;
        }
        for p in &ps {
            p.apply(state.clone(), Rc::clone(&kont), stack);
        }
    })
}

pub fn map<D: Semantic, E: Semantic>(
    p: Symbol<D, E>,
    on_ok: impl Fn(&State<D, E>) -> D + 'static,
    on_err: impl Fn(&State<D, E>) -> E + 'static,
) -> Symbol<D, E> {
    let on_ok: Rc<dyn Fn(&State<D, E>) -> D> = Rc::new(on_ok);
    let on_err: Rc<dyn Fn(&State<D, E>) -> E> = Rc::new(on_err);
    Symbol::new(move |state, kont: Cont<D, E>, stack| {
        let on_ok = Rc::clone(&on_ok);
        let on_err = Rc::clone(&on_err);
        let mapped: Cont<D, E> = Rc::new(move |out: State<D, E>, stack: &mut ParseStack<D, E>| {
            let out = if out.is_err() {
                let error = on_err(&out);
                out.with_error(error)
            } else {
                let data = on_ok(&out);
                out.with_data(data)
            };
            kont(out, stack);
        });
        p.apply(state, mapped, stack);
    })
}

pub fn verify<D: Semantic, E: Semantic>(
    p: Symbol<D, E>,
    check: impl Fn(&State<D, E>) -> Option<E> + 'static,
) -> Symbol<D, E> {
    let check: Rc<dyn Fn(&State<D, E>) -> Option<E>> = Rc::new(check);
    Symbol::new(move |state, kont: Cont<D, E>, stack| {
        let check = Rc::clone(&check);
        let checked: Cont<D, E> = Rc::new(move |out: State<D, E>, stack: &mut ParseStack<D, E>| {
            if out.is_err() {
                kont(out, stack);
                return;
            }
            match check(&out) {
                Some(error) => {
                    let out = out.with_error(error);
                    kont(out, stack);
                }
                None => kont(out, stack),
            }
        });
        p.apply(state, checked, stack);
    })
}

fn chain_impl<D: Semantic, E: Semantic>(
    ps: Vec<Symbol<D, E>>,
    action: Option<Action<D>>,
) -> Symbol<D, E> {
    let ps: Rc<[Symbol<D, E>]> = ps.into();
    Symbol::new(move |state: State<D, E>, kont: Cont<D, E>, stack| {
        if state.is_err() {
            kont(state, stack);
            return;
        }
        chain_step(Rc::clone(&ps), 0, Vec::new(), state, kont, action.clone(), stack);
    })
}

// Step failures are threaded through the remaining steps, so an in-chain
// recovery can resynchronise; the action runs only for fully successful
// sequences.
fn chain_step<D: Semantic, E: Semantic>(
    ps: Rc<[Symbol<D, E>]>,
    step: usize,
    collected: Vec<Option<D>>,
    state: State<D, E>,
    kont: Cont<D, E>,
    action: Option<Action<D>>,
    stack: &mut ParseStack<D, E>,
) {
    let Some(p) = ps.get(step).cloned() else {
        let out = match &action {
            Some(action) if !state.is_err() => {
                match collected.into_iter().collect::<Option<Vec<D>>>() {
                    Some(data) => {
                        let data = action(&data);
                        state.with_data(data)
                    }
                    None => state,
                }
            }
            _ => state,
        };
        kont(out, stack);
        return;
    };
    let continue_chain: Cont<D, E> = {
        let ps = Rc::clone(&ps);
        let kont = Rc::clone(&kont);
        let action = action.clone();
        Rc::new(move |out: State<D, E>, stack: &mut ParseStack<D, E>| {
            let mut collected = collected.clone();
            collected.push(out.data().cloned());
            chain_step(
                Rc::clone(&ps),
                step + 1,
                collected,
                out,
                Rc::clone(&kont),
                action.clone(),
                stack,
            );
        })
    };
    p.apply(state, continue_chain, stack);
}

pub fn chain<D: Semantic, E: Semantic>(ps: Vec<Symbol<D, E>>) -> Symbol<D, E> {
    chain_impl(ps, None)
}

pub fn chain_with<D: Semantic, E: Semantic>(
    ps: Vec<Symbol<D, E>>,
    action: impl Fn(&[D]) -> D + 'static,
) -> Symbol<D, E> {
    chain_impl(ps, Some(Rc::new(action)))
}

pub fn contextual<D: Semantic, E: Semantic>(
    initial: Symbol<D, E>,
    rest: impl IntoIterator<Item = Symbol<D, E>>,
) -> Symbol<D, E> {
    let mut ps = vec![initial];
    ps.extend(rest);
    chain(ps)
}
