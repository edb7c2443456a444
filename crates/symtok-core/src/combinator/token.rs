use crate::identity::Semantic;
use crate::state::State;
use crate::token::Token;
use regex::Regex;
use std::rc::Rc;

// Every structural combinator propagates an error input unchanged;
// recovery does the inverse.

pub fn literal<D: Semantic, E: Semantic>(
    expected: impl Into<String>,
    on_eof: impl Fn(&str, usize) -> E + 'static,
    on_mismatch: impl Fn(&str, usize) -> E + 'static,
) -> Token<D, E> {
    let expected = expected.into();
    Token::new(move |state: State<D, E>| {
        if state.is_err() {
            return state;
        }
        if state.at_end() {
            let error = on_eof(state.target(), state.index());
            return state.with_error(error);
        }
        if state.rest().starts_with(&expected) {
            state.advanced(expected.len(), expected.clone())
        } else {
            let error = on_mismatch(state.target(), state.index());
            state.with_error(error)
        }
    })
}

pub fn pattern<D: Semantic, E: Semantic>(
    re: Regex,
    on_eof: impl Fn(&str, usize) -> E + 'static,
    on_mismatch: impl Fn(&str, usize) -> E + 'static,
) -> Token<D, E> {
    Token::new(move |state: State<D, E>| {
        if state.is_err() {
            return state;
        }
        if state.at_end() {
            let error = on_eof(state.target(), state.index());
            return state.with_error(error);
        }
        // A match only counts when it starts at the cursor.
        match re.find(state.rest()) {
            Some(found) if found.start() == 0 => {
                let token = found.as_str().to_string();
                state.advanced(found.end(), token)
            }
            _ => {
                let error = on_mismatch(state.target(), state.index());
                state.with_error(error)
            }
        }
    })
}

pub fn many<D: Semantic, E: Semantic>(p: Token<D, E>) -> Token<D, E> {
    Token::new(move |state: State<D, E>| {
        if state.is_err() {
            return state;
        }
        let mut current = state;
        while !current.at_end() {
            let next = p.apply(current.clone());
            if next.is_err() {
                break;
            }
            // A round that does not advance the cursor ends the loop.
            let advanced = next.index() > current.index();
            current = next;
            if !advanced {
                break;
            }
        }
        current
    })
}

pub fn many1<D: Semantic, E: Semantic>(
    p: Token<D, E>,
    on_empty: impl Fn(&str, usize) -> E + 'static,
) -> Token<D, E> {
    let closure = many(p);
    Token::new(move |state: State<D, E>| {
        if state.is_err() {
            return state;
        }
        let before = state.tokens().len();
        let out = closure.apply(state);
        if out.tokens().len() == before {
            let error = on_empty(out.target(), out.index());
            out.with_error(error)
        } else {
            out
        }
    })
}

pub fn optional<D: Semantic, E: Semantic>(p: Token<D, E>) -> Token<D, E> {
    Token::new(move |state: State<D, E>| {
        if state.is_err() {
            return state;
        }
        let next = p.apply(state.clone());
        if next.is_err() {
            state
        } else {
            next
        }
    })
}

pub fn until<D: Semantic, E: Semantic>(
    terminator: Token<D, E>,
    on_eof: impl Fn(&str, usize) -> E + 'static,
) -> Token<D, E> {
    Token::new(move |state: State<D, E>| {
        if state.is_err() {
            return state;
        }
        let start = state.index();
        let mut pos = start;
        while pos < state.target().len() {
            // The terminator is probed, not consumed.
            if !terminator.apply(state.probe_at(pos)).is_err() {
                let skipped = state.target()[start..pos].to_string();
                return state.advanced(pos - start, skipped);
            }
            match state.target()[pos..].chars().next() {
                Some(c) => pos += c.len_utf8(),
                None => break,
            }
        }
        let error = on_eof(state.target(), state.index());
        state.with_error(error)
    })
}

pub fn choice<D: Semantic, E: Semantic>(
    ps: Vec<Token<D, E>>,
    on_all_fail: impl Fn(&str, usize) -> E + 'static,
) -> Token<D, E> {
    Token::new(move |state: State<D, E>| {
        if state.is_err() {
            return state;
        }
        for p in &ps {
            let next = p.apply(state.clone());
            if !next.is_err() {
                return next;
            }
        }
        let error = on_all_fail(state.target(), state.index());
        state.with_error(error)
    })
}

pub fn lookahead<D: Semantic, E: Semantic>(
    probe: Token<D, E>,
    decide: impl Fn(&State<D, E>) -> Token<D, E> + 'static,
) -> Token<D, E> {
    Token::new(move |state: State<D, E>| {
        if state.is_err() {
            return state;
        }
        // Whatever the probe consumed is discarded.
        let probed = probe.apply(state.clone());
        decide(&probed).apply(state)
    })
}

pub fn side_effect<D: Semantic, E: Semantic>(
    effect: impl Fn(&State<D, E>) + 'static,
) -> Token<D, E> {
    Token::new(move |state: State<D, E>| {
        effect(&state);
        state
    })
}

pub fn error<D: Semantic, E: Semantic>(
    produce: impl Fn(&str, usize) -> E + 'static,
) -> Token<D, E> {
    Token::new(move |state: State<D, E>| {
        if state.is_err() {
            return state;
        }
        let error = produce(state.target(), state.index());
        state.with_error(error)
    })
}

pub fn recovery<D: Semantic, E: Semantic>(
    rescue: impl Fn(&State<D, E>) -> D + 'static,
) -> Token<D, E> {
    Token::new(move |state: State<D, E>| {
        if !state.is_err() {
            return state;
        }
        let data = rescue(&state);
        state.with_data(data)
    })
}

pub fn map<D: Semantic, E: Semantic>(
    p: Token<D, E>,
    on_ok: impl Fn(&State<D, E>) -> D + 'static,
    on_err: impl Fn(&State<D, E>) -> E + 'static,
) -> Token<D, E> {
    Token::new(move |state: State<D, E>| {
        let out = p.apply(state);
        if out.is_err() {
            let error = on_err(&out);
            out.with_error(error)
        } else {
            let data = on_ok(&out);
            out.with_data(data)
        }
    })
}

pub fn verify<D: Semantic, E: Semantic>(
    p: Token<D, E>,
    check: impl Fn(&State<D, E>) -> Option<E> + 'static,
) -> Token<D, E> {
    Token::new(move |state: State<D, E>| {
        let out = p.apply(state);
        if out.is_err() {
            return out;
        }
        match check(&out) {
            Some(error) => out.with_error(error),
            None => out,
        }
    })
}

pub(crate) type Action<D> = Rc<dyn Fn(&[D]) -> D>;

fn chain_impl<D: Semantic, E: Semantic>(
    ps: Vec<Token<D, E>>,
    action: Option<Action<D>>,
) -> Token<D, E> {
    Token::new(move |state: State<D, E>| {
        if state.is_err() {
            return state;
        }
        let mut current = state;
        let mut collected: Vec<Option<D>> = Vec::with_capacity(ps.len());
        for p in &ps {
            current = p.apply(current);
            collected.push(current.data().cloned());
        }
        if current.is_err() {
            return current;
        }
        match &action {
            Some(action) => match collected.into_iter().collect::<Option<Vec<D>>>() {
                Some(data) => {
                    let data = action(&data);
                    current.with_data(data)
                }
                // A step failed along the way and a later recovery
                // resynchronised; the per-step data vector is incomplete,
                // so the action cannot run.
                None => current,
            },
            None => current,
        }
    })
}

pub fn chain<D: Semantic, E: Semantic>(ps: Vec<Token<D, E>>) -> Token<D, E> {
    chain_impl(ps, None)
}

pub fn chain_with<D: Semantic, E: Semantic>(
    ps: Vec<Token<D, E>>,
    action: impl Fn(&[D]) -> D + 'static,
) -> Token<D, E> {
    chain_impl(ps, Some(Rc::new(action)))
}

pub fn contextual<D: Semantic, E: Semantic>(
    initial: Token<D, E>,
    rest: impl IntoIterator<Item = Token<D, E>>,
) -> Token<D, E> {
    let mut ps = vec![initial];
    ps.extend(rest);
    chain(ps)
}
