use symtok::combinator::symbol::{alternatives, chain, to_symbol};
use symtok::combinator::token::{self, error, literal, recovery};
use symtok::{Identifiable, State, Symbol, Token};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Expected(&'static str);

impl Identifiable for Expected {
    fn identity(&self) -> String {
        self.0.to_string()
    }
}

fn expected(what: &'static str) -> impl Fn(&str, usize) -> Expected {
    move |_, _| Expected(what)
}

fn lit(s: &'static str) -> Token<String, Expected> {
    literal(s, expected("eof"), expected(s))
}

// alternatives( a, b error ) followed by a recovery step.
fn grammar() -> Symbol<String, Expected> {
    let inner = alternatives(vec![
        to_symbol(lit("a")),
        to_symbol(token::chain(vec![lit("b"), error(expected("rejected"))])),
    ]);
    let rescue = to_symbol(recovery(|_: &State<String, Expected>| "rescued".to_string()));
    chain(vec![inner, rescue])
}

#[test]
fn the_error_production_is_rescued_downstream() {
    let all = grammar().run("b", "original".to_string()).unwrap();

    assert_eq!(all.len(), 1);
    let state = &all[0];
    assert!(!state.is_err());
    assert_eq!(state.tokens(), ["b"]);
    assert_eq!(state.data(), Some(&"rescued".to_string()));
}

#[test]
fn the_clean_alternative_keeps_its_data() {
    let all = grammar().run("a", "original".to_string()).unwrap();

    assert_eq!(all.len(), 1);
    let state = &all[0];
    assert!(!state.is_err());
    assert_eq!(state.tokens(), ["a"]);
    assert_eq!(state.data(), Some(&"original".to_string()));
}

#[test]
fn without_recovery_the_error_reaches_the_driver() {
    let inner = alternatives(vec![
        to_symbol(lit("a")),
        to_symbol(token::chain(vec![lit("b"), error(expected("rejected"))])),
    ]);

    let all = inner.run("b", "original".to_string()).unwrap();

    assert!(!all.is_empty());
    assert!(all.iter().all(State::is_err));
    assert_eq!(all[0].error(), Some(&Expected("rejected")));
    assert_eq!(all[0].tokens(), ["b"]);
}
