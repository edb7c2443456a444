use regex::Regex;
use serde_json::Value;
use symtok::combinator::symbol::{self, alternatives, chain_with, recursive, to_symbol};
use symtok::combinator::token::{literal, map, pattern};
use symtok::{Canonical, Identifiable, State, Symbol};

type Json = Canonical<Value>;

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

fn keep(s: &State<Json, Expected>) -> Expected {
    s.error().cloned().unwrap()
}

fn punct(s: &'static str) -> Symbol<Json, Expected> {
    to_symbol(literal(s, expected("eof"), expected(s)))
}

fn json_value() -> Symbol<Json, Expected> {
    recursive(|value| {
        let string = to_symbol(map(
            pattern(Regex::new(r#""[^"]*""#).unwrap(), expected("eof"), expected("string")),
            |s: &State<Json, Expected>| {
                let quoted = s.tokens().last().unwrap();
                Canonical(Value::String(quoted[1..quoted.len() - 1].to_string()))
            },
            keep,
        ));
        let number = to_symbol(map(
            pattern(Regex::new("-?[0-9]+").unwrap(), expected("eof"), expected("number")),
            |s: &State<Json, Expected>| {
                Canonical(Value::from(s.tokens().last().unwrap().parse::<i64>().unwrap()))
            },
            keep,
        ));
        let boolean = alternatives(vec![
            to_symbol(map(
                literal("true", expected("eof"), expected("true")),
                |_: &State<Json, Expected>| Canonical(Value::Bool(true)),
                keep,
            )),
            to_symbol(map(
                literal("false", expected("eof"), expected("false")),
                |_: &State<Json, Expected>| Canonical(Value::Bool(false)),
                keep,
            )),
        ]);
        let null = to_symbol(map(
            literal("null", expected("eof"), expected("null")),
            |_: &State<Json, Expected>| Canonical(Value::Null),
            keep,
        ));

        let elements = recursive(|elements| {
            alternatives(vec![
                chain_with(vec![value.clone(), punct(","), elements], |d: &[Json]| {
                    let mut items = vec![d[0].0.clone()];
                    if let Value::Array(rest) = &d[2].0 {
                        items.extend(rest.iter().cloned());
                    }
                    Canonical(Value::Array(items))
                }),
                symbol::map(
                    value.clone(),
                    |s: &State<Json, Expected>| {
                        Canonical(Value::Array(vec![s.data().unwrap().0.clone()]))
                    },
                    |s| s.error().cloned().unwrap(),
                ),
            ])
        });
        let array = alternatives(vec![
            chain_with(vec![punct("["), elements, punct("]")], |d: &[Json]| d[1].clone()),
            chain_with(vec![punct("["), punct("]")], |_: &[Json]| {
                Canonical(Value::Array(Vec::new()))
            }),
        ]);

        let member = chain_with(vec![string.clone(), punct(":"), value.clone()], |d: &[Json]| {
            let mut object = serde_json::Map::new();
            if let Value::String(key) = &d[0].0 {
                object.insert(key.clone(), d[2].0.clone());
            }
            Canonical(Value::Object(object))
        });
        let members = recursive(|members| {
            alternatives(vec![
                chain_with(vec![member.clone(), punct(","), members], |d: &[Json]| {
                    let mut object = serde_json::Map::new();
                    if let Value::Object(first) = &d[0].0 {
                        object.extend(first.clone());
                    }
                    if let Value::Object(rest) = &d[2].0 {
                        object.extend(rest.clone());
                    }
                    Canonical(Value::Object(object))
                }),
                member.clone(),
            ])
        });
        let object = alternatives(vec![
            chain_with(vec![punct("{"), members, punct("}")], |d: &[Json]| d[1].clone()),
            chain_with(vec![punct("{"), punct("}")], |_: &[Json]| {
                Canonical(Value::Object(serde_json::Map::new()))
            }),
        ]);

        alternatives(vec![string, number, boolean, null, array, object])
    })
}

#[test]
fn json_documents_round_trip() {
    let source = r#"{"hello":"world","n":null,"x":[true,12,false,-1,"true"],"y":{"zzz":"","a":[]}}"#;

    let all = json_value().run(source, Canonical(Value::Null)).unwrap();

    assert_eq!(all.len(), 1);
    let state = &all[0];
    assert_eq!(state.index(), source.len());
    assert_eq!(state.data().unwrap().0, serde_json::from_str::<Value>(source).unwrap());
}

#[test]
fn scalars_parse_on_their_own() {
    let all = json_value().run("-42", Canonical(Value::Null)).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].data().unwrap().0, Value::from(-42));

    let all = json_value().run("[]", Canonical(Value::Null)).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].data().unwrap().0, Value::Array(Vec::new()));
}

#[test]
fn truncated_documents_fail_at_the_farthest_position() {
    let source = r#"{"hello":"#;

    let all = json_value().run(source, Canonical(Value::Null)).unwrap();

    assert!(!all.is_empty());
    assert!(all.iter().all(State::is_err));
    assert!(all.iter().all(|s| s.index() == source.len()));
}
