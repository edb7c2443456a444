#![deny(rust_2018_idioms)]

mod driver;
mod fault;
mod identity;
mod memo;
mod report;
mod stack;
mod state;
mod symbol;
mod token;

pub mod combinator;

pub use self::{
    driver::Parses,
    fault::{max_ambiguity_breadth, set_max_ambiguity_breadth, Fault, DEFAULT_MAX_AMBIGUITY_BREADTH},
    identity::{Anonymous, Canonical, Identifiable, Semantic, Tagged},
    report::{error_report, error_report_with, ReportOptions},
    stack::ParseStack,
    state::State,
    symbol::{Cont, Symbol},
    token::Token,
};
