use crate::identity::Semantic;
use crate::state::State;
use ariadne::{CharSet, Config, Label, Report, ReportKind, Source};
use std::fmt::Display;

pub struct ReportOptions<E> {
    pub rename_error: Option<Box<dyn Fn(&E) -> String>>,
    pub color: bool,
    pub ascii: bool,
}

impl<E> Default for ReportOptions<E> {
    fn default() -> Self {
        Self { rename_error: None, color: false, ascii: true }
    }
}

pub fn error_report<D, E>(state: &State<D, E>) -> Option<String>
where
    D: Semantic,
    E: Semantic + Display,
{
    error_report_with(state, &ReportOptions::default())
}

pub fn error_report_with<D, E>(state: &State<D, E>, options: &ReportOptions<E>) -> Option<String>
where
    D: Semantic,
    E: Semantic + Display,
{
    let error = state.error()?;
    let message = match &options.rename_error {
        Some(rename_error) => rename_error(error),
        None => error.to_string(),
    };

    let start = state.index().min(state.target().len());
    let end = match state.target()[start..].chars().next() {
        Some(c) => start + c.len_utf8(),
        None => start,
    };
    let char_set = if options.ascii { CharSet::Ascii } else { CharSet::Unicode };

    let mut buffer = Vec::new();
    Report::build(ReportKind::Error, (), start)
        .with_message("parse error")
        .with_label(Label::new(start..end).with_message(message))
        .with_config(Config::default().with_color(options.color).with_char_set(char_set))
        .finish()
        .write(Source::from(state.target()), &mut buffer)
        .unwrap();

    Some(String::from_utf8(buffer).unwrap())
}
