use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

// Faults are not parse results: a semantic mismatch travels inside an
// Error state, a fault terminates the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("ambiguity breadth exceeded: more than {limit} completed parses for one memo entry")]
    BreadthExceeded { limit: usize },
}

pub const DEFAULT_MAX_AMBIGUITY_BREADTH: usize = 4096;

// 0 encodes "unlimited".
static MAX_AMBIGUITY_BREADTH: AtomicUsize = AtomicUsize::new(DEFAULT_MAX_AMBIGUITY_BREADTH);

pub fn set_max_ambiguity_breadth(limit: Option<NonZeroUsize>) {
    MAX_AMBIGUITY_BREADTH.store(limit.map_or(0, NonZeroUsize::get), Ordering::Relaxed);
}

pub fn max_ambiguity_breadth() -> Option<NonZeroUsize> {
    NonZeroUsize::new(MAX_AMBIGUITY_BREADTH.load(Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breadth_configuration_round_trips() {
        let before = max_ambiguity_breadth();

        set_max_ambiguity_breadth(NonZeroUsize::new(7));
        assert_eq!(max_ambiguity_breadth(), NonZeroUsize::new(7));

        set_max_ambiguity_breadth(None);
        assert_eq!(max_ambiguity_breadth(), None);

        set_max_ambiguity_breadth(before);
    }
}
