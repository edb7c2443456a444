use std::collections::HashMap;
use std::rc::Rc;

// Keyed by state identity; flushed when a state with a different target
// shows up, which is the only reset between runs.
pub(crate) struct Memo<V> {
    last_target: Option<Rc<str>>,
    entries: HashMap<String, V>,
}

impl<V> Memo<V> {
    pub fn new() -> Self {
        Self { last_target: None, entries: HashMap::new() }
    }

    pub fn roll(&mut self, target: &Rc<str>) {
        match &self.last_target {
            Some(last) if **last == **target => {}
            _ => {
                self.entries.clear();
                self.last_target = Some(Rc::clone(target));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries.get_mut(key)
    }

    pub fn insert(&mut self, key: String, value: V) {
        self.entries.insert(key, value);
    }
}
