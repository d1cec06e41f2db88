//! Model persistence over a key-value store.
//!
//! Each parameter block is stored as a flat list of numbers under its own key:
//!
//! | key            | value                      |
//! |----------------|----------------------------|
//! | `@@@`          | `Pi` (N values)            |
//! | `@@#<i>`       | row `i` of `A` (N values)  |
//! | `@#@<i>$<j>`   | `B[i][j][..]` (M1 values)  |

use hashbrown::HashMap;
use tracing::debug;

use crate::error::*;
use crate::model::Model;

pub const INITIAL_KEY: &str = "@@@";
pub const TRANSITION_PREFIX: &str = "@@#";
pub const EMISSION_PREFIX: &str = "@#@";
pub const FIELD_SEPARATOR: &str = "$";

pub fn transition_key(row: usize) -> String {
    format!("{}{}", TRANSITION_PREFIX, row)
}

pub fn emission_key(state: usize, p: usize) -> String {
    format!("{}{}{}{}", EMISSION_PREFIX, state, FIELD_SEPARATOR, p)
}

/// A store mapping string keys to ordered lists of numbers.
pub trait KeyValueStore {
    /// Replace the list stored under `key`.
    fn put(&mut self, key: &str, values: Vec<f64>) -> Result<()>;
    /// The list stored under `key`, or `None` if the key is absent.
    fn get(&self, key: &str) -> Result<Option<Vec<f64>>>;
    /// Make previous writes durable.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Model {
    /// Write every parameter block of the model to `store`, then flush it.
    pub fn store<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        let (m0, _) = self.symbols();
        store.put(INITIAL_KEY, self.initial().to_vec())?;
        for i in 0..self.n_states() {
            store.put(&transition_key(i), self.transition_row(i).to_vec())?;
            for p in 0..m0 {
                store.put(&emission_key(i, p), self.emission_slice(i, p).to_vec())?;
            }
        }
        store.flush()?;
        debug!(n_states = self.n_states(), "model stored");
        Ok(())
    }

    /// Rebuild a model of the given dimensions from `store`.
    ///
    /// Fails if any expected key is missing or holds the wrong number of values; a partially
    /// populated model is never returned.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S, n_states: usize, m0: usize, m1: usize)
        -> Result<Model>
    {
        // reject bad dimensions before issuing any reads
        Model::new(n_states, m0, m1)?;

        let initial = fetch(store, INITIAL_KEY, n_states)?;
        let mut transitions = Vec::with_capacity(n_states * n_states);
        let mut emissions = Vec::with_capacity(n_states * m0 * m1);
        for i in 0..n_states {
            transitions.extend(fetch(store, &transition_key(i), n_states)?);
            for p in 0..m0 {
                emissions.extend(fetch(store, &emission_key(i, p), m1)?);
            }
        }
        let model = Model::from_parts(n_states, m0, m1, initial, transitions, emissions)?;
        debug!(n_states, m0, m1, "model loaded");
        Ok(model)
    }
}

fn fetch<S: KeyValueStore + ?Sized>(store: &S, key: &str, expected: usize) -> Result<Vec<f64>> {
    let values = store.get(key)?.ok_or_else(|| HmmError::MissingKey(key.to_string()))?;
    if values.len() != expected {
        return Err(HmmError::MalformedEntry {
            key: key.to_string(),
            expected,
            found: values.len(),
        });
    }
    Ok(values)
}

/// An in-process store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<f64>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn remove(&mut self, key: &str) -> Option<Vec<f64>> {
        self.entries.remove(key)
    }
    /// Keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl KeyValueStore for MemoryStore {
    fn put(&mut self, key: &str, values: Vec<f64>) -> Result<()> {
        self.entries.insert(key.to_string(), values);
        Ok(())
    }
    fn get(&self, key: &str) -> Result<Option<Vec<f64>>> {
        Ok(self.entries.get(key).cloned())
    }
}
