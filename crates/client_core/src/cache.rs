//! In-memory normalized cache for GraphQL results.
//!
//! Root fields are keyed by field name plus canonical variables. Objects
//! that carry a `__typename` and a key field are stored once in the
//! entity table and referenced from result trees with `{"__ref": id}`.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::{Map, Value};

const REF: &str = "__ref";
const TYPENAME: &str = "__typename";
const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPolicy {
    /// Serve from the cache when the root field is present; otherwise
    /// fetch and store.
    #[default]
    CacheFirst,
    /// Always fetch; the result is written to the cache.
    NetworkOnly,
    /// Always fetch; the cache is left untouched.
    NoCache,
}

/// Key field used to identify entities of a given `__typename`.
fn key_field(typename: &str) -> &'static str {
    match typename {
        "UserType" => "userId",
        "AssessmentType" => "assessmentId",
        "AssessmentAttemptType" => "attemptId",
        _ => "id",
    }
}

pub fn root_key(field: &str, variables: &Value) -> String {
    let mut canonical = String::new();
    match variables {
        Value::Null => canonical.push_str("{}"),
        other => write_canonical(other, &mut canonical),
    }
    format!("{field}({canonical})")
}

/// JSON rendering with object keys sorted at every level.
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(object) => {
            let mut keys: Vec<&String> = object.keys().collect();
            keys.sort();
            out.push('{');
            for (index, key) in keys.into_iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&object[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn entity_id(object: &Map<String, Value>) -> Option<String> {
    let typename = object.get(TYPENAME)?.as_str()?;
    let key = match object.get(key_field(typename))? {
        Value::String(raw) if !raw.is_empty() => raw.clone(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    Some(format!("{typename}:{key}"))
}

#[derive(Debug, Default)]
pub struct NormalizedCache {
    roots: BTreeMap<String, Value>,
    entities: HashMap<String, Map<String, Value>>,
}

impl NormalizedCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, field: &str, variables: &Value, value: Value) {
        let normalized = self.normalize(value);
        self.roots.insert(root_key(field, variables), normalized);
    }

    /// Merges entities found in `value` without recording a root entry.
    pub fn write_entities(&mut self, value: Value) {
        self.normalize(value);
    }

    pub fn read(&self, field: &str, variables: &Value) -> Option<Value> {
        let stored = self.roots.get(&root_key(field, variables))?;
        self.denormalize(stored, 0)
    }

    pub fn entity(&self, id: &str) -> Option<&Map<String, Value>> {
        self.entities.get(id)
    }

    pub fn contains_root(&self, field: &str, variables: &Value) -> bool {
        self.roots.contains_key(&root_key(field, variables))
    }

    /// Drops every root entry of `field`, whatever its variables.
    pub fn evict_field(&mut self, field: &str) -> usize {
        let prefix = format!("{field}(");
        let before = self.roots.len();
        self.roots.retain(|key, _| !key.starts_with(&prefix));
        before - self.roots.len()
    }

    pub fn evict_entity(&mut self, id: &str) -> bool {
        self.entities.remove(id).is_some()
    }

    /// Removes entities no longer reachable from any root entry.
    pub fn gc(&mut self) -> usize {
        let mut reachable = HashSet::new();
        let mut pending: Vec<&Value> = self.roots.values().collect();
        while let Some(value) = pending.pop() {
            match value {
                Value::Object(object) => {
                    if let Some(Value::String(id)) = object.get(REF) {
                        if reachable.insert(id.clone()) {
                            if let Some(entity) = self.entities.get(id) {
                                pending.extend(entity.values());
                            }
                        }
                    } else {
                        pending.extend(object.values());
                    }
                }
                Value::Array(items) => pending.extend(items.iter()),
                _ => {}
            }
        }
        let before = self.entities.len();
        self.entities.retain(|id, _| reachable.contains(id));
        before - self.entities.len()
    }

    pub fn clear(&mut self) {
        self.roots.clear();
        self.entities.clear();
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    fn normalize(&mut self, value: Value) -> Value {
        match value {
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|item| self.normalize(item)).collect())
            }
            Value::Object(object) => {
                let id = entity_id(&object);
                let fields: Map<String, Value> = object
                    .into_iter()
                    .map(|(key, value)| {
                        let value = self.normalize(value);
                        (key, value)
                    })
                    .collect();
                match id {
                    Some(id) => {
                        self.entities.entry(id.clone()).or_default().extend(fields);
                        let mut reference = Map::new();
                        reference.insert(REF.to_string(), Value::String(id));
                        Value::Object(reference)
                    }
                    None => Value::Object(fields),
                }
            }
            scalar => scalar,
        }
    }

    fn denormalize(&self, value: &Value, depth: usize) -> Option<Value> {
        if depth > MAX_DEPTH {
            return None;
        }
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| self.denormalize(item, depth + 1))
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            Value::Object(object) => {
                let fields = match object.get(REF) {
                    Some(Value::String(id)) => self.entities.get(id)?,
                    _ => object,
                };
                fields
                    .iter()
                    .map(|(key, value)| Some((key.clone(), self.denormalize(value, depth + 1)?)))
                    .collect::<Option<Map<_, _>>>()
                    .map(Value::Object)
            }
            scalar => Some(scalar.clone()),
        }
    }
}

#[cfg(test)]
#[path = "tests/cache_tests.rs"]
mod tests;
