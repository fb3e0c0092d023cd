use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tera::Value;

/// A template function supplied by the caller.
pub type FunctionFn = dyn Fn(&HashMap<String, Value>) -> tera::Result<Value> + Send + Sync;

/// A template filter supplied by the caller.
pub type FilterFn = dyn Fn(&Value, &HashMap<String, Value>) -> tera::Result<Value> + Send + Sync;

/// A function or filter made available to the renderer.
///
/// `Named` entries refer to the built-in catalog and compare by name.
/// `Bound` entries carry their own callable and compare by `Arc` identity,
/// so registering the same handle twice is a no-op while two distinct
/// callables under one name are both kept (the later one wins in Tera).
pub enum Registration<F: ?Sized> {
    Named(String),
    Bound { name: String, callable: Arc<F> },
}

pub type FunctionRegistration = Registration<FunctionFn>;
pub type FilterRegistration = Registration<FilterFn>;

impl<F: ?Sized> Registration<F> {
    pub fn named(name: impl Into<String>) -> Self {
        Registration::Named(name.into())
    }

    pub fn bound(name: impl Into<String>, callable: Arc<F>) -> Self {
        Registration::Bound {
            name: name.into(),
            callable,
        }
    }

    /// The name templates use to call this entry.
    pub fn name(&self) -> &str {
        match self {
            Registration::Named(name) | Registration::Bound { name, .. } => name,
        }
    }
}

impl FunctionRegistration {
    pub fn function<C>(name: impl Into<String>, callable: C) -> Self
    where
        C: Fn(&HashMap<String, Value>) -> tera::Result<Value> + Send + Sync + 'static,
    {
        Registration::bound(name, Arc::new(callable) as Arc<FunctionFn>)
    }
}

impl FilterRegistration {
    pub fn filter<C>(name: impl Into<String>, callable: C) -> Self
    where
        C: Fn(&Value, &HashMap<String, Value>) -> tera::Result<Value> + Send + Sync + 'static,
    {
        Registration::bound(name, Arc::new(callable) as Arc<FilterFn>)
    }
}

impl<F: ?Sized> Clone for Registration<F> {
    fn clone(&self) -> Self {
        match self {
            Registration::Named(name) => Registration::Named(name.clone()),
            Registration::Bound { name, callable } => Registration::Bound {
                name: name.clone(),
                callable: Arc::clone(callable),
            },
        }
    }
}

impl<F: ?Sized> PartialEq for Registration<F> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Registration::Named(a), Registration::Named(b)) => a == b,
            (Registration::Bound { callable: a, .. }, Registration::Bound { callable: b, .. }) => {
                Arc::ptr_eq(a, b)
            }
            _ => false,
        }
    }
}

impl<F: ?Sized> fmt::Debug for Registration<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Registration::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Registration::Bound { name, .. } => {
                f.debug_struct("Bound").field("name", name).finish_non_exhaustive()
            }
        }
    }
}

/// Order-preserving list that skips entries equal to one already present.
pub struct RegistrationList<F: ?Sized> {
    entries: Vec<Registration<F>>,
}

impl<F: ?Sized> RegistrationList<F> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append `entry` unless an equal one is already listed. Returns whether
    /// it was added.
    pub fn add(&mut self, entry: Registration<F>) -> bool {
        if self.entries.contains(&entry) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn extend<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = Registration<F>>,
    {
        for entry in entries {
            self.add(entry);
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Registration<F>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<F: ?Sized> Default for RegistrationList<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ?Sized> Clone for RegistrationList<F> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<F: ?Sized> fmt::Debug for RegistrationList<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}

impl<F: ?Sized> FromIterator<Registration<F>> for RegistrationList<F> {
    fn from_iter<I: IntoIterator<Item = Registration<F>>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<'a, F: ?Sized> IntoIterator for &'a RegistrationList<F> {
    type Item = &'a Registration<F>;
    type IntoIter = std::slice::Iter<'a, Registration<F>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
