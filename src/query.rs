use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// SuperSearch criteria: each field maps to one or more values, kept in the
/// order they were given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query(BTreeMap<String, Vec<String>>);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(value.into());
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flattens the query into repeated `(key, value)` pairs, skipping any
    /// key for which `skip` returns true.
    pub fn pairs_except<F>(&self, skip: F) -> Vec<(String, String)>
    where
        F: Fn(&str) -> bool,
    {
        self.0
            .iter()
            .filter(|(key, _)| !skip(key.as_str()))
            .flat_map(|(key, values)| values.iter().map(move |v| (key.clone(), v.clone())))
            .collect()
    }
}

impl FromStr for Query {
    type Err = Error;

    /// Parses a single `key=value` token into a one-entry query.
    fn from_str(token: &str) -> Result<Self> {
        build_query([token])
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, values)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: [{}]", key, values.join(", "))?;
        }
        write!(f, "}}")
    }
}

/// Builds a query from `key=value` tokens. Only the first `=` splits; repeated
/// keys accumulate.
pub fn build_query<I, S>(tokens: I) -> Result<Query>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut query = Query::new();
    for token in tokens {
        let token = token.as_ref();
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| Error::MalformedToken(token.to_string()))?;
        query.push(key, value);
    }
    Ok(query)
}
