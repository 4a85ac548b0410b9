//! Outbound request headers: a case-insensitive, key-unique map plus the
//! default-header merge applied to every GraphQL request.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::HeaderError;

pub const CONTENT_TYPE: &str = "content-type";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Header set with case-insensitive names. Names are stored lower-cased;
/// setting an existing name replaces its value.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: BTreeMap<String, String>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`, replacing any previous value for the same name.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        let name = name.trim();
        if !is_token(name) {
            return Err(HeaderError::InvalidName(name.to_string()));
        }
        let value = value.trim();
        if value.bytes().any(|b| b == b'\r' || b == b'\n' || b == 0) {
            return Err(HeaderError::InvalidValue(name.to_string()));
        }
        self.entries
            .insert(name.to_ascii_lowercase(), value.to_string());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(lower-cased name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overlays every entry of `other`, replacing values for names already present.
    pub fn merge(&mut self, other: &HeaderSet) {
        for (k, v) in &other.entries {
            self.entries.insert(k.clone(), v.clone());
        }
    }

    /// Builds a set from name/value pairs; later duplicates win.
    pub fn try_from_pairs<I, K, V>(pairs: I) -> Result<Self, HeaderError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut set = HeaderSet::new();
        for (k, v) in pairs {
            set.set(k.as_ref(), v.as_ref())?;
        }
        Ok(set)
    }

    /// Parses `Name: value` lines (curl `-H` style).
    pub fn parse_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self, HeaderError> {
        let mut set = HeaderSet::new();
        for line in lines {
            let line = line.as_ref();
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| HeaderError::MalformedLine(line.to_string()))?;
            set.set(name, value)?;
        }
        Ok(set)
    }

    /// Accepts a JSON object whose values are all strings.
    pub fn try_from_json(value: &serde_json::Value) -> Result<Self, HeaderError> {
        let map = value.as_object().ok_or(HeaderError::NotAMap)?;
        let mut set = HeaderSet::new();
        for (k, v) in map {
            let v = v.as_str().ok_or(HeaderError::NotAMap)?;
            set.set(k, v)?;
        }
        Ok(set)
    }
}

/// RFC 7230 token characters.
/// Prints names only; values may be credentials.
impl fmt::Debug for HeaderSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

fn is_token(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_alphanumeric()
                || matches!(
                    b,
                    b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^'
                        | b'_' | b'`' | b'|' | b'~'
                )
        })
}

/// Turns loosely-typed header input into an optional custom set. Invalid
/// input is not fatal: it is reported and only the default headers are used.
pub fn custom_or_warn(input: Result<HeaderSet, HeaderError>) -> Option<HeaderSet> {
    match input {
        Ok(set) => Some(set),
        Err(e) => {
            tracing::warn!("custom headers ignored ({}); using only default headers", e);
            None
        }
    }
}

/// `content-type: application/json` overlaid with `custom` (set, not append).
pub fn with_default_headers(custom: Option<&HeaderSet>) -> HeaderSet {
    let mut headers = HeaderSet::new();
    headers
        .entries
        .insert(CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string());
    if let Some(custom) = custom {
        headers.merge(custom);
    }
    headers
}
