//! Value-path resolution and JSON path walking
//!
//! A [`ValueLocationPath`] names an attribute symbolically; the resolver
//! turns it into the dotted path over the resource's JSON projection,
//! optionally under a wrapper segment. Walking a resolved path visits every
//! element of every array on the way and collects each terminal scalar.

use std::borrow::Cow;

use cohort_criteria::ValueLocationPath;
use serde_json::Value;
use smallvec::SmallVec;

use crate::error::EvalResult;

/// Values collected from one path walk
pub type PathValues<'a> = SmallVec<[Cow<'a, str>; 4]>;

/// A value location resolved against the resource projection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    segments: SmallVec<[String; 4]>,
    coded: bool,
}

impl ResolvedPath {
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether the values at this path are terminology-bound
    pub fn is_coded(&self) -> bool {
        self.coded
    }

    /// Dotted form of the path
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }

    /// Collect every terminal scalar reached by walking this path
    ///
    /// Arrays are iterated exhaustively at every level, including after the
    /// last segment. Missing keys and scalars met before the path is consumed
    /// prune their branch. Strings, numbers and booleans yield their text;
    /// nulls and objects yield nothing.
    pub fn collect<'a>(&self, resource: &'a Value) -> PathValues<'a> {
        let mut values = PathValues::new();
        walk(resource, &self.segments, &mut values);
        values
    }
}

fn walk<'a>(node: &'a Value, segments: &[String], values: &mut PathValues<'a>) {
    if let Value::Array(items) = node {
        for item in items {
            walk(item, segments, values);
        }
        return;
    }

    match segments.split_first() {
        Some((head, rest)) => {
            if let Some(child) = node.get(head.as_str()) {
                walk(child, rest, values);
            }
        }
        None => {
            if let Some(text) = scalar_text(node) {
                values.push(text);
            }
        }
    }
}

fn scalar_text(node: &Value) -> Option<Cow<'_, str>> {
    match node {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Maps value location tags to resolved paths
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathResolver {
    prefix: Option<String>,
}

impl PathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver that nests every path under `prefix` (dotted prefixes allowed)
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn resolve(&self, path: ValueLocationPath) -> ResolvedPath {
        let prefix = self.prefix.as_deref().unwrap_or_default();
        let segments = prefix
            .split('.')
            .chain(path.path().split('.'))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        ResolvedPath {
            segments,
            coded: path.is_coded(),
        }
    }

    /// Resolve a wire tag such as `CONDITION_CODE`
    pub fn resolve_tag(&self, tag: &str) -> EvalResult<ResolvedPath> {
        let path: ValueLocationPath = tag.parse()?;
        Ok(self.resolve(path))
    }
}
