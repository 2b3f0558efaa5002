//! Dynamic finder and scope name parsing.
//!
//! Operation names such as `find_by_name_and_age` or `scoped_by_team_id` are
//! parsed into a [`DynamicMatch`]: what kind of lookup to run and which
//! attributes it constrains. Whether those attributes exist is decided later
//! against the entity metadata.

use std::sync::OnceLock;

use regex::Regex;
use sqlrel_core::{Error, Result, Value};

/// How a dynamic finder turns its matches into a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinderKind {
    /// `find_by_*`: first match or none.
    First,
    /// `find_by_*!`: first match or `RecordNotFound`.
    FirstOrFail,
    /// `find_all_by_*`: every match.
    All,
    /// `find_last_by_*`: last match or none.
    Last,
}

/// Dynamic scopes and instantiators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// `find_or_initialize_by_*`: first match, else an unsaved new record.
    FindOrInitialize,
    /// `find_or_create_by_*`: first match, else a newly persisted record.
    FindOrCreate,
    /// `scoped_by_*`: the filtered relation itself.
    ScopedBy,
}

/// Ordered attribute names parsed from an operation name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeConstraints {
    names: Vec<String>,
}

impl AttributeConstraints {
    fn parse(segment: &str) -> Self {
        Self {
            names: segment.split("_and_").map(str::to_string).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Pair each attribute with its positional argument.
    ///
    /// Fails with `InvalidArguments` unless there is exactly one argument
    /// per attribute.
    pub fn bind(&self, operation: &str, args: &[Value]) -> Result<Vec<(String, Value)>> {
        if args.len() != self.names.len() {
            return Err(Error::InvalidArguments {
                operation: operation.to_string(),
                expected: self.names.len(),
                found: args.len(),
            });
        }
        Ok(self
            .names
            .iter()
            .cloned()
            .zip(args.iter().cloned())
            .collect())
    }
}

/// A parsed dynamic operation name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DynamicMatch {
    Finder {
        kind: FinderKind,
        attributes: AttributeConstraints,
    },
    Scope {
        kind: ScopeKind,
        attributes: AttributeConstraints,
    },
}

impl DynamicMatch {
    /// Parse an operation name, or `None` if it is not a dynamic finder or scope.
    pub fn parse(name: &str) -> Option<Self> {
        let patterns = patterns();

        if let Some(caps) = captures(patterns.finder.as_ref(), name) {
            let kind = match caps.get(1).map(|m| m.as_str()) {
                Some("all_by") => FinderKind::All,
                Some("last_by") => FinderKind::Last,
                _ => FinderKind::First,
            };
            return Some(Self::finder(kind, caps.get(2)?.as_str()));
        }

        if let Some(caps) = captures(patterns.bang.as_ref(), name) {
            return Some(Self::finder(FinderKind::FirstOrFail, caps.get(1)?.as_str()));
        }

        if let Some(caps) = captures(patterns.instantiator.as_ref(), name) {
            let kind = match caps.get(1).map(|m| m.as_str()) {
                Some("create") => ScopeKind::FindOrCreate,
                _ => ScopeKind::FindOrInitialize,
            };
            return Some(Self::scope(kind, caps.get(2)?.as_str()));
        }

        if let Some(caps) = captures(patterns.scope.as_ref(), name) {
            return Some(Self::scope(ScopeKind::ScopedBy, caps.get(1)?.as_str()));
        }

        None
    }

    fn finder(kind: FinderKind, segment: &str) -> Self {
        DynamicMatch::Finder {
            kind,
            attributes: AttributeConstraints::parse(segment),
        }
    }

    fn scope(kind: ScopeKind, segment: &str) -> Self {
        DynamicMatch::Scope {
            kind,
            attributes: AttributeConstraints::parse(segment),
        }
    }

    pub fn attributes(&self) -> &AttributeConstraints {
        match self {
            DynamicMatch::Finder { attributes, .. } | DynamicMatch::Scope { attributes, .. } => {
                attributes
            }
        }
    }
}

struct FinderPatterns {
    finder: Option<Regex>,
    bang: Option<Regex>,
    instantiator: Option<Regex>,
    scope: Option<Regex>,
}

fn patterns() -> &'static FinderPatterns {
    static PATTERNS: OnceLock<FinderPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| FinderPatterns {
        finder: compile(r"^find_(all_by|last_by|by)_([_a-zA-Z]\w*)$"),
        bang: compile(r"^find_by_([_a-zA-Z]\w*)!$"),
        instantiator: compile(r"^find_or_(initialize|create)_by_([_a-zA-Z]\w*)$"),
        scope: compile(r"^scoped_by_([_a-zA-Z]\w*)$"),
    })
}

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            tracing::warn!(
                pattern = pattern,
                error = %e,
                "Invalid dynamic finder pattern, treating as non-match"
            );
            None
        }
    }
}

fn captures<'h>(regex: Option<&Regex>, name: &'h str) -> Option<regex::Captures<'h>> {
    regex.and_then(|r| r.captures(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(m: &DynamicMatch) -> Vec<&str> {
        m.attributes().names().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_find_by_splits_on_and() {
        let m = DynamicMatch::parse("find_by_name_and_age").unwrap();
        assert!(matches!(m, DynamicMatch::Finder { kind: FinderKind::First, .. }));
        assert_eq!(names(&m), vec!["name", "age"]);
    }

    #[test]
    fn test_finder_kinds() {
        let kind = |name: &str| match DynamicMatch::parse(name) {
            Some(DynamicMatch::Finder { kind, .. }) => Some(kind),
            _ => None,
        };
        assert_eq!(kind("find_all_by_team_id"), Some(FinderKind::All));
        assert_eq!(kind("find_last_by_name"), Some(FinderKind::Last));
        assert_eq!(kind("find_by_name!"), Some(FinderKind::FirstOrFail));
        assert_eq!(kind("find_by_"), None);
        assert_eq!(kind("find_all_by_name!"), None);
    }

    #[test]
    fn test_scope_kinds() {
        let kind = |name: &str| match DynamicMatch::parse(name) {
            Some(DynamicMatch::Scope { kind, .. }) => Some(kind),
            _ => None,
        };
        assert_eq!(kind("find_or_create_by_name"), Some(ScopeKind::FindOrCreate));
        assert_eq!(
            kind("find_or_initialize_by_name_and_age"),
            Some(ScopeKind::FindOrInitialize)
        );
        assert_eq!(kind("scoped_by_active"), Some(ScopeKind::ScopedBy));
    }

    #[test]
    fn test_non_matching_names() {
        assert_eq!(DynamicMatch::parse("where_clauses"), None);
        assert_eq!(DynamicMatch::parse("find"), None);
        assert_eq!(DynamicMatch::parse("find_by_1name"), None);
        assert_eq!(DynamicMatch::parse("xfind_by_name"), None);
    }

    #[test]
    fn test_bind_checks_argument_count() {
        let m = DynamicMatch::parse("find_by_name_and_age").unwrap();
        let bound = m
            .attributes()
            .bind("find_by_name_and_age", &[Value::from("Ann"), Value::from(30)])
            .unwrap();
        assert_eq!(bound[1], ("age".to_string(), Value::Int(30)));

        let err = m
            .attributes()
            .bind("find_by_name_and_age", &[Value::from("Ann")])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidArguments {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }
}
