//! Operations resolved by name at runtime.
//!
//! [`Relation::resolve`] maps an operation name to a [`Capability`] in a fixed
//! order: clause accessors, sequence operations, dynamic finders, dynamic
//! scopes. [`Relation::dispatch`] executes exactly what `resolve` returns, so
//! checking with [`Relation::responds_to`] and dispatching never disagree.

use sqlrel_core::{Attribute, Error, Record, Result, Value};
use sqlrel_query::{ClauseValue, SpecAccessor};

use super::Relation;
use crate::finder::{AttributeConstraints, DynamicMatch, FinderKind, ScopeKind};

/// Operations over the materialized record sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceOp {
    Length,
    First,
    Last,
    Entries,
    Reverse,
    IsEmpty,
}

impl SequenceOp {
    pub const ALL: [SequenceOp; 6] = [
        SequenceOp::Length,
        SequenceOp::First,
        SequenceOp::Last,
        SequenceOp::Entries,
        SequenceOp::Reverse,
        SequenceOp::IsEmpty,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            SequenceOp::Length => "length",
            SequenceOp::First => "first",
            SequenceOp::Last => "last",
            SequenceOp::Entries => "entries",
            SequenceOp::Reverse => "reverse",
            SequenceOp::IsEmpty => "is_empty",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }
}

/// What a named operation resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    /// Read a clause of the query spec.
    Clause(SpecAccessor),
    /// Materialize, then operate on the record sequence.
    Sequence(SequenceOp),
    /// `find_by_*` family.
    Finder {
        kind: FinderKind,
        attributes: AttributeConstraints,
    },
    /// `find_or_*_by_*` and `scoped_by_*`.
    Scope {
        kind: ScopeKind,
        attributes: AttributeConstraints,
    },
}

/// Result of [`Relation::dispatch`].
#[derive(Debug)]
pub enum Dispatched<R: Record> {
    Clause(ClauseValue),
    Records(Vec<R>),
    Record(Option<R>),
    Length(usize),
    Bool(bool),
    Relation(Relation<R>),
}

impl<R: Record + Clone> Relation<R> {
    /// Resolve an operation name without side effects.
    pub fn resolve(&self, name: &str) -> Option<Capability> {
        if let Some(accessor) = SpecAccessor::from_name(name) {
            return Some(Capability::Clause(accessor));
        }
        if let Some(op) = SequenceOp::from_name(name) {
            return Some(Capability::Sequence(op));
        }
        let matched = DynamicMatch::parse(name)?;
        if !self.entity.has_attributes(matched.attributes().names()) {
            return None;
        }
        Some(match matched {
            DynamicMatch::Finder { kind, attributes } => Capability::Finder { kind, attributes },
            DynamicMatch::Scope { kind, attributes } => Capability::Scope { kind, attributes },
        })
    }

    pub fn responds_to(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Run a named operation with positional arguments.
    ///
    /// Fails with `UnknownOperation` when [`Relation::resolve`] finds nothing.
    #[tracing::instrument(level = "debug", skip(self, args), fields(entity = %self.entity.name))]
    pub fn dispatch(&mut self, name: &str, args: &[Value]) -> Result<Dispatched<R>> {
        let Some(capability) = self.resolve(name) else {
            tracing::warn!(operation = name, "Unrecognized relation operation");
            return Err(Error::UnknownOperation {
                entity: self.entity.name.clone(),
                operation: name.to_string(),
            });
        };
        tracing::debug!(capability = ?capability, "Dispatching");

        match capability {
            Capability::Clause(accessor) => {
                expect_no_args(name, args)?;
                Ok(Dispatched::Clause(
                    self.spec.read(accessor, self.store.dialect()),
                ))
            }
            Capability::Sequence(op) => {
                expect_no_args(name, args)?;
                self.run_sequence(op)
            }
            Capability::Finder { kind, attributes } => {
                let conditions = attributes.bind(name, args)?;
                self.run_finder(kind, &conditions)
            }
            Capability::Scope { kind, attributes } => {
                let conditions = attributes.bind(name, args)?;
                self.run_scope(kind, &conditions)
            }
        }
    }

    fn run_sequence(&mut self, op: SequenceOp) -> Result<Dispatched<R>> {
        let records = self.to_a()?;
        Ok(match op {
            SequenceOp::Length => Dispatched::Length(records.len()),
            SequenceOp::First => Dispatched::Record(records.first().cloned()),
            SequenceOp::Last => Dispatched::Record(records.last().cloned()),
            SequenceOp::Entries => Dispatched::Records(records.to_vec()),
            SequenceOp::Reverse => Dispatched::Records(records.iter().rev().cloned().collect()),
            SequenceOp::IsEmpty => Dispatched::Bool(records.is_empty()),
        })
    }

    fn run_finder(
        &self,
        kind: FinderKind,
        conditions: &[(String, Value)],
    ) -> Result<Dispatched<R>> {
        let mut scoped = self.where_all(self.column_conditions(conditions));
        match kind {
            FinderKind::First => Ok(Dispatched::Record(scoped.first()?.cloned())),
            FinderKind::Last => Ok(Dispatched::Record(scoped.last()?.cloned())),
            FinderKind::All => Ok(Dispatched::Records(scoped.to_a()?.to_vec())),
            FinderKind::FirstOrFail => match scoped.first()? {
                Some(record) => Ok(Dispatched::Record(Some(record.clone()))),
                None => Err(Error::RecordNotFound {
                    entity: self.entity.name.clone(),
                    message: format!("with {}", describe(conditions)),
                }),
            },
        }
    }

    fn run_scope(&self, kind: ScopeKind, conditions: &[(String, Value)]) -> Result<Dispatched<R>> {
        let scoped = self.where_all(self.column_conditions(conditions));
        if kind == ScopeKind::ScopedBy {
            return Ok(Dispatched::Relation(scoped));
        }
        if let Some(record) = scoped.first()? {
            return Ok(Dispatched::Record(Some(record.clone())));
        }
        let record = if kind == ScopeKind::FindOrCreate {
            tracing::debug!(entity = %self.entity.name, "No match, creating record");
            self.store.create(&self.entity, conditions)?
        } else {
            self.store.build(&self.entity, conditions)?
        };
        Ok(Dispatched::Record(Some(record)))
    }

    /// Map attribute names to the columns backing them.
    fn column_conditions(&self, conditions: &[(String, Value)]) -> Vec<(String, Value)> {
        conditions
            .iter()
            .map(|(name, value)| {
                let column = self
                    .entity
                    .find_attribute(name)
                    .map_or(name.as_str(), Attribute::column_name);
                (column.to_string(), value.clone())
            })
            .collect()
    }
}

fn expect_no_args(operation: &str, args: &[Value]) -> Result<()> {
    if args.is_empty() {
        return Ok(());
    }
    Err(Error::InvalidArguments {
        operation: operation.to_string(),
        expected: 0,
        found: args.len(),
    })
}

fn describe(conditions: &[(String, Value)]) -> String {
    conditions
        .iter()
        .map(|(name, value)| format!("{} = {}", name, value))
        .collect::<Vec<_>>()
        .join(" AND ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_names_round_trip() {
        for op in SequenceOp::ALL {
            assert_eq!(SequenceOp::from_name(op.name()), Some(op));
        }
        assert_eq!(SequenceOp::from_name("size"), None);
    }

    #[test]
    fn test_describe_conditions() {
        let conditions = vec![
            ("name".to_string(), Value::from("Ann")),
            ("age".to_string(), Value::from(30)),
        ];
        assert_eq!(describe(&conditions), "name = 'Ann' AND age = 30");
    }

    #[test]
    fn test_extra_arguments_rejected() {
        assert!(expect_no_args("taken", &[]).is_ok());
        let err = expect_no_args("taken", &[Value::Null]).unwrap_err();
        assert!(matches!(err, Error::InvalidArguments { expected: 0, found: 1, .. }));
    }
}
