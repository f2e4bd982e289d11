//! Partial decision updates.
//!
//! A [`DecisionPatch`] holds only the fields a caller supplied, already
//! trimmed and checked. Column names in the generated statement come from
//! [`DecisionField::column`]; caller text only ever reaches bound parameters.

use sqlx::{QueryBuilder, Sqlite};

use crate::access::{AccessError, required};

/// Caller-mutable decision columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionField {
    Title,
    Description,
    Status,
}

impl DecisionField {
    /// Column name in the `decisions` table.
    pub const fn column(self) -> &'static str {
        match self {
            DecisionField::Title => "title",
            DecisionField::Description => "description",
            DecisionField::Status => "status",
        }
    }

    const fn label(self) -> &'static str {
        match self {
            DecisionField::Title => "Title",
            DecisionField::Description => "Description",
            DecisionField::Status => "Status",
        }
    }
}

/// A validated, non-empty set of field assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionPatch {
    assignments: Vec<(DecisionField, String)>,
}

impl DecisionPatch {
    /// Build a patch from optional inputs.
    ///
    /// `None` leaves a field unchanged; `Some` must be non-blank after
    /// trimming. At least one field must be supplied.
    pub fn new(
        title: Option<&str>,
        description: Option<&str>,
        status: Option<&str>,
    ) -> Result<Self, AccessError> {
        let mut assignments = Vec::with_capacity(3);
        for (field, value) in [
            (DecisionField::Title, title),
            (DecisionField::Description, description),
            (DecisionField::Status, status),
        ] {
            if let Some(value) = value {
                assignments.push((field, required(value, field.label())?));
            }
        }
        if assignments.is_empty() {
            return Err(AccessError::Validation(
                "At least one field is required".into(),
            ));
        }
        Ok(Self { assignments })
    }

    #[cfg(test)]
    fn get(&self, field: DecisionField) -> Option<&str> {
        self.assignments
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.as_str())
    }

    /// Fields this patch touches, in column order.
    pub fn fields(&self) -> impl Iterator<Item = DecisionField> + '_ {
        self.assignments.iter().map(|(f, _)| *f)
    }

    /// Owner-scoped UPDATE covering exactly the supplied fields.
    ///
    /// `updated_at` becomes `max(now, updated_at + 1)` so it strictly
    /// increases even when two updates land in the same microsecond.
    pub(crate) fn update_statement(
        &self,
        decision_id: i64,
        owner_id: i64,
        now_micros: i64,
    ) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new("UPDATE decisions SET ");
        for (field, value) in &self.assignments {
            qb.push(field.column());
            qb.push(" = ");
            qb.push_bind(value.clone());
            qb.push(", ");
        }
        qb.push("updated_at = MAX(");
        qb.push_bind(now_micros);
        qb.push(", updated_at + 1) WHERE id = ");
        qb.push_bind(decision_id);
        qb.push(" AND owner_id = ");
        qb.push_bind(owner_id);
        qb
    }
}
