use fastview_security::{ConfigurationError, Restriction};
use sea_orm::{ColumnTrait, Condition, EntityTrait, sea_query::Expr};

use crate::field_map::FieldMap;

pub(crate) fn allow_all() -> Condition {
    Condition::all().add(Expr::value(true))
}

pub(crate) fn deny_all() -> Condition {
    Condition::all().add(Expr::value(false))
}

/// Builds a `SeaORM` `Condition` equivalent to `restriction`.
///
/// # Translation
/// - `All` / empty `And` → `TRUE`; `Nothing` / empty `Or` → `FALSE`
/// - `Eq` → `col = value`, which never matches `NULL`
/// - `Not(Eq)` → `col <> value OR col IS NULL`, so a row with no owner is
///   "not owned" exactly as in memory
/// - any other `Not` is pushed down with De Morgan before translating
///
/// # Errors
/// Returns `ConfigurationError::UnknownField` if the restriction references
/// a field with no mapped column.
pub fn build_restriction_condition<E>(
    restriction: &Restriction,
    fields: &FieldMap<E>,
) -> Result<Condition, ConfigurationError>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    let cond = match restriction {
        Restriction::All => allow_all(),
        Restriction::Nothing => deny_all(),
        Restriction::Eq { field, value } => {
            Condition::all().add(ColumnTrait::eq(&fields.column(field)?, *value))
        }
        Restriction::And(children) if children.is_empty() => allow_all(),
        Restriction::And(children) => children.iter().try_fold(Condition::all(), |acc, c| {
            Ok::<_, ConfigurationError>(acc.add(build_restriction_condition(c, fields)?))
        })?,
        Restriction::Or(children) if children.is_empty() => deny_all(),
        Restriction::Or(children) => children.iter().try_fold(Condition::any(), |acc, c| {
            Ok::<_, ConfigurationError>(acc.add(build_restriction_condition(c, fields)?))
        })?,
        Restriction::Not(inner) => match inner.as_ref() {
            Restriction::Eq { field, value } => {
                let col = fields.column(field)?;
                Condition::any()
                    .add(ColumnTrait::ne(&col, *value))
                    .add(col.is_null())
            }
            other => build_restriction_condition(&other.negate(), fields)?,
        },
    };
    Ok(cond)
}
