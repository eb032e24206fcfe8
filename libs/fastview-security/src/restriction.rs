use std::collections::BTreeSet;

use uuid::Uuid;

use crate::resource::Record;

/// A declarative description of which rows of a collection are accessible.
///
/// Restrictions are what permissions compile to for collection-level
/// filtering. The storage layer translates them into its native predicate
/// form (see `fastview-db` for `SeaORM`); [`Restriction::matches`] is the
/// reference semantics for in-memory rows.
///
/// # Examples
///
/// ```
/// use fastview_security::Restriction;
/// use uuid::Uuid;
///
/// let owner = Uuid::new_v4();
/// let r = Restriction::and(Restriction::All, Restriction::eq("author", owner));
/// assert_eq!(r, Restriction::eq("author", owner));
///
/// // negation is pushed down to the leaves
/// let r = Restriction::or(Restriction::eq("author", owner), Restriction::eq("editor", owner));
/// assert!(matches!(r.negate(), Restriction::And(_)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Restriction {
    /// Matches every row.
    All,
    /// Matches no row.
    Nothing,
    /// `field = value`; a null field never matches.
    Eq { field: String, value: Uuid },
    /// Every child matches. An empty list matches every row.
    And(Vec<Restriction>),
    /// At least one child matches. An empty list matches no row.
    Or(Vec<Restriction>),
    /// The child does not match.
    Not(Box<Restriction>),
}

impl Restriction {
    #[must_use]
    pub fn eq(field: impl Into<String>, value: Uuid) -> Self {
        Self::Eq {
            field: field.into(),
            value,
        }
    }

    /// Intersection of two restrictions.
    ///
    /// `All` is the identity and `Nothing` absorbs; nested conjunctions are
    /// flattened.
    #[must_use]
    pub fn and(left: Self, right: Self) -> Self {
        match (left, right) {
            (Self::Nothing, _) | (_, Self::Nothing) => Self::Nothing,
            (Self::All, other) | (other, Self::All) => other,
            (Self::And(mut a), Self::And(b)) => {
                a.extend(b);
                Self::And(a)
            }
            (Self::And(mut a), other) => {
                a.push(other);
                Self::And(a)
            }
            (other, Self::And(b)) => {
                let mut parts = Vec::with_capacity(b.len() + 1);
                parts.push(other);
                parts.extend(b);
                Self::And(parts)
            }
            (a, b) => Self::And(vec![a, b]),
        }
    }

    /// Union of two restrictions.
    ///
    /// `Nothing` is the identity and `All` absorbs; nested disjunctions are
    /// flattened.
    #[must_use]
    pub fn or(left: Self, right: Self) -> Self {
        match (left, right) {
            (Self::All, _) | (_, Self::All) => Self::All,
            (Self::Nothing, other) | (other, Self::Nothing) => other,
            (Self::Or(mut a), Self::Or(b)) => {
                a.extend(b);
                Self::Or(a)
            }
            (Self::Or(mut a), other) => {
                a.push(other);
                Self::Or(a)
            }
            (other, Self::Or(b)) => {
                let mut parts = Vec::with_capacity(b.len() + 1);
                parts.push(other);
                parts.extend(b);
                Self::Or(parts)
            }
            (a, b) => Self::Or(vec![a, b]),
        }
    }

    /// Logical negation, pushed down to the leaves by De Morgan's law.
    ///
    /// The result only contains `Not` directly around `Eq` leaves, so a
    /// storage layer never has to negate a compound condition itself.
    #[must_use]
    pub fn negate(&self) -> Self {
        match self {
            Self::All => Self::Nothing,
            Self::Nothing => Self::All,
            Self::Eq { .. } => Self::Not(Box::new(self.clone())),
            Self::Not(inner) => inner.normalized(),
            Self::And(parts) => parts
                .iter()
                .map(Self::negate)
                .fold(Self::Nothing, Self::or),
            Self::Or(parts) => parts
                .iter()
                .map(Self::negate)
                .fold(Self::All, Self::and),
        }
    }

    /// Equivalent restriction with negations pushed down to the leaves and
    /// constants folded.
    #[must_use]
    pub fn normalized(&self) -> Self {
        match self {
            Self::All | Self::Nothing | Self::Eq { .. } => self.clone(),
            Self::Not(inner) => inner.negate(),
            Self::And(parts) => parts
                .iter()
                .map(Self::normalized)
                .fold(Self::All, Self::and),
            Self::Or(parts) => parts
                .iter()
                .map(Self::normalized)
                .fold(Self::Nothing, Self::or),
        }
    }

    /// Whether `record` belongs to the restricted set.
    #[must_use]
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        match self {
            Self::All => true,
            Self::Nothing => false,
            Self::Eq { field, value } => record.field_value(field) == Some(*value),
            Self::And(parts) => parts.iter().all(|p| p.matches(record)),
            Self::Or(parts) => parts.iter().any(|p| p.matches(record)),
            Self::Not(inner) => !inner.matches(record),
        }
    }

    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Names of all fields referenced anywhere in the restriction.
    #[must_use]
    pub fn fields(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
        match self {
            Self::All | Self::Nothing => {}
            Self::Eq { field, .. } => {
                out.insert(field.as_str());
            }
            Self::And(parts) | Self::Or(parts) => {
                for p in parts {
                    p.collect_fields(out);
                }
            }
            Self::Not(inner) => inner.collect_fields(out),
        }
    }
}
