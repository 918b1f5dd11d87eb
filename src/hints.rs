//! Generic list filters, sorting and pagination, and their translation onto
//! a user query.
//!
//! Hints reach the store as an ordered list of `(field, comparator, value)`
//! filters. Federated identity attributes are pulled out first by
//! [`Hints::split_federated`]; whatever is left is applied by [`apply`]
//! against the user columns.

use sqlx::{Postgres, QueryBuilder};

use crate::db::users::NAME_EXPR;
use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Equals,
    Contains,
    StartsWith,
    EndsWith,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Bool(bool),
}

impl FilterValue {
    fn into_text(self) -> String {
        match self {
            FilterValue::Text(s) => s,
            FilterValue::Bool(b) => b.to_string(),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub name: String,
    pub value: FilterValue,
    pub comparator: Comparator,
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hints {
    pub filters: Vec<Filter>,
    pub sort: Vec<Sort>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl Hints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a case-sensitive equality filter.
    pub fn add_filter(self, name: &str, value: impl Into<FilterValue>) -> Self {
        self.add_filter_with(name, value, Comparator::Equals, true)
    }

    pub fn add_filter_with(
        mut self,
        name: &str,
        value: impl Into<FilterValue>,
        comparator: Comparator,
        case_sensitive: bool,
    ) -> Self {
        self.filters.push(Filter {
            name: name.to_string(),
            value: value.into(),
            comparator,
            case_sensitive,
        });
        self
    }

    pub fn sort_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.sort.push(Sort {
            field: field.to_string(),
            direction,
        });
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Separates filters on federated identity attributes from the rest.
    ///
    /// Federated filters always become exact matches. The returned hints no
    /// longer contain them, so the generic translator never sees a field it
    /// cannot resolve against the user columns.
    pub fn split_federated(self) -> (Vec<FederatedPredicate>, Hints) {
        let Hints {
            filters,
            sort,
            offset,
            limit,
        } = self;

        let mut predicates = Vec::new();
        let mut remaining = Vec::with_capacity(filters.len());
        for filter in filters {
            match FederatedAttr::from_name(&filter.name) {
                Some(attr) => predicates.push(FederatedPredicate {
                    attr,
                    value: filter.value.into_text(),
                }),
                None => remaining.push(filter),
            }
        }

        (
            predicates,
            Hints {
                filters: remaining,
                sort,
                offset,
                limit,
            },
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FederatedAttr {
    IdpId,
    ProtocolId,
    UniqueId,
}

impl FederatedAttr {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "idp_id" => Some(FederatedAttr::IdpId),
            "protocol_id" => Some(FederatedAttr::ProtocolId),
            "unique_id" => Some(FederatedAttr::UniqueId),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            FederatedAttr::IdpId => "fu.idp_id",
            FederatedAttr::ProtocolId => "fu.protocol_id",
            FederatedAttr::UniqueId => "fu.unique_id",
        }
    }
}

/// An exact match on one federated identity attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedPredicate {
    pub attr: FederatedAttr,
    pub value: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Text,
    Bool,
}

fn user_column(name: &str) -> Option<(&'static str, ColumnKind)> {
    match name {
        "id" => Some(("u.id", ColumnKind::Text)),
        "name" => Some((NAME_EXPR, ColumnKind::Text)),
        "domain_id" => Some(("u.domain_id", ColumnKind::Text)),
        "enabled" => Some(("u.enabled", ColumnKind::Bool)),
        "default_project_id" => Some(("u.default_project_id", ColumnKind::Text)),
        _ => None,
    }
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Appends the filters, ordering and pagination in `hints` to `query`.
///
/// `query` must already end inside a `WHERE` clause so each filter can be
/// appended as `AND ...`.
pub fn apply(hints: &Hints, query: &mut QueryBuilder<'_, Postgres>) -> Result<(), StoreError> {
    for filter in &hints.filters {
        push_filter(filter, query)?;
    }

    if !hints.sort.is_empty() {
        query.push(" ORDER BY ");
        for (i, sort) in hints.sort.iter().enumerate() {
            let (column, _) = user_column(&sort.field).ok_or_else(|| {
                StoreError::InvalidHint(format!("cannot sort users by '{}'", sort.field))
            })?;
            if i > 0 {
                query.push(", ");
            }
            query.push(column);
            query.push(match sort.direction {
                SortDirection::Asc => " ASC",
                SortDirection::Desc => " DESC",
            });
        }
    }

    if let Some(limit) = hints.limit {
        query.push(" LIMIT ").push_bind(to_i64(limit, "limit")?);
    }

    if let Some(offset) = hints.offset {
        query.push(" OFFSET ").push_bind(to_i64(offset, "offset")?);
    }

    Ok(())
}

fn push_filter(filter: &Filter, query: &mut QueryBuilder<'_, Postgres>) -> Result<(), StoreError> {
    let (column, kind) = user_column(&filter.name).ok_or_else(|| {
        StoreError::InvalidHint(format!("unknown user filter '{}'", filter.name))
    })?;

    match (&filter.value, kind) {
        (FilterValue::Bool(value), ColumnKind::Bool) => {
            if filter.comparator != Comparator::Equals {
                return Err(StoreError::InvalidHint(format!(
                    "'{}' only supports exact matches",
                    filter.name
                )));
            }
            query.push(" AND ").push(column).push(" = ").push_bind(*value);
        }
        (FilterValue::Text(value), ColumnKind::Text) => {
            if filter.comparator == Comparator::Equals && filter.case_sensitive {
                query
                    .push(" AND ")
                    .push(column)
                    .push(" = ")
                    .push_bind(value.clone());
                return Ok(());
            }

            let escaped = escape_like(value);
            let pattern = match filter.comparator {
                Comparator::Equals => escaped,
                Comparator::Contains => format!("%{escaped}%"),
                Comparator::StartsWith => format!("{escaped}%"),
                Comparator::EndsWith => format!("%{escaped}"),
            };
            let op = if filter.case_sensitive { " LIKE " } else { " ILIKE " };
            query
                .push(" AND ")
                .push(column)
                .push(op)
                .push_bind(pattern)
                .push(" ESCAPE '\\'");
        }
        _ => {
            return Err(StoreError::InvalidHint(format!(
                "value type does not match user field '{}'",
                filter.name
            )));
        }
    }

    Ok(())
}

fn to_i64(value: u64, what: &str) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::InvalidHint(format!("{what} out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> QueryBuilder<'static, Postgres> {
        QueryBuilder::new("SELECT u.id FROM users u WHERE true")
    }

    #[test]
    fn split_moves_federated_filters_out() {
        let hints = Hints::new()
            .add_filter("idp_id", "acme")
            .add_filter("enabled", true)
            .add_filter_with("unique_id", "bob", Comparator::Contains, false)
            .with_limit(5);

        let (predicates, rest) = hints.split_federated();

        assert_eq!(
            predicates,
            vec![
                FederatedPredicate {
                    attr: FederatedAttr::IdpId,
                    value: "acme".to_string(),
                },
                FederatedPredicate {
                    attr: FederatedAttr::UniqueId,
                    value: "bob".to_string(),
                },
            ]
        );
        assert_eq!(rest.filters.len(), 1);
        assert_eq!(rest.filters[0].name, "enabled");
        assert_eq!(rest.limit, Some(5));
        assert!(rest.filters.iter().all(|f| f.name != "idp_id"));
    }

    #[test]
    fn exact_text_filter_binds_plain_equality() {
        let mut query = base();
        apply(&Hints::new().add_filter("domain_id", "corp"), &mut query).unwrap();
        assert_eq!(query.sql(), "SELECT u.id FROM users u WHERE true AND u.domain_id = $1");
    }

    #[test]
    fn case_insensitive_contains_uses_ilike() {
        let mut query = base();
        let hints = Hints::new().add_filter_with("id", "ab", Comparator::Contains, false);
        apply(&hints, &mut query).unwrap();
        assert_eq!(
            query.sql(),
            "SELECT u.id FROM users u WHERE true AND u.id ILIKE $1 ESCAPE '\\'"
        );
    }

    #[test]
    fn sort_and_pagination_are_appended_in_order() {
        let mut query = base();
        let hints = Hints::new()
            .add_filter("enabled", true)
            .sort_by("domain_id", SortDirection::Asc)
            .sort_by("id", SortDirection::Desc)
            .with_limit(10)
            .with_offset(20);
        apply(&hints, &mut query).unwrap();
        assert_eq!(
            query.sql(),
            "SELECT u.id FROM users u WHERE true AND u.enabled = $1 \
             ORDER BY u.domain_id ASC, u.id DESC LIMIT $2 OFFSET $3"
        );
    }

    #[test]
    fn unknown_field_is_rejected() {
        let mut query = base();
        let err = apply(&Hints::new().add_filter("idp_id", "acme"), &mut query).unwrap_err();
        assert!(matches!(err, StoreError::InvalidHint(_)));
    }

    #[test]
    fn boolean_field_rejects_pattern_comparators() {
        let mut query = base();
        let hints = Hints::new().add_filter_with("enabled", true, Comparator::Contains, true);
        assert!(matches!(
            apply(&hints, &mut query),
            Err(StoreError::InvalidHint(_))
        ));

        let mut query = base();
        let hints = Hints::new().add_filter("enabled", "yes");
        assert!(matches!(
            apply(&hints, &mut query),
            Err(StoreError::InvalidHint(_))
        ));
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
