use sqlx::{Postgres, QueryBuilder};

use super::error::FilterError;
use super::filter_order::{FilterOrder, Sortable};
use super::filter_where::FilterWhere;
use super::types::{ListParams, SortDirection};
use crate::config::FilterConfig;

/// Validated listing request for one entity kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter<S: Sortable> {
    pub offset: i64,
    pub limit: i64,
    pub sort: Option<S>,
    pub direction: SortDirection,
    pub name_contains: Option<String>,
}

impl<S: Sortable> Filter<S> {
    pub fn from_params(params: ListParams, config: &FilterConfig) -> Result<Self, FilterError> {
        if params.offset < 0 {
            return Err(FilterError::InvalidOffset(
                "Offset must be non-negative".to_string(),
            ));
        }
        if params.limit < 0 {
            return Err(FilterError::InvalidLimit(
                "Limit must be non-negative".to_string(),
            ));
        }

        let max_limit = config.max_limit.max(1);
        let limit = match params.limit {
            0 => config.default_limit.clamp(1, max_limit),
            n => n.min(max_limit),
        };

        let sort = match params.sorting.as_deref() {
            None | Some("") => None,
            Some(name) => {
                Some(S::parse(name).ok_or_else(|| FilterError::InvalidColumn(name.to_string()))?)
            }
        };

        Ok(Self {
            offset: params.offset,
            limit,
            sort,
            direction: SortDirection::from_descending(params.descending),
            name_contains: params.filter.filter(|f| !f.is_empty()),
        })
    }

    /// Append WHERE, ORDER BY, OFFSET and LIMIT to a `SELECT ... FROM table`.
    pub fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>, fixed: &[&str]) {
        FilterWhere::push(qb, fixed, self.name_contains.as_deref());
        qb.push(" ");
        qb.push(FilterOrder::generate(self.sort, self.direction));
        qb.push(" OFFSET ");
        qb.push_bind(self.offset);
        qb.push(" LIMIT ");
        qb.push_bind(self.limit);
    }

    pub fn matches_name(&self, name: &str) -> bool {
        FilterWhere::matches(name, self.name_contains.as_deref())
    }
}
