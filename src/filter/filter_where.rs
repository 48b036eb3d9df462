use sqlx::{Postgres, QueryBuilder};

pub struct FilterWhere;

impl FilterWhere {
    /// Append the WHERE clause: every fixed predicate, then a case-sensitive
    /// substring match on the display name. The needle is always bound as a
    /// parameter, so `%` and `_` carry no wildcard meaning.
    pub fn push(qb: &mut QueryBuilder<'_, Postgres>, fixed: &[&str], name_contains: Option<&str>) {
        let mut clauses = 0;

        for predicate in fixed {
            qb.push(if clauses == 0 { " WHERE " } else { " AND " });
            qb.push(*predicate);
            clauses += 1;
        }

        if let Some(needle) = name_contains {
            qb.push(if clauses == 0 { " WHERE " } else { " AND " });
            qb.push("strpos(\"name\", ");
            qb.push_bind(needle.to_owned());
            qb.push(") > 0");
        }
    }

    /// Same predicate as the SQL above, for callers holding rows in memory.
    pub fn matches(name: &str, name_contains: Option<&str>) -> bool {
        name_contains.map_or(true, |needle| name.contains(needle))
    }
}
