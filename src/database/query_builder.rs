use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::models::user::{UserChange, UserChangeset, USER_COLUMNS};
use crate::filter::{CompanySort, Filter, UserSort};

const COMPANY_COLUMNS: &str = "id, name, created_at, updated_at";

/// Statements for the `users` table. Soft-deleted rows are never visible.
pub struct UserQueries;

impl UserQueries {
    pub fn list(filter: &Filter<UserSort>) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!("SELECT {} FROM users", USER_COLUMNS));
        filter.push_sql(&mut qb, &["NOT deleted"]);
        qb
    }

    /// One UPDATE touching exactly the columns in `changes`. The caller must
    /// not pass an empty changeset.
    pub fn update(id: Uuid, changes: &UserChangeset) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("UPDATE users SET ");

        for change in changes.changes() {
            qb.push(change.column());
            qb.push(" = ");
            match change {
                UserChange::Company(v) => qb.push_bind(*v),
                UserChange::Role(v)
                | UserChange::Name(v)
                | UserChange::Surname(v)
                | UserChange::Phone(v)
                | UserChange::Email(v)
                | UserChange::UserType(v) => qb.push_bind(v.clone()),
            };
            qb.push(", ");
        }

        qb.push("updated_at = now() WHERE id = ");
        qb.push_bind(id);
        qb.push(" AND NOT deleted RETURNING ");
        qb.push(USER_COLUMNS);
        qb
    }
}

/// Statements for the `companies` table.
pub struct CompanyQueries;

impl CompanyQueries {
    pub fn list(filter: &Filter<CompanySort>) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!("SELECT {} FROM companies", COMPANY_COLUMNS));
        filter.push_sql(&mut qb, &[]);
        qb
    }

    pub fn columns() -> &'static str {
        COMPANY_COLUMNS
    }
}
