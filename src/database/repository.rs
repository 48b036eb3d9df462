use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::company::{Company, NewCompany};
use crate::database::models::user::{NewUser, User, UserChangeset, USER_COLUMNS};
use crate::database::query_builder::{CompanyQueries, UserQueries};
use crate::filter::{CompanySort, Filter, UserSort};

#[async_trait]
pub trait CompanyStore: Send + Sync {
    async fn create_company(&self, company: NewCompany) -> Result<Company, DatabaseError>;
    async fn list_companies(&self, filter: &Filter<CompanySort>) -> Result<Vec<Company>, DatabaseError>;
    async fn get_company(&self, id: Uuid) -> Result<Company, DatabaseError>;
    async fn rename_company(&self, id: Uuid, name: &str) -> Result<Company, DatabaseError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError>;
    async fn list_users(&self, filter: &Filter<UserSort>) -> Result<Vec<User>, DatabaseError>;
    async fn get_user(&self, id: Uuid) -> Result<User, DatabaseError>;
    /// Apply `changes` and return the merged row. Unchanged values are not written.
    async fn update_user(&self, id: Uuid, changes: &UserChangeset) -> Result<User, DatabaseError>;
    /// Soft delete. A second call for the same id reports `NotFound`.
    async fn delete_user(&self, id: Uuid) -> Result<(), DatabaseError>;
}

/// PostgreSQL-backed implementation of both stores
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CompanyStore for PgRepository {
    async fn create_company(&self, company: NewCompany) -> Result<Company, DatabaseError> {
        let sql = format!(
            "INSERT INTO companies (id, name) VALUES ($1, $2) RETURNING {}",
            CompanyQueries::columns()
        );
        sqlx::query_as::<_, Company>(&sql)
            .bind(company.id)
            .bind(&company.name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, "company", "company"))
    }

    async fn list_companies(&self, filter: &Filter<CompanySort>) -> Result<Vec<Company>, DatabaseError> {
        let mut qb = CompanyQueries::list(filter);
        let rows = qb.build_query_as::<Company>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn get_company(&self, id: Uuid) -> Result<Company, DatabaseError> {
        let sql = format!("SELECT {} FROM companies WHERE id = $1", CompanyQueries::columns());
        sqlx::query_as::<_, Company>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DatabaseError::NotFound("company"))
    }

    async fn rename_company(&self, id: Uuid, name: &str) -> Result<Company, DatabaseError> {
        let sql = format!(
            "UPDATE companies SET name = $2, updated_at = now() WHERE id = $1 RETURNING {}",
            CompanyQueries::columns()
        );
        sqlx::query_as::<_, Company>(&sql)
            .bind(id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, "company", "company"))?
            .ok_or(DatabaseError::NotFound("company"))
    }
}

#[async_trait]
impl UserStore for PgRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (id, company, role, name, surname, phone, email, user_type) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(user.company)
            .bind(&user.role)
            .bind(&user.name)
            .bind(&user.surname)
            .bind(&user.phone)
            .bind(&user.email)
            .bind(&user.user_type)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, "user", "company"))
    }

    async fn list_users(&self, filter: &Filter<UserSort>) -> Result<Vec<User>, DatabaseError> {
        let mut qb = UserQueries::list(filter);
        let rows = qb.build_query_as::<User>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn get_user(&self, id: Uuid) -> Result<User, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1 AND NOT deleted", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DatabaseError::NotFound("user"))
    }

    async fn update_user(&self, id: Uuid, changes: &UserChangeset) -> Result<User, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        // Row lock keeps the diff and the write consistent with each other
        let sql = format!(
            "SELECT {} FROM users WHERE id = $1 AND NOT deleted FOR UPDATE",
            USER_COLUMNS
        );
        let current = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(DatabaseError::NotFound("user"))?;

        let minimal = changes.diff_against(&current);
        if minimal.is_empty() {
            tx.commit().await?;
            return Ok(current);
        }

        let mut qb = UserQueries::update(id, &minimal);
        let updated = qb
            .build_query_as::<User>()
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| DatabaseError::from_write(e, "user", "company"))?;

        tx.commit().await?;
        tracing::debug!(
            "Updated user {} ({} of {} fields changed)",
            id,
            minimal.changes().len(),
            changes.changes().len()
        );
        Ok(updated)
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE users SET deleted = true, updated_at = now() WHERE id = $1 AND NOT deleted",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("user"));
        }
        Ok(())
    }
}
