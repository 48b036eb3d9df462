//! In-memory stores with the same observable semantics as `PgRepository`,
//! plus a counter of every store call so tests can assert that a rejected
//! request never reached persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::FilterConfig;
use crate::database::models::company::{Company, NewCompany};
use crate::database::models::user::{CreateUserRequest, NewUser, User, UserChangeset};
use crate::database::{CompanyStore, DatabaseError, UserStore};
use crate::filter::{CompanySort, Filter, SortDirection, Sortable, UserSort};

pub fn filter_config() -> FilterConfig {
    FilterConfig {
        default_limit: 10,
        max_limit: 1000,
    }
}

/// Minimal valid member body
pub fn member(company: Uuid, name: &str, email: &str) -> CreateUserRequest {
    CreateUserRequest {
        company,
        role: None,
        name: name.to_string(),
        surname: None,
        phone: "+10000000000".to_string(),
        email: email.to_string(),
        user_type: None,
    }
}

#[derive(Default)]
pub struct MemoryStore {
    companies: RwLock<Vec<Company>>,
    users: RwLock<Vec<User>>,
    calls: AtomicUsize,
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum Key {
    Text(Text),
    Time(DateTime<Utc>),
    Id(Uuid),
}

/// Nullable text column. `Null` sorts after every value, like Postgres in
/// ascending order (and first once reversed for descending).
#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum Text {
    Value(String),
    Null,
}

impl From<Option<&String>> for Text {
    fn from(value: Option<&String>) -> Self {
        value.map_or(Text::Null, |v| Text::Value(v.clone()))
    }
}

impl MemoryStore {
    /// Number of store operations performed so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Insert an organization without counting it as a call
    pub async fn seed_company(&self, name: &str) -> Uuid {
        let now = Utc::now();
        let id = Uuid::now_v7();
        self.companies.write().await.push(Company {
            id,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        });
        id
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    async fn company_exists(&self, id: Uuid) -> bool {
        self.companies.read().await.iter().any(|c| c.id == id)
    }
}

/// Order, filter and page rows the way the SQL listing does. Rows are held
/// in insertion order, so the stable sort keeps ties in creation order.
fn page<T: Clone, S: Sortable>(
    rows: &[T],
    filter: &Filter<S>,
    name: impl Fn(&T) -> &str,
    key: impl Fn(&T, Option<S>) -> Key,
) -> Vec<T> {
    let mut matched: Vec<T> = rows
        .iter()
        .filter(|row| filter.matches_name(name(row)))
        .cloned()
        .collect();
    matched.sort_by(|a, b| key(a, filter.sort).cmp(&key(b, filter.sort)));
    if filter.direction == SortDirection::Desc {
        matched.reverse();
    }
    matched
        .into_iter()
        .skip(filter.offset as usize)
        .take(filter.limit as usize)
        .collect()
}

fn user_key(user: &User, sort: Option<UserSort>) -> Key {
    match sort {
        None | Some(UserSort::CreatedAt) => Key::Time(user.created_at),
        Some(UserSort::UpdatedAt) => Key::Time(user.updated_at),
        Some(UserSort::Company) => Key::Id(user.company),
        Some(UserSort::Name) => Key::Text(Text::Value(user.name.clone())),
        Some(UserSort::Surname) => Key::Text(user.surname.as_ref().into()),
        Some(UserSort::Email) => Key::Text(Text::Value(user.email.clone())),
        Some(UserSort::Phone) => Key::Text(Text::Value(user.phone.clone())),
        Some(UserSort::Role) => Key::Text(user.role.as_ref().into()),
        Some(UserSort::UserType) => Key::Text(user.user_type.as_ref().into()),
    }
}

fn company_key(company: &Company, sort: Option<CompanySort>) -> Key {
    match sort {
        None | Some(CompanySort::CreatedAt) => Key::Time(company.created_at),
        Some(CompanySort::Name) => Key::Text(Text::Value(company.name.clone())),
    }
}

#[async_trait]
impl CompanyStore for MemoryStore {
    async fn create_company(&self, company: NewCompany) -> Result<Company, DatabaseError> {
        self.touch();
        let mut companies = self.companies.write().await;
        if companies.iter().any(|c| c.name == company.name) {
            return Err(DatabaseError::Duplicate("company"));
        }
        let now = Utc::now();
        let row = Company {
            id: company.id,
            name: company.name,
            created_at: now,
            updated_at: now,
        };
        companies.push(row.clone());
        Ok(row)
    }

    async fn list_companies(&self, filter: &Filter<CompanySort>) -> Result<Vec<Company>, DatabaseError> {
        self.touch();
        let companies = self.companies.read().await;
        Ok(page(&companies, filter, |c| c.name.as_str(), company_key))
    }

    async fn get_company(&self, id: Uuid) -> Result<Company, DatabaseError> {
        self.touch();
        self.companies
            .read()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(DatabaseError::NotFound("company"))
    }

    async fn rename_company(&self, id: Uuid, name: &str) -> Result<Company, DatabaseError> {
        self.touch();
        let mut companies = self.companies.write().await;
        if companies.iter().any(|c| c.id != id && c.name == name) {
            return Err(DatabaseError::Duplicate("company"));
        }
        let company = companies
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(DatabaseError::NotFound("company"))?;
        company.name = name.to_string();
        company.updated_at = Utc::now();
        Ok(company.clone())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        self.touch();
        if !self.company_exists(user.company).await {
            return Err(DatabaseError::ReferenceNotFound("company"));
        }
        let mut users = self.users.write().await;
        if users.iter().any(|u| !u.deleted && u.email == user.email) {
            return Err(DatabaseError::Duplicate("user"));
        }
        let now = Utc::now();
        let row = User {
            id: user.id,
            company: user.company,
            role: user.role,
            name: user.name,
            surname: user.surname,
            phone: user.phone,
            email: user.email,
            user_type: user.user_type,
            deleted: false,
            created_at: now,
            updated_at: now,
        };
        users.push(row.clone());
        Ok(row)
    }

    async fn list_users(&self, filter: &Filter<UserSort>) -> Result<Vec<User>, DatabaseError> {
        self.touch();
        let users = self.users.read().await;
        let live: Vec<User> = users.iter().filter(|u| !u.deleted).cloned().collect();
        Ok(page(&live, filter, |u| u.name.as_str(), user_key))
    }

    async fn get_user(&self, id: Uuid) -> Result<User, DatabaseError> {
        self.touch();
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.id == id && !u.deleted)
            .cloned()
            .ok_or(DatabaseError::NotFound("user"))
    }

    async fn update_user(&self, id: Uuid, changes: &UserChangeset) -> Result<User, DatabaseError> {
        self.touch();
        let mut users = self.users.write().await;
        let index = users
            .iter()
            .position(|u| u.id == id && !u.deleted)
            .ok_or(DatabaseError::NotFound("user"))?;

        let minimal = changes.diff_against(&users[index]);
        if minimal.is_empty() {
            return Ok(users[index].clone());
        }

        let mut merged = minimal.merge_into(&users[index]);
        if merged.company != users[index].company && !self.company_exists(merged.company).await {
            return Err(DatabaseError::ReferenceNotFound("company"));
        }
        if users
            .iter()
            .any(|u| u.id != id && !u.deleted && u.email == merged.email)
        {
            return Err(DatabaseError::Duplicate("user"));
        }

        merged.updated_at = Utc::now();
        users[index] = merged.clone();
        Ok(merged)
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.touch();
        let mut users = self.users.write().await;
        let user = users
            .iter_mut()
            .find(|u| u.id == id && !u.deleted)
            .ok_or(DatabaseError::NotFound("user"))?;
        user.deleted = true;
        user.updated_at = Utc::now();
        Ok(())
    }
}
