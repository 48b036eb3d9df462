use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{require, ValidationError};

/// Column list shared by every statement that returns a member row
pub const USER_COLUMNS: &str =
    "id, company, role, name, surname, phone, email, user_type, deleted, created_at, updated_at";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub company: Uuid,
    pub role: Option<String>,
    pub name: String,
    pub surname: Option<String>,
    pub phone: String,
    pub email: String,
    pub user_type: Option<String>,
    #[serde(skip)]
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /users`. Missing required text fields are treated as empty.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub company: Uuid,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub user_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub id: Uuid,
    pub company: Uuid,
    pub role: Option<String>,
    pub name: String,
    pub surname: Option<String>,
    pub phone: String,
    pub email: String,
    pub user_type: Option<String>,
}

impl CreateUserRequest {
    pub fn into_new_user(self) -> Result<NewUser, ValidationError> {
        require("name", &self.name)?;
        require("email", &self.email)?;
        require("phone", &self.phone)?;

        Ok(NewUser {
            id: Uuid::now_v7(),
            company: self.company,
            role: self.role,
            name: self.name,
            surname: self.surname,
            phone: self.phone,
            email: self.email,
            user_type: self.user_type,
        })
    }
}

/// Body of `PATCH /users/{id}`. `null` and absence both mean "leave as is".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub company: Option<Uuid>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_type: Option<String>,
}

/// One assignment to one member column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserChange {
    Company(Uuid),
    Role(String),
    Name(String),
    Surname(String),
    Phone(String),
    Email(String),
    UserType(String),
}

impl UserChange {
    pub fn column(&self) -> &'static str {
        match self {
            UserChange::Company(_) => "company",
            UserChange::Role(_) => "role",
            UserChange::Name(_) => "name",
            UserChange::Surname(_) => "surname",
            UserChange::Phone(_) => "phone",
            UserChange::Email(_) => "email",
            UserChange::UserType(_) => "user_type",
        }
    }

    /// True when `user` already holds this value.
    pub fn is_noop_for(&self, user: &User) -> bool {
        match self {
            UserChange::Company(v) => user.company == *v,
            UserChange::Role(v) => user.role.as_deref() == Some(v.as_str()),
            UserChange::Name(v) => user.name == *v,
            UserChange::Surname(v) => user.surname.as_deref() == Some(v.as_str()),
            UserChange::Phone(v) => user.phone == *v,
            UserChange::Email(v) => user.email == *v,
            UserChange::UserType(v) => user.user_type.as_deref() == Some(v.as_str()),
        }
    }

    pub fn apply(&self, user: &mut User) {
        match self {
            UserChange::Company(v) => user.company = *v,
            UserChange::Role(v) => user.role = Some(v.clone()),
            UserChange::Name(v) => user.name = v.clone(),
            UserChange::Surname(v) => user.surname = Some(v.clone()),
            UserChange::Phone(v) => user.phone = v.clone(),
            UserChange::Email(v) => user.email = v.clone(),
            UserChange::UserType(v) => user.user_type = Some(v.clone()),
        }
    }
}

/// Non-empty, validated set of column assignments, at most one per column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserChangeset(Vec<UserChange>);

impl UserChangeset {
    pub fn changes(&self) -> &[UserChange] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reduce to the assignments that actually differ from `current`.
    pub fn diff_against(&self, current: &User) -> UserChangeset {
        UserChangeset(
            self.0
                .iter()
                .filter(|change| !change.is_noop_for(current))
                .cloned()
                .collect(),
        )
    }

    /// `current` with every assignment applied. Unspecified fields keep their value.
    pub fn merge_into(&self, current: &User) -> User {
        let mut merged = current.clone();
        for change in &self.0 {
            change.apply(&mut merged);
        }
        merged
    }
}

impl TryFrom<UpdateUserRequest> for UserChangeset {
    type Error = ValidationError;

    fn try_from(req: UpdateUserRequest) -> Result<Self, Self::Error> {
        if let Some(name) = &req.name {
            require("name", name)?;
        }
        if let Some(email) = &req.email {
            require("email", email)?;
        }
        if let Some(phone) = &req.phone {
            require("phone", phone)?;
        }

        let changes: Vec<UserChange> = [
            req.company.map(UserChange::Company),
            req.role.map(UserChange::Role),
            req.name.map(UserChange::Name),
            req.surname.map(UserChange::Surname),
            req.phone.map(UserChange::Phone),
            req.email.map(UserChange::Email),
            req.user_type.map(UserChange::UserType),
        ]
        .into_iter()
        .flatten()
        .collect();

        if changes.is_empty() {
            return Err(ValidationError::EmptyChangeset);
        }

        Ok(UserChangeset(changes))
    }
}
