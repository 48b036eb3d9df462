use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{require, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /companies`. Any client-supplied id is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCompanyRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCompanyRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCompany {
    pub id: Uuid,
    pub name: String,
}

impl CreateCompanyRequest {
    pub fn into_new_company(self) -> Result<NewCompany, ValidationError> {
        require("name", &self.name)?;
        Ok(NewCompany {
            id: Uuid::now_v7(),
            name: self.name,
        })
    }
}

impl UpdateCompanyRequest {
    /// The only mutable column of an organization is its name.
    pub fn into_name(self) -> Result<String, ValidationError> {
        let name = self.name.ok_or(ValidationError::EmptyChangeset)?;
        require("name", &name)?;
        Ok(name)
    }
}
