use super::types::SortDirection;

/// A closed set of columns a listing may be ordered by.
///
/// Client input never reaches SQL directly: `parse` maps an accepted name to a
/// variant and `column` hands back a fixed identifier.
pub trait Sortable: Copy + Send + Sync + 'static {
    fn parse(name: &str) -> Option<Self>;
    fn column(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSort {
    Name,
    Surname,
    Email,
    Phone,
    Role,
    UserType,
    Company,
    CreatedAt,
    UpdatedAt,
}

impl Sortable for UserSort {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "name" => Some(UserSort::Name),
            "surname" => Some(UserSort::Surname),
            "email" => Some(UserSort::Email),
            "phone" => Some(UserSort::Phone),
            "role" => Some(UserSort::Role),
            "user_type" | "userType" => Some(UserSort::UserType),
            "company" => Some(UserSort::Company),
            "created_at" | "createdAt" => Some(UserSort::CreatedAt),
            "updated_at" | "updatedAt" => Some(UserSort::UpdatedAt),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            UserSort::Name => "name",
            UserSort::Surname => "surname",
            UserSort::Email => "email",
            UserSort::Phone => "phone",
            UserSort::Role => "role",
            UserSort::UserType => "user_type",
            UserSort::Company => "company",
            UserSort::CreatedAt => "created_at",
            UserSort::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanySort {
    Name,
    CreatedAt,
}

impl Sortable for CompanySort {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "name" => Some(CompanySort::Name),
            "created_at" | "createdAt" => Some(CompanySort::CreatedAt),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            CompanySort::Name => "name",
            CompanySort::CreatedAt => "created_at",
        }
    }
}

pub struct FilterOrder;

impl FilterOrder {
    /// ORDER BY clause for a listing. Without a sort column rows come back in
    /// creation order; `id` always closes the ordering so pages never overlap.
    pub fn generate<S: Sortable>(sort: Option<S>, direction: SortDirection) -> String {
        let dir = direction.to_sql();
        let column = sort.map(|s| s.column()).unwrap_or("created_at");
        format!("ORDER BY \"{}\" {}, \"id\" {}", column, dir, dir)
    }
}
