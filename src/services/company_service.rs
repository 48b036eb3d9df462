use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::ServiceError;
use crate::config::FilterConfig;
use crate::database::models::company::{Company, CreateCompanyRequest, UpdateCompanyRequest};
use crate::database::CompanyStore;
use crate::filter::{CompanySort, Filter, ListParams};

#[derive(Clone)]
pub struct CompanyService {
    store: Arc<dyn CompanyStore>,
    filter: FilterConfig,
}

impl CompanyService {
    pub fn new(store: Arc<dyn CompanyStore>, filter: FilterConfig) -> Self {
        Self { store, filter }
    }

    pub async fn create(&self, req: CreateCompanyRequest) -> Result<Company, ServiceError> {
        let new_company = req.into_new_company()?;
        let company = self.store.create_company(new_company).await?;
        info!("Created company {} ({})", company.id, company.name);
        Ok(company)
    }

    pub async fn list(&self, params: ListParams) -> Result<Vec<Company>, ServiceError> {
        let filter = Filter::<CompanySort>::from_params(params, &self.filter)?;
        Ok(self.store.list_companies(&filter).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Company, ServiceError> {
        Ok(self.store.get_company(id).await?)
    }

    /// Unknown ids are reported before the new name is checked
    pub async fn rename(&self, id: Uuid, req: UpdateCompanyRequest) -> Result<Company, ServiceError> {
        self.store.get_company(id).await?;
        let name = req.into_name()?;
        let company = self.store.rename_company(id, &name).await?;
        info!("Renamed company {} to {}", company.id, company.name);
        Ok(company)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{filter_config, MemoryStore};

    fn service(store: &Arc<MemoryStore>) -> CompanyService {
        CompanyService::new(store.clone(), filter_config())
    }

    fn named(name: &str) -> CreateCompanyRequest {
        CreateCompanyRequest {
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn empty_name_never_reaches_store() {
        let store = Arc::new(MemoryStore::default());
        let err = service(&store).create(named("")).await.unwrap_err();
        assert!(matches!(err, ServiceError::ValidationFailed { field: "name", .. }));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn duplicate_name_is_reported() {
        let store = Arc::new(MemoryStore::default());
        let svc = service(&store);
        svc.create(named("Acme")).await.unwrap();
        let err = svc.create(named("Acme")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Duplicate("company")));
    }

    #[tokio::test]
    async fn rename_rules() {
        let store = Arc::new(MemoryStore::default());
        let svc = service(&store);
        let acme = svc.create(named("Acme")).await.unwrap();
        svc.create(named("Globex")).await.unwrap();

        let renamed = svc
            .rename(acme.id, UpdateCompanyRequest { name: Some("Initech".into()) })
            .await
            .unwrap();
        assert_eq!(renamed.name, "Initech");
        assert_eq!(svc.get(acme.id).await.unwrap().name, "Initech");

        let err = svc
            .rename(acme.id, UpdateCompanyRequest { name: Some("Globex".into()) })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Duplicate("company")));

        let err = svc
            .rename(Uuid::now_v7(), UpdateCompanyRequest { name: Some("Other".into()) })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("company")));

        let err = svc.rename(acme.id, UpdateCompanyRequest::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::EmptyChangeset));
    }

    #[tokio::test]
    async fn unknown_company_wins_over_bad_rename() {
        let store = Arc::new(MemoryStore::default());
        let svc = service(&store);
        for req in [
            UpdateCompanyRequest::default(),
            UpdateCompanyRequest { name: Some(String::new()) },
        ] {
            let err = svc.rename(Uuid::now_v7(), req).await.unwrap_err();
            assert!(matches!(err, ServiceError::NotFound("company")));
        }
    }

    #[tokio::test]
    async fn invalid_sorting_is_a_parameter_error() {
        let store = Arc::new(MemoryStore::default());
        let params = ListParams {
            sorting: Some("phone".into()),
            ..Default::default()
        };
        let err = service(&store).list(params).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidParams(_)));
        assert_eq!(store.calls(), 0);
    }
}
