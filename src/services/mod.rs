//! Business logic services

pub mod catalog;
pub mod loans;
pub mod requests;
pub mod stats;
pub mod users;

use crate::{
    config::{AuthConfig, LibraryConfig},
    models::issue::LoanPolicy,
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub requests: requests::RequestsService,
    pub stats: stats::StatsService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, library_config: LibraryConfig) -> Self {
        let policy = LoanPolicy::from(&library_config);

        Self {
            users: users::UsersService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone(), library_config.clone(), policy.clone()),
            requests: requests::RequestsService::new(repository.clone(), library_config.clone(), policy.clone()),
            stats: stats::StatsService::new(repository.clone(), library_config, policy),
            repository,
        }
    }
}
