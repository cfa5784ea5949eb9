//! Host-side handlers, one method per [`ApiAction`](crate::ApiAction).

use ciska_common::ConfigError;
use ciska_config::ConfigStore;

use crate::messages::{
    AddNewProjectRequest, AddNewProjectResponse, LoadConfigRequest, LoadConfigResponse,
};

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Failed(String),
}

/// The action registry.
///
/// The dispatcher matches exhaustively on `ApiAction` and calls the method
/// for each variant, so a new action does not build until it has a handler
/// here.
pub trait UseCases: Send + Sync + 'static {
    fn add_new_project(
        &self,
        request: AddNewProjectRequest,
    ) -> Result<AddNewProjectResponse, HandlerError>;

    fn load_config(&self, request: LoadConfigRequest) -> Result<LoadConfigResponse, HandlerError>;
}

/// Production handlers.
pub struct ShellUseCases {
    config: ConfigStore,
}

impl ShellUseCases {
    pub fn new(config: ConfigStore) -> Self {
        Self { config }
    }
}

impl UseCases for ShellUseCases {
    fn add_new_project(
        &self,
        _request: AddNewProjectRequest,
    ) -> Result<AddNewProjectResponse, HandlerError> {
        Ok(AddNewProjectResponse {})
    }

    fn load_config(&self, _request: LoadConfigRequest) -> Result<LoadConfigResponse, HandlerError> {
        let value = self.config.load_or_create_value()?;
        Ok(LoadConfigResponse(value))
    }
}
