//! The closed set of actions and their request/response shapes.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Every action content code may ask the host to perform.
///
/// Wire names are camelCase (`"addNewProject"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApiAction {
    AddNewProject,
    LoadConfig,
}

impl ApiAction {
    pub const ALL: &'static [ApiAction] = &[ApiAction::AddNewProject, ApiAction::LoadConfig];

    /// Name used on the wire.
    pub fn name(self) -> &'static str {
        match self {
            ApiAction::AddNewProject => "addNewProject",
            ApiAction::LoadConfig => "loadConfig",
        }
    }
}

impl fmt::Display for ApiAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ApiAction {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApiAction::ALL
            .iter()
            .copied()
            .find(|action| action.name() == s)
            .ok_or_else(|| ApiError::unknown_action(s))
    }
}

/// Binds an action to its request and response types.
///
/// Callers go through this trait, so a request shaped for one action cannot
/// be sent under another action's name.
pub trait ApiMessage {
    const ACTION: ApiAction;
    type Request: Serialize + DeserializeOwned + Send + 'static;
    type Response: Serialize + DeserializeOwned + Send + 'static;
}

// -- addNewProject --

pub struct AddNewProject;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddNewProjectRequest {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddNewProjectResponse {}

impl ApiMessage for AddNewProject {
    const ACTION: ApiAction = ApiAction::AddNewProject;
    type Request = AddNewProjectRequest;
    type Response = AddNewProjectResponse;
}

// -- loadConfig --

pub struct LoadConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadConfigRequest {}

/// Raw contents of the environment's `config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoadConfigResponse(pub serde_json::Value);

impl ApiMessage for LoadConfig {
    const ACTION: ApiAction = ApiAction::LoadConfig;
    type Request = LoadConfigRequest;
    type Response = LoadConfigResponse;
}
