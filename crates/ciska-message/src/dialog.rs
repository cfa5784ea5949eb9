//! The `openDialog` channel: options in, selected paths out.

use std::path::PathBuf;

use async_trait::async_trait;
use ciska_common::PlatformError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DialogProperty {
    OpenFile,
    OpenDirectory,
    MultiSelections,
    ShowHiddenFiles,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OpenDialogOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_path: Option<PathBuf>,
    pub properties: Vec<DialogProperty>,
    pub filters: Vec<FileFilter>,
}

/// Native file picker provided by the windowing host.
#[async_trait]
pub trait FilePicker: Send + Sync + 'static {
    /// Show the picker and return the selected paths. A cancelled dialog
    /// returns an empty list.
    async fn pick(&self, options: OpenDialogOptions) -> Result<Vec<PathBuf>, PlatformError>;
}

/// Picker for hosts without a native dialog: every request is treated as
/// cancelled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPicker;

#[async_trait]
impl FilePicker for NullPicker {
    async fn pick(&self, options: OpenDialogOptions) -> Result<Vec<PathBuf>, PlatformError> {
        tracing::debug!(title = ?options.title, "no native picker, returning empty selection");
        Ok(Vec::new())
    }
}
