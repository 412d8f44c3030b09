//! File-based survey store.
//!
//! Stores each survey as YAML on disk, organized by survey ID:
//!
//! ```text
//! <base>/<survey_id>/survey.yaml
//! <base>/<survey_id>/responses.yaml
//! ```
//!
//! The chat registry is rebuilt from disk on `open` and kept in memory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

use crate::domain::foundation::{ChatId, DomainError, SurveyId};
use crate::domain::survey::{Response, Survey};
use crate::ports::SurveyStore;

use super::{apply_chat_claim, survey_not_found};

/// File-based storage for surveys and responses.
#[derive(Debug)]
pub struct FileSurveyStore {
    base_path: PathBuf,
    /// Serializes writes and guards the chat registry.
    active_by_chat: Mutex<HashMap<ChatId, SurveyId>>,
}

impl FileSurveyStore {
    /// Open (or create) a store rooted at `base_path`.
    ///
    /// Scans existing surveys to rebuild the active-chat registry.
    pub async fn open<P: AsRef<Path>>(base_path: P) -> Result<Self, DomainError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).await.map_err(io_error)?;

        let mut active_by_chat = HashMap::new();
        let mut entries = fs::read_dir(&base_path).await.map_err(io_error)?;
        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            let survey_file = entry.path().join("survey.yaml");
            if !survey_file.exists() {
                continue;
            }
            let survey: Survey = read_yaml(&survey_file).await?;
            if survey.is_active() {
                active_by_chat.insert(survey.chat_id(), *survey.id());
            }
        }

        tracing::debug!(
            path = %base_path.display(),
            active = active_by_chat.len(),
            "Opened file survey store"
        );

        Ok(Self {
            base_path,
            active_by_chat: Mutex::new(active_by_chat),
        })
    }

    fn survey_dir(&self, id: &SurveyId) -> PathBuf {
        self.base_path.join(id.to_string())
    }

    fn survey_file_path(&self, id: &SurveyId) -> PathBuf {
        self.survey_dir(id).join("survey.yaml")
    }

    fn responses_file_path(&self, id: &SurveyId) -> PathBuf {
        self.survey_dir(id).join("responses.yaml")
    }

    async fn load_survey(&self, id: &SurveyId) -> Result<Option<Survey>, DomainError> {
        let path = self.survey_file_path(id);
        if !path.exists() {
            return Ok(None);
        }
        read_yaml(&path).await.map(Some)
    }

    async fn load_responses(&self, id: &SurveyId) -> Result<Vec<Response>, DomainError> {
        let path = self.responses_file_path(id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        read_yaml(&path).await
    }
}

#[async_trait]
impl SurveyStore for FileSurveyStore {
    async fn put(&self, survey: &Survey) -> Result<(), DomainError> {
        let mut active_by_chat = self.active_by_chat.lock().await;

        let mut claims = active_by_chat.clone();
        apply_chat_claim(&mut claims, survey)?;

        fs::create_dir_all(self.survey_dir(survey.id()))
            .await
            .map_err(io_error)?;
        write_yaml(&self.survey_file_path(survey.id()), survey).await?;

        // registry only changes once the file is written
        *active_by_chat = claims;
        Ok(())
    }

    async fn get(&self, id: &SurveyId) -> Result<Option<Survey>, DomainError> {
        self.load_survey(id).await
    }

    async fn find_active_by_chat(&self, chat_id: ChatId) -> Result<Option<Survey>, DomainError> {
        let holder = self.active_by_chat.lock().await.get(&chat_id).copied();
        match holder {
            Some(id) => self.load_survey(&id).await,
            None => Ok(None),
        }
    }

    async fn append_response(
        &self,
        survey_id: &SurveyId,
        response: &Response,
    ) -> Result<usize, DomainError> {
        let _guard = self.active_by_chat.lock().await;

        if !self.survey_file_path(survey_id).exists() {
            return Err(survey_not_found(survey_id));
        }

        let mut responses = self.load_responses(survey_id).await?;
        responses.push(response.clone());
        write_yaml(&self.responses_file_path(survey_id), &responses).await?;
        Ok(responses.len())
    }

    async fn list_responses(&self, survey_id: &SurveyId) -> Result<Vec<Response>, DomainError> {
        let _guard = self.active_by_chat.lock().await;
        self.load_responses(survey_id).await
    }

    async fn count_responses(&self, survey_id: &SurveyId) -> Result<usize, DomainError> {
        Ok(self.list_responses(survey_id).await?.len())
    }
}

async fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, DomainError> {
    let yaml = fs::read_to_string(path).await.map_err(io_error)?;
    serde_yaml::from_str(&yaml).map_err(|e| {
        DomainError::storage(format!("Failed to deserialize {}: {}", path.display(), e))
    })
}

async fn write_yaml<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), DomainError> {
    let yaml = serde_yaml::to_string(value)
        .map_err(|e| DomainError::storage(format!("Failed to serialize: {}", e)))?;

    // write-then-rename so readers never see a torn file
    let tmp = path.with_extension("yaml.tmp");
    fs::write(&tmp, yaml).await.map_err(io_error)?;
    fs::rename(&tmp, path).await.map_err(io_error)
}

fn io_error(e: std::io::Error) -> DomainError {
    DomainError::storage(format!("IO error: {}", e))
}
