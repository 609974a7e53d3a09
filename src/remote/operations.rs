//! One method per instance-manager endpoint.

use super::*;
use crate::model::schema::Schema;
use crate::model::{SaveRecord, StatusMap, parse_save_list, parse_status_map};

impl ApiClient {
    pub async fn fleet_status(&self) -> Result<StatusMap, ApiError> {
        let value = self.get_json("/api/status").await?;
        Ok(parse_status_map(&value))
    }

    pub async fn list_saves(&self) -> Result<Vec<SaveRecord>, ApiError> {
        let value = self.get_json("/api/saves").await?;
        Ok(parse_save_list(&value))
    }

    pub async fn schema(&self) -> Result<Schema, ApiError> {
        let value = self.get_json("/api/schema").await?;
        Schema::from_json(value).map_err(|err| ApiError::transport(format!("parse schema: {err}")))
    }

    pub async fn versions(&self) -> Result<Vec<String>, ApiError> {
        let value = self.get_json("/api/versions").await?;
        serde_json::from_value(value)
            .map_err(|err| ApiError::transport(format!("parse versions: {err}")))
    }

    /// Returns the created save as the server describes it. A server that
    /// answers with an empty body gets a bare offline record.
    pub async fn create_save(
        &self,
        name: &str,
        version: &str,
        values: &Values,
    ) -> Result<SaveRecord, ApiError> {
        let value = self
            .post_json(
                "/api/create_save",
                &CreateSaveRequest {
                    name,
                    version,
                    values,
                },
            )
            .await?;
        Ok(SaveRecord::from_json(&value)
            .unwrap_or_else(|| SaveRecord::new(name, crate::model::SaveStatus::Offline)))
    }

    pub async fn modify_save(&self, name: &str, values: &Values) -> Result<(), ApiError> {
        self.post_json("/api/modify_save", &ModifySaveRequest { name, values })
            .await?;
        Ok(())
    }

    pub async fn delete_save(&self, name: &str) -> Result<(), ApiError> {
        self.post_json("/api/delete_save", &NameRequest { name })
            .await?;
        Ok(())
    }

    pub async fn start_save(&self, name: &str) -> Result<(), ApiError> {
        self.post_json("/api/start_save", &NameRequest { name })
            .await?;
        Ok(())
    }

    pub async fn stop_save(&self, name: &str) -> Result<(), ApiError> {
        self.post_json("/api/stop_save", &NameRequest { name })
            .await?;
        Ok(())
    }

    /// Writes one line to the save's console.
    pub async fn send_command(&self, name: &str, command: &str) -> Result<(), ApiError> {
        self.post_json("/api/command", &CommandRequest { name, command })
            .await?;
        Ok(())
    }
}
