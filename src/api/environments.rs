//! Environment model and provisioning readiness

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::api::poll::wait_until;
use crate::api::ApiClient;
use crate::config::api;
use crate::error::Result;

/// Environment as returned by the v2 environments API
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_type: Option<String>,
    /// `cm`, `eh`, or absent for combined environments
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub environment_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_status: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_last_failure_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_context_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_context_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sitecore_major_version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sitecore_minor_version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy_on_commit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_availability_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_successful_deployment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
}

impl Environment {
    /// Provisioned environments expose both a preview and a live context id
    pub fn is_ready(&self) -> bool {
        has_value(&self.preview_context_id) && has_value(&self.live_context_id)
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

fn has_value(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|v| !v.is_empty())
}

/// Path of a single environment in the v2 API
pub fn environment_path(environment_id: &str) -> String {
    format!(
        "{}/{}",
        api::ENVIRONMENTS_V2,
        urlencoding::encode(environment_id)
    )
}

impl ApiClient {
    /// Block until the environment reports both context ids.
    ///
    /// Polls once per configured interval (1 second by default).
    pub async fn wait_for_environment_ready(
        &self,
        environment_id: &str,
        timeout_minutes: u64,
    ) -> Result<Environment> {
        self.wait_for_environment_ready_within(
            environment_id,
            Duration::from_secs(timeout_minutes.saturating_mul(60)),
        )
        .await
    }

    /// Same as `wait_for_environment_ready` with an arbitrary timeout
    pub async fn wait_for_environment_ready_within(
        &self,
        environment_id: &str,
        timeout: Duration,
    ) -> Result<Environment> {
        let path = environment_path(environment_id);
        let what = format!("environment '{}' to be ready", environment_id);

        info!("Waiting for environment '{}' to be ready", environment_id);

        wait_until(&what, self.poll_interval, timeout, || async {
            let environment: Environment = self.get_json(&path).await?;
            debug!(
                "Environment '{}' provisioning status: {:?}",
                environment_id, environment.provisioning_status
            );
            Ok(environment.is_ready().then_some(environment))
        })
        .await
    }
}
