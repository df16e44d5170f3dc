use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as J;

use crate::clients::shell::CommandExecutor;
use crate::core::error::CommandError;
use crate::core::operation::{Operation, OperationKind, OperationRequest, OperationSpec};
use crate::domain::{CommandSpec, SwInfo};

pub const JETPACK_RELEASE_CMD: &str = "cat /etc/nv_tegra_release";
pub const LINUX_VERSION_CMD: &str = "cat /proc/version";

/// JetPack release and kernel version, collected best-effort.
#[derive(Clone)]
pub struct SwInfoTool {
    exec: Arc<dyn CommandExecutor>,
}

impl SwInfoTool {
    pub fn new(exec: Arc<dyn CommandExecutor>) -> Self {
        Self { exec }
    }

    /// Runs both reads in order; one failing never blocks the other.
    pub async fn get_sw_info(&self) -> SwInfo {
        tracing::info!("Executing get_jetson_sw_info tool...");
        let mut info = SwInfo::default();
        info.jetpack_release = self.read(JETPACK_RELEASE_CMD, &mut info.errors).await;
        info.linux_version = self.read(LINUX_VERSION_CMD, &mut info.errors).await;
        info
    }

    async fn read(&self, command: &str, errors: &mut Vec<String>) -> String {
        let result = self.exec.execute(CommandSpec::new(command)).await;
        let (value, message) = match result.into_output() {
            Ok(out) => return out,
            Err(CommandError::NotFound { .. }) => (
                "Error: File not found".to_owned(),
                format!("File not found for command: {command}"),
            ),
            Err(e @ CommandError::Failed { .. }) => (
                format!("Error: {e}"),
                format!("Error executing command '{command}': {e}"),
            ),
            Err(e @ CommandError::Unexpected { .. }) => (
                "Error: Unexpected error".to_owned(),
                format!("An unexpected error occurred while running command '{command}': {e}"),
            ),
        };
        tracing::error!(%command, "{message}");
        errors.push(message);
        value
    }
}

impl OperationSpec for SwInfoTool {
    fn name(&self) -> &'static str {
        "get_jetson_sw_info"
    }
    fn kind(&self) -> OperationKind {
        OperationKind::Tool
    }
    fn description(&self) -> &'static str {
        "This tool provides information about the Jetson board software capabilities (Linux kernel version and Jetpack version)."
    }
}

#[async_trait]
impl Operation for SwInfoTool {
    async fn call(&self, _req: OperationRequest<'_>) -> Result<J, String> {
        serde_json::to_value(self.get_sw_info().await).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CommandResult;
    use crate::tools::testing::ScriptedExecutor;
    use serde_json::json;

    fn tool(jetpack: CommandResult, linux: CommandResult) -> SwInfoTool {
        SwInfoTool::new(Arc::new(ScriptedExecutor::new([
            (JETPACK_RELEASE_CMD, jetpack),
            (LINUX_VERSION_CMD, linux),
        ])))
    }

    async fn payload(t: &SwInfoTool) -> J {
        let reg = crate::core::registry::Registry::builder().build();
        t.call(OperationRequest { arguments: &J::Null, registry: &reg })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn both_succeed_without_errors_key() {
        let t = tool(
            CommandResult::success(JETPACK_RELEASE_CMD, "# R35 (release), REVISION: 4.1\n"),
            CommandResult::success(LINUX_VERSION_CMD, "Linux version 5.10.0\n"),
        );
        let v = payload(&t).await;
        assert_eq!(v.as_object().unwrap().len(), 2);
        assert!(v.get("errors").is_none());
        assert_eq!(v["jetpack_release"], "# R35 (release), REVISION: 4.1");
        assert_eq!(v["linux_version"], "Linux version 5.10.0");
    }

    #[tokio::test]
    async fn missing_jetpack_release_is_partial() {
        let t = tool(
            CommandResult::not_found(JETPACK_RELEASE_CMD, "No such file or directory", 1),
            CommandResult::success(LINUX_VERSION_CMD, "Linux version 5.10.0\n"),
        );
        assert_eq!(
            payload(&t).await,
            json!({
                "jetpack_release": "Error: File not found",
                "linux_version": "Linux version 5.10.0",
                "errors": ["File not found for command: cat /etc/nv_tegra_release"]
            })
        );
    }

    #[tokio::test]
    async fn non_zero_exit_records_stderr() {
        let t = tool(
            CommandResult::success(JETPACK_RELEASE_CMD, "R35\n"),
            CommandResult::failed(LINUX_VERSION_CMD, "cat: read error\n", 1),
        );
        let info = t.get_sw_info().await;
        assert_eq!(info.jetpack_release, "R35");
        assert_eq!(info.linux_version, "Error: cat: read error");
        assert_eq!(
            info.errors,
            vec!["Error executing command 'cat /proc/version': cat: read error".to_owned()]
        );
    }

    #[tokio::test]
    async fn both_fail_collects_two_errors_in_order() {
        let t = tool(
            CommandResult::unexpected(JETPACK_RELEASE_CMD, "permission denied"),
            CommandResult::not_found(LINUX_VERSION_CMD, "", 127),
        );
        let info = t.get_sw_info().await;
        assert_eq!(info.jetpack_release, "Error: Unexpected error");
        assert_eq!(info.linux_version, "Error: File not found");
        assert_eq!(info.errors.len(), 2);
        assert!(info.errors[0].starts_with(
            "An unexpected error occurred while running command 'cat /etc/nv_tegra_release'"
        ));
        assert_eq!(info.errors[1], "File not found for command: cat /proc/version");
    }
}
