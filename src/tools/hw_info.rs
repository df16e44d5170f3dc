use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as J;

use crate::clients::shell::CommandExecutor;
use crate::core::error::CommandError;
use crate::core::operation::{Operation, OperationKind, OperationRequest, OperationSpec};
use crate::domain::CommandSpec;

pub const BOOT_CONTROL_CMD: &str = "cat /etc/nv_boot_control.conf";

/// Module/carrier board identity from the bootloader control file.
#[derive(Clone)]
pub struct HwInfoTool {
    exec: Arc<dyn CommandExecutor>,
}

impl HwInfoTool {
    pub fn new(exec: Arc<dyn CommandExecutor>) -> Self {
        Self { exec }
    }

    /// Always returns text; failures are rendered into the message.
    pub async fn get_hw_info(&self) -> String {
        let result = self.exec.execute(CommandSpec::new(BOOT_CONTROL_CMD)).await;
        match result.into_output() {
            Ok(out) => out,
            Err(CommandError::NotFound { .. }) => {
                "Error: /etc/nv_boot_control.conf not found.".to_owned()
            }
            Err(e @ CommandError::Failed { .. }) => format!("Error executing command: {e}"),
            Err(e @ CommandError::Unexpected { .. }) => {
                format!("An unexpected error occurred: {e}")
            }
        }
    }
}

impl OperationSpec for HwInfoTool {
    fn name(&self) -> &'static str {
        "get_jetson_hw_info"
    }
    fn kind(&self) -> OperationKind {
        OperationKind::Tool
    }
    fn description(&self) -> &'static str {
        "This tool provides information about the Jetson board hardware capabilities (module/carrier board info)."
    }
}

#[async_trait]
impl Operation for HwInfoTool {
    async fn call(&self, _req: OperationRequest<'_>) -> Result<J, String> {
        Ok(J::String(self.get_hw_info().await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CommandResult;
    use crate::tools::testing::ScriptedExecutor;

    fn tool(result: CommandResult) -> HwInfoTool {
        HwInfoTool::new(Arc::new(ScriptedExecutor::new([(BOOT_CONTROL_CMD, result)])))
    }

    #[tokio::test]
    async fn success_is_trimmed() {
        let t = tool(CommandResult::success(BOOT_CONTROL_CMD, "BOARDID=3767\n"));
        assert_eq!(t.get_hw_info().await, "BOARDID=3767");
    }

    #[tokio::test]
    async fn missing_file_has_not_found_message() {
        let t = tool(CommandResult::not_found(BOOT_CONTROL_CMD, "", 1));
        assert_eq!(t.get_hw_info().await, "Error: /etc/nv_boot_control.conf not found.");
    }

    #[tokio::test]
    async fn non_zero_exit_uses_stderr() {
        let t = tool(CommandResult::failed(BOOT_CONTROL_CMD, "cat: Permission denied\n", 1));
        assert_eq!(t.get_hw_info().await, "Error executing command: cat: Permission denied");
    }

    #[tokio::test]
    async fn non_zero_exit_without_stderr_uses_raw_error() {
        let t = tool(CommandResult::failed(BOOT_CONTROL_CMD, "", 2));
        assert_eq!(
            t.get_hw_info().await,
            "Error executing command: Command 'cat /etc/nv_boot_control.conf' returned non-zero exit status 2."
        );
    }

    #[tokio::test]
    async fn unexpected_failure_is_described() {
        let t = tool(CommandResult::unexpected(BOOT_CONTROL_CMD, "out of memory"));
        assert_eq!(t.get_hw_info().await, "An unexpected error occurred: out of memory");
    }

    #[tokio::test]
    async fn call_wraps_string_payload() {
        let t = tool(CommandResult::success(BOOT_CONTROL_CMD, "x\n"));
        let reg = crate::core::registry::Registry::builder().build();
        let out = t
            .call(OperationRequest { arguments: &J::Null, registry: &reg })
            .await
            .unwrap();
        assert_eq!(out, J::String("x".into()));
    }
}
