//! The Jetson operations and the registry that exposes them.

pub mod hw_info;
pub mod server_info;
pub mod sw_info;

use std::sync::Arc;

use crate::clients::shell::CommandExecutor;
use crate::core::error::RegistryError;
use crate::core::registry::Registry;

use hw_info::HwInfoTool;
use server_info::{ServerIdentity, ServerInfoResource};
use sw_info::SwInfoTool;

/// Populate the registry once at startup. Registration order is the order
/// tools appear in listings and in the `jetson://info` capabilities.
pub fn build_registry(
    exec: Arc<dyn CommandExecutor>,
    identity: ServerIdentity,
) -> Result<Registry, RegistryError> {
    Ok(Registry::builder()
        .register(HwInfoTool::new(exec.clone()))?
        .register(SwInfoTool::new(exec))?
        .register(ServerInfoResource::new(identity))?
        .build())
}
