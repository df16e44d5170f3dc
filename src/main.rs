use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    jetson_mcp_server::infra::logging::init();
    jetson_mcp_server::cli::run().await
}
