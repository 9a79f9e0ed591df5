//! Calls `UserService.Login` through the generated-style stub.
//!
//! ```text
//! cargo run --example caller [config-file]
//! ```

mod user;

use tinyrpc::{ChannelConfig, RpcChannel, RpcConfig, RpcController};
use tracing_subscriber::EnvFilter;

use user::{LoginRequest, LoginResponse, UserServiceStub};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => RpcConfig::from_file(path)?.channel_config()?,
        None => ChannelConfig::new("127.0.0.1:8000"),
    };

    let stub = UserServiceStub::new(RpcChannel::new(config));

    let request = LoginRequest {
        name: "xy".to_string(),
        pwd: "123".to_string(),
    };
    let mut response = LoginResponse::default();
    let mut controller = RpcController::new();

    tracing::info!("Sending login request");
    stub.login(&mut controller, &request, &mut response).await;

    if controller.failed() {
        tracing::error!("Call failed: {}", controller.error_text());
    } else if response.success {
        tracing::info!("Login success: {}", response.result.errmsg);
    } else {
        tracing::warn!(
            "Login failed: errcode = {}, errmsg = {}",
            response.result.errcode,
            response.result.errmsg
        );
    }

    Ok(())
}
