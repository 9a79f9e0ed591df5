//! `UserService` provider.
//!
//! ```text
//! cargo run --example callee [config-file]
//! ```
//!
//! Without a config file the server listens on 127.0.0.1:8000.

mod user;

use std::sync::Arc;

use tinyrpc::{Done, MethodDescriptor, RpcConfig, RpcServer, Service, ServerConfig};
use tracing_subscriber::EnvFilter;

use user::{LoginRequest, LoginResponse, ResultCode};

struct UserService;

impl UserService {
    fn check(&self, name: &str, pwd: &str) -> bool {
        !name.is_empty() && !pwd.is_empty()
    }

    fn login(&self, request: &LoginRequest, response: &mut LoginResponse, done: Done) {
        tracing::info!("Login request for {}", request.name);

        let ok = self.check(&request.name, &request.pwd);
        response.success = ok;
        response.result = if ok {
            ResultCode {
                errcode: 0,
                errmsg: "login success".to_string(),
            }
        } else {
            ResultCode {
                errcode: 1,
                errmsg: "login failed".to_string(),
            }
        };
        done.run();
    }
}

impl Service for UserService {
    fn name(&self) -> &str {
        user::SERVICE
    }

    fn methods(self: Arc<Self>) -> Vec<MethodDescriptor> {
        vec![MethodDescriptor::new(
            user::LOGIN,
            move |req: &LoginRequest, resp: &mut LoginResponse, done: Done| self.login(req, resp, done),
        )]
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => RpcConfig::from_file(path)?.server_config()?,
        None => ServerConfig::new("127.0.0.1:8000"),
    };

    let runtime = config.build_runtime()?;
    runtime.block_on(async move {
        let server = RpcServer::builder()
            .register(Arc::new(UserService))
            .bind(config)
            .await?;

        tracing::info!("UserService ready on {}", server.local_addr());

        server
            .run_until(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await
    })?;

    Ok(())
}
