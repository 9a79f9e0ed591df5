//! Messages and client stub for the `UserService` demo.

use serde::{Deserialize, Serialize};
use tinyrpc::{RpcChannel, RpcController};

pub const SERVICE: &str = "UserService";
pub const LOGIN: &str = "Login";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    pub name: String,
    pub pwd: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultCode {
    pub errcode: i32,
    pub errmsg: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    pub result: ResultCode,
    pub success: bool,
}

/// Typed front for calling `UserService` through a channel.
#[allow(dead_code)]
pub struct UserServiceStub {
    channel: RpcChannel,
}

#[allow(dead_code)]
impl UserServiceStub {
    pub fn new(channel: RpcChannel) -> Self {
        Self { channel }
    }

    pub async fn login(
        &self,
        controller: &mut RpcController,
        request: &LoginRequest,
        response: &mut LoginResponse,
    ) {
        self.channel
            .call_method(SERVICE, LOGIN, request, response, controller)
            .await;
    }
}
