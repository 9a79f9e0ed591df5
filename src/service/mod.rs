//! Service registration and dispatch.
//!
//! Services describe their methods once, at registration, as a table of
//! [`MethodDescriptor`]s. The server dispatches incoming calls by
//! `(service, method)` name through the [`ServiceRegistry`] and never needs
//! to know the concrete request/response types.

mod descriptor;
mod done;
mod message;
mod registry;

pub use descriptor::{MethodDescriptor, Service, ServiceDescriptor};
pub use done::{Abandoned, Completion, Done};
pub use message::{Message, RpcMessage};
pub use registry::ServiceRegistry;
