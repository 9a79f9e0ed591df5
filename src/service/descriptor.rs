//! Service and method descriptors.
//!
//! A [`MethodDescriptor`] is the unit of dispatch: it knows how to create
//! blank request/response objects and how to call the handler with them.
//! Descriptors are built once, at registration, from the typed handler the
//! service provides. Nothing about the concrete types is looked up per call.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::done::Done;
use super::message::{blank, Message, RpcMessage};

/// Erased handler: (request, blank response, completion signal).
type ErasedHandler = Box<dyn Fn(&dyn RpcMessage, &mut dyn RpcMessage, Done) + Send + Sync>;

/// A service exposes a name and the methods it serves.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use serde::{Deserialize, Serialize};
/// use tinyrpc::service::{Done, MethodDescriptor, Service};
///
/// #[derive(Serialize, Deserialize, Default)]
/// struct EchoRequest { text: String }
///
/// #[derive(Serialize, Deserialize, Default)]
/// struct EchoResponse { text: String }
///
/// struct EchoService;
///
/// impl EchoService {
///     fn echo(&self, req: &EchoRequest, resp: &mut EchoResponse, done: Done) {
///         resp.text = req.text.clone();
///         done.run();
///     }
/// }
///
/// impl Service for EchoService {
///     fn name(&self) -> &str {
///         "EchoService"
///     }
///
///     fn methods(self: Arc<Self>) -> Vec<MethodDescriptor> {
///         vec![MethodDescriptor::new(
///             "Echo",
///             move |req: &EchoRequest, resp: &mut EchoResponse, done: Done| self.echo(req, resp, done),
///         )]
///     }
/// }
/// ```
pub trait Service: Send + Sync + 'static {
    /// Name callers use to address this service.
    fn name(&self) -> &str;

    /// Every method this service serves. Called once, at registration.
    fn methods(self: Arc<Self>) -> Vec<MethodDescriptor>;
}

/// A registered, invocable method.
pub struct MethodDescriptor {
    name: String,
    new_request: fn() -> Box<dyn RpcMessage>,
    new_response: fn() -> Box<dyn RpcMessage>,
    handler: ErasedHandler,
}

impl MethodDescriptor {
    /// Describe a method from a typed handler.
    ///
    /// The handler runs synchronously on the connection's worker thread and
    /// must call [`Done::run`] once the response is filled in.
    pub fn new<Req, Resp, F>(name: impl Into<String>, handler: F) -> Self
    where
        Req: Message,
        Resp: Message,
        F: Fn(&Req, &mut Resp, Done) + Send + Sync + 'static,
    {
        let name = name.into();
        let method = name.clone();

        let handler: ErasedHandler = Box::new(
            move |request: &dyn RpcMessage, response: &mut dyn RpcMessage, done: Done| {
                let request = request.as_any().downcast_ref::<Req>();
                let response = response.as_any_mut().downcast_mut::<Resp>();
                match (request, response) {
                    (Some(request), Some(response)) => handler(request, response, done),
                    // Unreachable through the registry: the factories below
                    // produce exactly these types. Dropping `done` closes the call.
                    _ => tracing::error!("Message type mismatch invoking {}", method),
                }
            },
        );

        Self {
            name,
            new_request: blank::<Req>,
            new_response: blank::<Resp>,
            handler,
        }
    }

    /// Method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// A blank request object ready to be filled from argument bytes.
    pub fn new_request(&self) -> Box<dyn RpcMessage> {
        (self.new_request)()
    }

    /// A blank response object for the handler to fill in.
    pub fn new_response(&self) -> Box<dyn RpcMessage> {
        (self.new_response)()
    }

    /// Call the handler.
    pub fn invoke(&self, request: &dyn RpcMessage, response: &mut dyn RpcMessage, done: Done) {
        (self.handler)(request, response, done)
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A registered service: its name, methods by name, and the instance.
pub struct ServiceDescriptor {
    name: String,
    methods: HashMap<String, MethodDescriptor>,
    instance: Arc<dyn Service>,
}

impl ServiceDescriptor {
    /// Build the descriptor by enumerating the service's methods.
    ///
    /// A method name listed twice keeps the last descriptor.
    pub fn from_service<S: Service>(service: Arc<S>) -> Self {
        let name = service.name().to_string();
        let instance: Arc<dyn Service> = service.clone();

        let mut methods = HashMap::new();
        for method in service.methods() {
            if let Some(previous) = methods.insert(method.name().to_string(), method) {
                tracing::warn!("Service {} lists method {} twice", name, previous.name());
            }
        }

        Self {
            name,
            methods,
            instance,
        }
    }

    /// Service name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a method by name.
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    /// Names of all methods, sorted.
    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The service object the descriptors were derived from.
    pub fn instance(&self) -> &Arc<dyn Service> {
        &self.instance
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("name", &self.name)
            .field("methods", &self.method_names())
            .finish_non_exhaustive()
    }
}
