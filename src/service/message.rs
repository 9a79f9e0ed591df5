//! Type-erased request/response messages.
//!
//! The registry works with `Box<dyn RpcMessage>` so that the server can
//! create, fill, and serialize request and response objects without knowing
//! their concrete types. Any `serde` type that is `Default` qualifies.

use std::any::Any;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::MsgPackCodec;
use crate::error::Result;

/// Bound for request and response types of a registered method.
///
/// `Default` provides the blank object the server fills in.
pub trait Message: Serialize + DeserializeOwned + Default + Send + 'static {}

impl<T> Message for T where T: Serialize + DeserializeOwned + Default + Send + 'static {}

/// Object-safe view of a [`Message`].
pub trait RpcMessage: Any + Send {
    /// Replace the contents of `self` with the value decoded from `bytes`.
    fn merge_from_bytes(&mut self, bytes: &[u8]) -> Result<()>;

    /// Serialize `self` with the structured codec.
    fn to_bytes(&self) -> Result<Vec<u8>>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T> RpcMessage for T
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    fn merge_from_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        *self = MsgPackCodec::decode(bytes)?;
        Ok(())
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        MsgPackCodec::encode(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Factory producing a blank `T` behind the erased interface.
pub(crate) fn blank<T: Message>() -> Box<dyn RpcMessage> {
    Box::new(T::default())
}
