//! MsgPack codec using `rmp-serde`.
//!
//! Records are written with `to_vec_named`, so structs travel as maps keyed by
//! field name. A peer can add fields to a record without breaking older
//! readers, and `#[serde(default)]` fields may be omitted entirely.
//!
//! # Example
//!
//! ```
//! use tinyrpc::codec::MsgPackCodec;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct LoginRequest {
//!     name: String,
//!     pwd: String,
//! }
//!
//! let req = LoginRequest { name: "xy".to_string(), pwd: "123".to_string() };
//! let encoded = MsgPackCodec::encode(&req).unwrap();
//! let decoded: LoginRequest = MsgPackCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, req);
//! ```

use crate::error::Result;

/// MessagePack codec for structured records.
pub struct MsgPackCodec;

impl MsgPackCodec {
    /// Encode a value to MsgPack bytes (struct-as-map).
    ///
    /// # Errors
    ///
    /// Returns error if the value cannot be serialized.
    #[inline]
    pub fn encode<T: serde::Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(value)?)
    }

    /// Decode MsgPack bytes to a value.
    ///
    /// # Errors
    ///
    /// Returns error if the bytes cannot be deserialized to type T.
    #[inline]
    pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RpcError;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, PartialEq, Debug, Default)]
    struct ResultCode {
        errcode: i32,
        errmsg: String,
    }

    #[derive(Serialize, Deserialize, PartialEq, Debug, Default)]
    struct LoginResponse {
        result: ResultCode,
        success: bool,
    }

    #[test]
    fn test_nested_record() {
        let original = LoginResponse {
            result: ResultCode {
                errcode: 1,
                errmsg: "login failed".to_string(),
            },
            success: false,
        };

        let encoded = MsgPackCodec::encode(&original).unwrap();
        let decoded: LoginResponse = MsgPackCodec::decode(&encoded).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn test_struct_encoded_as_map() {
        let encoded = MsgPackCodec::encode(&ResultCode::default()).unwrap();

        // 0x82 = fixmap with 2 entries; positional encoding would be 0x92
        assert_eq!(encoded[0], 0x82, "Expected fixmap, got {:02X}", encoded[0]);
    }

    #[test]
    fn test_missing_field_uses_default() {
        #[derive(Serialize)]
        struct OldResponse {
            success: bool,
        }

        #[derive(Deserialize, Debug)]
        struct NewResponse {
            success: bool,
            #[serde(default)]
            note: String,
        }

        let encoded = MsgPackCodec::encode(&OldResponse { success: true }).unwrap();
        let decoded: NewResponse = MsgPackCodec::decode(&encoded).unwrap();

        assert!(decoded.success);
        assert!(decoded.note.is_empty());
    }

    #[test]
    fn test_decode_error_on_invalid_data() {
        let result: Result<LoginResponse> = MsgPackCodec::decode(b"\xc1 not msgpack");
        assert!(matches!(result, Err(RpcError::MsgPackDecode(_))));
    }

    #[test]
    fn test_decode_error_on_wrong_shape() {
        let encoded = MsgPackCodec::encode(&vec![1u8, 2, 3]).unwrap();
        let result: Result<ResultCode> = MsgPackCodec::decode(&encoded);
        assert!(result.is_err());
    }
}
