//! Encoded actions and the generic call capability
//!
//! An [`Action`] is plain data: a target address, an attached native value and
//! an opaque payload. Payloads are `bincode` encodings of whatever call enum the
//! target understands; the core never interprets them.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::CallError;
use crate::{Amount, Timestamp};

/// Identifier of the external transaction a call belongs to
pub type TxId = u64;

/// One target call: `{target, value, payload}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub target: Address,
    #[serde(with = "crate::serde_amount")]
    pub value: Amount,
    #[serde(with = "hex_bytes")]
    pub payload: Vec<u8>,
}

impl Action {
    /// Plain value transfer with no payload
    pub fn transfer(target: Address, value: Amount) -> Self {
        Self {
            target,
            value,
            payload: Vec::new(),
        }
    }

    /// Encode `call` as the payload for `target`
    pub fn call<T: Serialize>(target: Address, value: Amount, call: &T) -> Result<Self, CallError> {
        let payload = bincode::serialize(call).map_err(|e| CallError::Decode(e.to_string()))?;
        Ok(Self {
            target,
            value,
            payload,
        })
    }

    /// Decode the payload as the target's call type
    pub fn decode_payload<T: DeserializeOwned>(&self) -> Result<T, CallError> {
        bincode::deserialize(&self.payload).map_err(|e| CallError::Decode(e.to_string()))
    }

    /// Full record encoding, stable across replays
    pub fn to_bytes(&self) -> Result<Vec<u8>, CallError> {
        bincode::serialize(self).map_err(|e| CallError::Decode(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CallError> {
        bincode::deserialize(bytes).map_err(|e| CallError::Decode(e.to_string()))
    }
}

/// Who is calling, inside which transaction, at what time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Address,
    pub tx: TxId,
    pub now: Timestamp,
}

impl CallContext {
    pub fn new(caller: Address, tx: TxId, now: Timestamp) -> Self {
        Self { caller, tx, now }
    }

    /// Same transaction and time, different immediate caller
    pub fn with_caller(&self, caller: Address) -> Self {
        Self { caller, ..*self }
    }
}

/// The host's single "perform call" capability.
///
/// The host moves `action.value` from `ctx.caller` to the target and then
/// interprets the payload for that target.
pub trait CallHost {
    fn perform_call(&mut self, ctx: CallContext, action: &Action) -> Result<(), CallError>;
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
        } else {
            serializer.serialize_bytes(bytes)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        if deserializer.is_human_readable() {
            let text = String::deserialize(deserializer)?;
            let trimmed = text.strip_prefix("0x").unwrap_or(&text);
            hex::decode(trimmed).map_err(serde::de::Error::custom)
        } else {
            Vec::<u8>::deserialize(deserializer)
        }
    }
}
