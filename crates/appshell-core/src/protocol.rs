//! IPC message types exchanged between the renderer and the main process

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Channel answered by the counter handler
pub const INCR_CHANNEL: &str = "incr";

/// Amount `incr` adds to its argument
pub const INCR_STEP: f64 = 2.0;

/// Name of the object the bridge API is exposed under in the renderer
pub const BRIDGE_GLOBAL: &str = "api";

/// Invocation sent from the renderer to the main process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpcInvoke {
    /// Channel name, e.g. `incr`
    pub channel: String,
    /// Argument, `None` when the renderer passed none (`undefined`).
    /// An explicit `null` stays `Some(Value::Null)`.
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub payload: Option<Value>,
}

fn present_value<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl IpcInvoke {
    pub fn new(channel: impl Into<String>, payload: impl Into<Option<Value>>) -> Self {
        Self {
            channel: channel.into(),
            payload: payload.into(),
        }
    }

    /// Decode an invocation from its JSON form
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Encode a number for the wire. JSON has no form for non-finite numbers,
/// so they travel as the strings `"Infinity"`, `"-Infinity"` and `"NaN"`.
pub fn number_to_value(n: f64) -> Value {
    if n.is_nan() {
        Value::String("NaN".to_string())
    } else if n == f64::INFINITY {
        Value::String("Infinity".to_string())
    } else if n == f64::NEG_INFINITY {
        Value::String("-Infinity".to_string())
    } else {
        Value::from(n)
    }
}

/// Decode a number written by [`number_to_value`]. `null` reads as NaN.
pub fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Null => Some(f64::NAN),
        Value::String(s) => match s.as_str() {
            "NaN" => Some(f64::NAN),
            "Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            _ => None,
        },
        _ => None,
    }
}

/// Reply sent from the main process back to the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum IpcReply {
    /// Handler returned a value
    Ok { value: Value },
    /// Handler failed or the channel is unknown
    Error { message: String },
}

impl IpcReply {
    /// Build a reply from a handler result
    pub fn from_result<E: std::fmt::Display>(result: std::result::Result<Value, E>) -> Self {
        match result {
            Ok(value) => IpcReply::Ok { value },
            Err(e) => IpcReply::Error {
                message: e.to_string(),
            },
        }
    }

    /// Turn the reply back into a result on the renderer side
    pub fn into_result(self) -> Result<Value> {
        match self {
            IpcReply::Ok { value } => Ok(value),
            IpcReply::Error { message } => Err(Error::Ipc(message)),
        }
    }
}
