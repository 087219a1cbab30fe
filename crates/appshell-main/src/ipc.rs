//! IPC channel handlers
//!
//! The renderer reaches the main process through named channels. Each
//! channel maps to one [`IpcHandler`]; `incr` is the only one the app
//! registers.

use crate::error::{ShellError, ShellResult};
use appshell_core::protocol::{number_to_value, INCR_CHANNEL, INCR_STEP};
use appshell_store::CounterStore;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Handles invocations on one channel. `None` means no argument was passed.
pub trait IpcHandler: Send + Sync {
    fn handle(&self, payload: Option<Value>) -> ShellResult<Value>;
}

/// Channel name to handler table
#[derive(Default)]
pub struct IpcRouter {
    handlers: HashMap<String, Arc<dyn IpcHandler>>,
}

impl IpcRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous one for the channel
    pub fn handle(&mut self, channel: impl Into<String>, handler: Arc<dyn IpcHandler>) {
        self.handlers.insert(channel.into(), handler);
    }

    pub fn channels(&self) -> Vec<&str> {
        let mut channels: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        channels.sort_unstable();
        channels
    }

    pub fn invoke(
        &self,
        channel: &str,
        payload: impl Into<Option<Value>>,
    ) -> ShellResult<Value> {
        let handler = self
            .handlers
            .get(channel)
            .ok_or_else(|| ShellError::UnknownChannel(channel.to_string()))?;
        handler.handle(payload.into())
    }
}

/// `incr`: coerce the argument to a number, add two, store and return it
pub struct IncrHandler {
    store: Arc<CounterStore>,
}

impl IncrHandler {
    pub fn new(store: Arc<CounterStore>) -> Self {
        Self { store }
    }

    pub fn channel() -> &'static str {
        INCR_CHANNEL
    }
}

impl IpcHandler for IncrHandler {
    fn handle(&self, payload: Option<Value>) -> ShellResult<Value> {
        // A missing argument is `undefined`, which coerces to NaN
        let arg = payload.as_ref().map_or(f64::NAN, to_number);
        let value = arg + INCR_STEP;
        let changes = self.store.set(value)?;
        debug!("incr({}) -> {} ({} row(s) changed)", arg, value, changes);

        Ok(number_to_value(value))
    }
}

/// Coerce a JSON value to a number using JavaScript `Number()` rules
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_number(s),
        Value::Array(_) => parse_number(&to_js_string(value)),
        Value::Object(_) => f64::NAN,
    }
}

/// String form a value takes when an array is joined
fn to_js_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(to_js_string).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn parse_number(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let prefixed = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)];
    for (prefix, radix) in prefixed {
        if let Some(digits) = s.strip_prefix(prefix) {
            return parse_radix(digits, radix);
        }
    }

    // Rust's float parser also takes "inf" and "nan", which JavaScript does not
    let is_decimal = s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !is_decimal || !s.chars().any(|c| c.is_ascii_digit()) {
        return f64::NAN;
    }

    s.parse::<f64>().unwrap_or(f64::NAN)
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix).map(|d| acc * radix as f64 + d as f64)
        })
        .unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_number_primitives() {
        assert_eq!(to_number(&json!(5)), 5.0);
        assert_eq!(to_number(&json!(-1.5)), -1.5);
        assert_eq!(to_number(&json!(true)), 1.0);
        assert_eq!(to_number(&json!(false)), 0.0);
        assert_eq!(to_number(&Value::Null), 0.0);
    }

    #[test]
    fn test_to_number_strings() {
        assert_eq!(to_number(&json!("")), 0.0);
        assert_eq!(to_number(&json!("  12 \n")), 12.0);
        assert_eq!(to_number(&json!("1e3")), 1000.0);
        assert_eq!(to_number(&json!(".5")), 0.5);
        assert_eq!(to_number(&json!("0x1F")), 31.0);
        assert_eq!(to_number(&json!("0b101")), 5.0);
        assert_eq!(to_number(&json!("0o17")), 15.0);
        assert_eq!(to_number(&json!("-Infinity")), f64::NEG_INFINITY);

        for raw in ["abc", "inf", "NaN", "infinity", "1_000", "0x", "-0x10", "1e", "12px"] {
            assert!(to_number(&json!(raw)).is_nan(), "{} should be NaN", raw);
        }
    }

    #[test]
    fn test_to_number_compound() {
        assert_eq!(to_number(&json!([])), 0.0);
        assert_eq!(to_number(&json!([7])), 7.0);
        assert_eq!(to_number(&json!([["8"]])), 8.0);
        assert_eq!(to_number(&json!([null])), 0.0);
        assert!(to_number(&json!([1, 2])).is_nan());
        assert!(to_number(&json!([true])).is_nan());
        assert!(to_number(&json!({})).is_nan());
    }

    #[test]
    fn test_incr_updates_store() {
        let store = Arc::new(CounterStore::open_in_memory().unwrap());
        let handler = IncrHandler::new(store.clone());

        assert_eq!(store.get().unwrap(), 0.0);
        assert_eq!(handler.handle(Some(json!(5))).unwrap(), json!(7.0));
        assert_eq!(store.get().unwrap(), 7.0);

        assert_eq!(handler.handle(Some(json!("40"))).unwrap(), json!(42.0));
        assert_eq!(store.get().unwrap(), 42.0);
    }

    #[test]
    fn test_incr_non_numeric() {
        let store = Arc::new(CounterStore::open_in_memory().unwrap());
        let handler = IncrHandler::new(store.clone());

        assert_eq!(handler.handle(Some(json!("abc"))).unwrap(), json!("NaN"));
        assert!(store.get().unwrap().is_nan());
    }

    #[test]
    fn test_incr_missing_argument() {
        let store = Arc::new(CounterStore::open_in_memory().unwrap());
        let handler = IncrHandler::new(store.clone());

        assert_eq!(handler.handle(None).unwrap(), json!("NaN"));
        assert!(store.get().unwrap().is_nan());

        // Explicit null coerces to 0
        assert_eq!(handler.handle(Some(Value::Null)).unwrap(), json!(2.0));
        assert_eq!(store.get().unwrap(), 2.0);
    }

    #[test]
    fn test_incr_infinite() {
        let store = Arc::new(CounterStore::open_in_memory().unwrap());
        let handler = IncrHandler::new(store.clone());

        assert_eq!(handler.handle(Some(json!("Infinity"))).unwrap(), json!("Infinity"));
        assert_eq!(store.get().unwrap(), f64::INFINITY);

        assert_eq!(handler.handle(Some(json!(" -Infinity "))).unwrap(), json!("-Infinity"));
        assert_eq!(store.get().unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_router_dispatch() {
        let store = Arc::new(CounterStore::open_in_memory().unwrap());
        let mut router = IpcRouter::new();
        router.handle(IncrHandler::channel(), Arc::new(IncrHandler::new(store)));

        assert_eq!(router.channels(), vec!["incr"]);
        assert_eq!(router.invoke("incr", json!(1)).unwrap(), json!(3.0));
        assert!(matches!(
            router.invoke("decr", json!(1)),
            Err(ShellError::UnknownChannel(c)) if c == "decr"
        ));
    }
}
