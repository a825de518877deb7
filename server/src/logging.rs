//! JSON line logging on top of `env_logger`.
//!
//! Every record is written as
//! `{"timestamp": ..., "level": ..., "message": ..., "data": {...}}`, where
//! `data` holds the record's key/value pairs. The level filter comes from
//! `RUST_LOG` and defaults to `info`.

use env_logger::{Builder, Env};
use log::kv::{self, Key, Value, VisitSource};
use log::{error, info, Record};
use serde_json::{json, Map as JsonMap, Number, Value as JsonValue};
use std::io::Write;

/// Installs the JSON logger. Call once, before anything logs.
pub fn init() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let timestamp = buf.timestamp_millis().to_string();
            writeln!(buf, "{}", format_record(&timestamp, record))
        })
        .init();
}

/// Renders one record as a JSON object.
pub fn format_record(timestamp: &str, record: &Record<'_>) -> JsonValue {
    let mut data = JsonMap::new();
    // Visiting only fails if the visitor does; ours never does.
    let _ = record.key_values().visit(&mut DataFields(&mut data));

    json!({
        "timestamp": timestamp,
        "level": record.level().as_str(),
        "message": record.args().to_string(),
        "data": data,
    })
}

struct DataFields<'a>(&'a mut JsonMap<String, JsonValue>);

impl<'kvs> VisitSource<'kvs> for DataFields<'_> {
    fn visit_pair(&mut self, key: Key<'kvs>, value: Value<'kvs>) -> Result<(), kv::Error> {
        self.0.insert(key.as_str().to_string(), to_json(&value));
        Ok(())
    }
}

fn to_json(value: &Value<'_>) -> JsonValue {
    if let Some(flag) = value.to_bool() {
        return JsonValue::Bool(flag);
    }
    if let Some(n) = value.to_u64() {
        return JsonValue::from(n);
    }
    if let Some(n) = value.to_i64() {
        return JsonValue::from(n);
    }
    if let Some(n) = value.to_f64().and_then(Number::from_f64) {
        return JsonValue::Number(n);
    }
    JsonValue::String(value.to_string())
}

pub fn server_started(address: &str, port: u16) {
    info!(address = address, port = port; "server started");
}

pub fn server_exited(code: i32) {
    info!(code = code; "server exited");
}

pub fn server_failed(code: i32, exception: &str) {
    info!(code = code, exception = exception; "server exited");
}

pub fn request_received(ip: &str, uri: &str, method: &str) {
    info!(ip = ip, URI = uri, method = method; "request received");
}

pub fn response_sent(response_time_ms: u64, code: u16, content_type: &str) {
    info!(response_time = response_time_ms, code = code, content_type = content_type; "response sent");
}

/// Transport-level failure; `location` names the stage that failed.
pub fn transport_error(code: i32, text: &str, location: &str) {
    error!(code = code, text = text, location = location; "error");
}
