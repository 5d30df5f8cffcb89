//! Parsing of the free-form JSON inputs.
//!
//! Malformed input never fails a run: each parser warns through the
//! reporter and falls back to an empty value.

use crate::report::Reporter;
use fastedge_api::{AppSecret, SecretSlot};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Parse a JSON object of string values, e.g. the `env` input.
///
/// Non-string values are kept as empty strings.
pub fn parse_dictionary(name: &str, raw: &str, reporter: &dyn Reporter) -> BTreeMap<String, String> {
    let Some(object) = parse_object(name, raw, reporter) else {
        return BTreeMap::new();
    };

    object
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(value) => (key, value),
            _ => {
                reporter.warning(&format!(
                    "Value for key \"{}\" in input \"{}\" is not a string.",
                    key, name
                ));
                (key, String::new())
            }
        })
        .collect()
}

/// Parse the `secrets` input: secret names mapped to `{"id": <number>}`.
///
/// Anything besides the id is dropped.
pub fn parse_secret_refs(raw: &str, reporter: &dyn Reporter) -> BTreeMap<String, AppSecret> {
    let Some(object) = parse_object("secrets", raw, reporter) else {
        return BTreeMap::new();
    };

    let mut secrets = BTreeMap::new();
    for (key, value) in object {
        match value.get("id").and_then(Value::as_u64) {
            Some(id) => {
                secrets.insert(key, AppSecret::from_id(id));
            }
            None => {
                reporter.warning(
                    "Failed to validate secrets input. Each secret must be an object with 'id' property set as a number.",
                );
                return BTreeMap::new();
            }
        }
    }
    secrets
}

/// Parse the `secret_slots` input: a JSON array of `{"slot": n, "value": "..."}`.
///
/// One invalid entry rejects the whole list.
pub fn parse_secret_slots(raw: &str, reporter: &dyn Reporter) -> Vec<SecretSlot> {
    let raw = or_default(raw, "[]");
    let items = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items,
        Ok(_) => {
            reporter.warning("Failed to parse secret_slots as valid JSON array.");
            return Vec::new();
        }
        Err(e) => {
            log::debug!("secret_slots: {}", e);
            reporter.warning("Failed to parse secret_slots as JSON");
            return Vec::new();
        }
    };

    let slots: Option<Vec<SecretSlot>> = items.iter().map(parse_slot).collect();
    slots.unwrap_or_else(|| {
        reporter.warning(
            "Failed to validate secret_slots. Each slot must be an object with 'slot' and 'value' properties.",
        );
        Vec::new()
    })
}

/// The slots a secret deployment should send.
///
/// Falls back to putting `secret` into slot 0 when `secret_slots` yields
/// nothing.
pub fn desired_secret_slots(
    secret_slots: &str,
    secret: &str,
    reporter: &dyn Reporter,
) -> Vec<SecretSlot> {
    let mut slots = parse_secret_slots(secret_slots, reporter);
    if slots.is_empty() && !secret.trim().is_empty() {
        slots.push(SecretSlot::upsert(0, secret));
    }
    if slots.is_empty() {
        reporter.warning("No secret_slots provided.");
    }
    slots
}

fn parse_slot(item: &Value) -> Option<SecretSlot> {
    let slot = item.get("slot")?.as_u64()?;
    let value = item.get("value")?.as_str()?;
    if value.trim().is_empty() {
        return None;
    }
    Some(SecretSlot::upsert(u32::try_from(slot).ok()?, value))
}

fn parse_object(name: &str, raw: &str, reporter: &dyn Reporter) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(or_default(raw, "{}")) {
        Ok(Value::Object(object)) => Some(object),
        Ok(_) => {
            reporter.warning(&format!(
                "Input \"{}\" is not a valid JSON dictionary object.",
                name
            ));
            None
        }
        Err(e) => {
            log::debug!("{}: {}", name, e);
            reporter.warning(&format!(
                "Failed to parse input as JSON: {}. Using empty object instead.",
                name
            ));
            None
        }
    }
}

fn or_default<'a>(raw: &'a str, default: &'a str) -> &'a str {
    match raw.trim() {
        "" => default,
        trimmed => trimmed,
    }
}
