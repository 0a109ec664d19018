//! WASM bindings for tagshift.
//!
//! Exposes `transform()` and `applyRule()` to JavaScript via wasm-bindgen.
//! Both return a plain object, `{ success: true, result }` or
//! `{ success: false, error }`, and never throw. `parseShorthand()` and
//! `parseMarkup()` return the parsed forest as plain JS objects.

use serde::Serialize;
use tagshift_codegen::{Direction, Settings};
use tagshift_parser::{MarkupParser, ShorthandParser};
use wasm_bindgen::prelude::*;

/// Result of a call-level operation, before it becomes a JS object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(String),
    Failure(String),
}

impl<E: std::fmt::Display> From<Result<String, E>> for Outcome {
    fn from(result: Result<String, E>) -> Self {
        match result {
            Ok(text) => Outcome::Success(text),
            Err(e) => Outcome::Failure(e.to_string()),
        }
    }
}

/// Convert `input` in `direction` (`"expand"` or `"collapse"`).
pub fn run_transform(input: &str, direction: &str, settings: &Settings) -> Outcome {
    direction
        .parse::<Direction>()
        .and_then(|direction| tagshift_codegen::transform(input, direction, settings))
        .into()
}

pub fn run_apply_rule(markup: &str, pattern: &str, replacement: &str) -> Outcome {
    tagshift_rules::apply_rule(markup, pattern, replacement).into()
}

/// Convert between notations.
///
/// `settings` may be `undefined` or a partial object; missing fields take
/// their defaults (`indent: "  "`, all switches `true`).
#[wasm_bindgen]
pub fn transform(input: &str, direction: &str, settings: JsValue) -> Result<JsValue, JsError> {
    let outcome = match read_settings(settings) {
        Ok(settings) => run_transform(input, direction, &settings),
        Err(message) => Outcome::Failure(message),
    };
    outcome_object(outcome)
}

/// Apply one search/replace rule to markup; the result is rendered as shorthand.
#[wasm_bindgen(js_name = applyRule)]
pub fn apply_rule(markup: &str, pattern: &str, replacement: &str) -> Result<JsValue, JsError> {
    outcome_object(run_apply_rule(markup, pattern, replacement))
}

/// Parse shorthand into an array of node objects. Throws on a limit error.
#[wasm_bindgen(js_name = parseShorthand)]
pub fn parse_shorthand(text: &str) -> Result<JsValue, JsError> {
    let forest = ShorthandParser::parse(text).map_err(|e| JsError::new(&e.to_string()))?;
    to_js(&forest)
}

/// Parse verbose markup into an array of node objects. Throws on a limit error.
#[wasm_bindgen(js_name = parseMarkup)]
pub fn parse_markup(text: &str) -> Result<JsValue, JsError> {
    let forest = MarkupParser::parse(text).map_err(|e| JsError::new(&e.to_string()))?;
    to_js(&forest)
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn read_settings(value: JsValue) -> Result<Settings, String> {
    if value.is_undefined() || value.is_null() {
        return Ok(Settings::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| format!("Invalid settings: {e}"))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsError::new(&e.to_string()))
}

// Serialize to a plain JS object { success, result } / { success, error }
fn outcome_object(outcome: Outcome) -> Result<JsValue, JsError> {
    let (success, key, value) = match outcome {
        Outcome::Success(result) => (true, "result", result),
        Outcome::Failure(error) => (false, "error", error),
    };

    let js_obj = js_sys::Object::new();
    js_sys::Reflect::set(&js_obj, &"success".into(), &success.into())
        .map_err(|_| JsError::new("Failed to set success property"))?;
    js_sys::Reflect::set(&js_obj, &key.into(), &value.into())
        .map_err(|_| JsError::new(&format!("Failed to set {key} property")))?;

    Ok(js_obj.into())
}
