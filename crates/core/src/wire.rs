// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON wire codec
//!
//! Each message is one JSON object whose discriminator key names the
//! message kind. For statements its value is the verb:
//!
//! ```json
//! {"specification": "measure", "version": 1,
//!  "registry": "http://ict-mplane.eu/registry/core",
//!  "token": "...", "when": "now + 1m / 1s",
//!  "parameters": {"destination.ip4": "10.0.37.2"},
//!  "metadata": {}, "results": ["delay.twoway.icmp.us.min"]}
//! ```

use crate::error::{Error, ParseError};
use crate::message::{
    Envelope, EnvelopeKind, Exception, Interrupt, Message, Receipt, Redemption, Withdrawal,
};
use crate::primitive::Primitive;
use crate::registry::{Registries, CORE_REGISTRY_URI};
use crate::statement::{Capability, ResultColumn, ResultStatement, Specification, Statement};
use crate::when::When;
use serde_json::{json, Map, Value as Json};

/// Highest protocol version this codec understands
pub const PROTOCOL_VERSION: u64 = 1;

const KINDS: [&str; 9] = [
    "capability",
    "specification",
    "result",
    "receipt",
    "redemption",
    "withdrawal",
    "interrupt",
    "exception",
    "envelope",
];

const KEY_VERSION: &str = "version";
const KEY_REGISTRY: &str = "registry";
const KEY_LABEL: &str = "label";
const KEY_LINK: &str = "link";
const KEY_EXPORT: &str = "export";
const KEY_TOKEN: &str = "token";
const KEY_WHEN: &str = "when";
const KEY_PARAMETERS: &str = "parameters";
const KEY_METADATA: &str = "metadata";
const KEY_RESULTS: &str = "results";
const KEY_RESULT_VALUES: &str = "resultvalues";
const KEY_MESSAGE: &str = "message";
const KEY_CONTENTS: &str = "contents";

/// Whether parameters travel as constraints or as values
#[derive(Clone, Copy, PartialEq, Eq)]
enum ParameterForm {
    Constraint,
    Value,
}

// --- encoding ---

pub fn to_json(message: &Message) -> Json {
    match message {
        Message::Capability(c) => {
            encode_statement("capability", c.statement(), ParameterForm::Constraint, false)
        }
        Message::Specification(s) => {
            encode_statement("specification", s.statement(), ParameterForm::Value, false)
        }
        Message::Result(r) => encode_statement("result", r.statement(), ParameterForm::Value, true),
        Message::Receipt(r) => encode_statement("receipt", r.statement(), ParameterForm::Value, false),
        Message::Withdrawal(w) => {
            encode_statement("withdrawal", w.statement(), ParameterForm::Constraint, false)
        }
        Message::Redemption(r) => json!({
            "redemption": r.verb(),
            KEY_VERSION: PROTOCOL_VERSION,
            KEY_TOKEN: r.token(),
        }),
        Message::Interrupt(i) => json!({
            "interrupt": i.verb(),
            KEY_VERSION: PROTOCOL_VERSION,
            KEY_TOKEN: i.token(),
        }),
        Message::Exception(e) => json!({
            "exception": e.token(),
            KEY_VERSION: PROTOCOL_VERSION,
            KEY_MESSAGE: e.message(),
        }),
        Message::Envelope(e) => json!({
            "envelope": e.kind().name(),
            KEY_VERSION: PROTOCOL_VERSION,
            KEY_CONTENTS: e.contents().iter().map(to_json).collect::<Vec<_>>(),
        }),
    }
}

pub fn to_string(message: &Message) -> Result<String, ParseError> {
    Ok(serde_json::to_string(&to_json(message))?)
}

fn encode_statement(kind: &str, statement: &Statement, form: ParameterForm, rows: bool) -> Json {
    let mut object = Map::new();
    object.insert(kind.to_string(), json!(statement.verb()));
    object.insert(KEY_VERSION.to_string(), json!(PROTOCOL_VERSION));
    object.insert(KEY_REGISTRY.to_string(), json!(statement.registry().uri()));
    if let Some(label) = statement.label() {
        object.insert(KEY_LABEL.to_string(), json!(label));
    }
    if let Some(link) = statement.link() {
        object.insert(KEY_LINK.to_string(), json!(link));
    }
    if let Some(export) = statement.export() {
        object.insert(KEY_EXPORT.to_string(), json!(export));
    }
    object.insert(KEY_TOKEN.to_string(), json!(statement.token()));
    object.insert(KEY_WHEN.to_string(), json!(statement.when().to_string()));

    let parameters: Map<String, Json> = statement
        .parameters()
        .map(|p| {
            let text = match form {
                ParameterForm::Constraint => p.constraint().to_string(),
                ParameterForm::Value => Primitive::unparse(p.value()),
            };
            (p.name().to_string(), json!(text))
        })
        .collect();
    object.insert(KEY_PARAMETERS.to_string(), Json::Object(parameters));

    let metadata: Map<String, Json> = statement
        .metadata()
        .map(|m| (m.name().to_string(), json!(m.value().to_string())))
        .collect();
    object.insert(KEY_METADATA.to_string(), Json::Object(metadata));

    let results: Vec<&str> = statement.result_column_names().collect();
    object.insert(KEY_RESULTS.to_string(), json!(results));

    if rows {
        let values: Vec<Vec<String>> = (0..statement.count_result_rows())
            .map(|row| {
                statement
                    .result_row(row)
                    .into_iter()
                    .map(Primitive::unparse)
                    .collect()
            })
            .collect();
        object.insert(KEY_RESULT_VALUES.to_string(), json!(values));
    }
    Json::Object(object)
}

// --- decoding ---

pub fn from_str(registries: &Registries, text: &str) -> Result<Message, Error> {
    let value: Json = serde_json::from_str(text).map_err(ParseError::from)?;
    from_json(registries, &value)
}

pub fn from_json(registries: &Registries, value: &Json) -> Result<Message, Error> {
    let object = value
        .as_object()
        .ok_or_else(|| ParseError::InvalidMessage("message is not an object".to_string()))?;
    let kind = KINDS
        .iter()
        .find(|k| object.contains_key(**k))
        .ok_or_else(|| ParseError::InvalidMessage("no message kind key".to_string()))?;
    check_version(object)?;

    let message = match *kind {
        "capability" => {
            let statement = decode_statement(registries, object, kind, ParameterForm::Constraint)?;
            Message::Capability(Capability::from_statement(statement))
        }
        "withdrawal" => {
            let statement = decode_statement(registries, object, kind, ParameterForm::Constraint)?;
            Message::Withdrawal(Withdrawal::from_statement(statement))
        }
        "specification" => {
            let statement = decode_statement(registries, object, kind, ParameterForm::Value)?;
            Message::Specification(Specification::from_statement(statement))
        }
        "receipt" => {
            let statement = decode_statement(registries, object, kind, ParameterForm::Value)?;
            Message::Receipt(Receipt::from_statement(statement))
        }
        "result" => {
            let mut statement = decode_statement(registries, object, kind, ParameterForm::Value)?;
            decode_rows(&mut statement, object)?;
            Message::Result(ResultStatement::from_statement(statement))
        }
        "redemption" => Message::Redemption(Redemption::new(
            required_str(object, kind)?,
            required_str(object, KEY_TOKEN)?,
        )),
        "interrupt" => Message::Interrupt(Interrupt::new(
            required_str(object, kind)?,
            required_str(object, KEY_TOKEN)?,
        )),
        "exception" => {
            let token = optional_str(object, kind)?;
            let message = optional_str(object, KEY_MESSAGE)?.unwrap_or_default();
            Message::Exception(Exception::new(token, message))
        }
        _ => {
            let name = required_str(object, kind)?;
            let envelope_kind = EnvelopeKind::from_name(&name).ok_or_else(|| {
                ParseError::InvalidMessage(format!("unknown envelope kind {:?}", name))
            })?;
            let contents = match object.get(KEY_CONTENTS) {
                Some(Json::Array(items)) => items
                    .iter()
                    .map(|item| from_json(registries, item))
                    .collect::<Result<Vec<_>, _>>()?,
                Some(_) => {
                    return Err(
                        ParseError::InvalidMessage("envelope contents is not a list".to_string())
                            .into(),
                    )
                }
                None => Vec::new(),
            };
            Message::Envelope(Envelope::with_contents(envelope_kind, contents))
        }
    };
    tracing::debug!(kind = message.kind(), token = ?message.token(), "decoded message");
    Ok(message)
}

fn check_version(object: &Map<String, Json>) -> Result<(), ParseError> {
    let version = object
        .get(KEY_VERSION)
        .ok_or_else(|| ParseError::MissingField(KEY_VERSION.to_string()))?
        .as_u64()
        .ok_or_else(|| ParseError::InvalidMessage("version is not a natural number".to_string()))?;
    if version > PROTOCOL_VERSION {
        return Err(ParseError::UnsupportedVersion {
            found: version,
            supported: PROTOCOL_VERSION,
        });
    }
    Ok(())
}

fn decode_statement(
    registries: &Registries,
    object: &Map<String, Json>,
    kind: &str,
    form: ParameterForm,
) -> Result<Statement, Error> {
    let verb = required_str(object, kind)?;
    let uri = optional_str(object, KEY_REGISTRY)?.unwrap_or_else(|| CORE_REGISTRY_URI.to_string());
    let registry = registries.get(&uri)?;

    let mut statement = Statement::new(verb, registry);
    if let Some(label) = optional_str(object, KEY_LABEL)? {
        statement.set_label(label);
    }
    if let Some(link) = optional_str(object, KEY_LINK)? {
        statement.set_link(link);
    }
    if let Some(export) = optional_str(object, KEY_EXPORT)? {
        statement.set_export(export);
    }
    if let Some(token) = optional_str(object, KEY_TOKEN)? {
        statement.set_token(token);
    }
    if let Some(when) = optional_str(object, KEY_WHEN)? {
        statement.set_when(When::parse(&when)?);
    }

    for (name, text) in string_map(object, KEY_PARAMETERS)? {
        match form {
            ParameterForm::Constraint => {
                statement.add_parameter_text(&name, &text)?;
            }
            ParameterForm::Value => {
                statement.add_parameter_text(&name, "*")?;
                statement.set_parameter_text(&name, &text)?;
            }
        }
    }
    for (name, text) in string_map(object, KEY_METADATA)? {
        statement.add_metadata_text(&name, &text)?;
    }
    if let Some(results) = object.get(KEY_RESULTS) {
        let names = results.as_array().ok_or_else(|| {
            ParseError::InvalidMessage(format!("{} is not a list", KEY_RESULTS))
        })?;
        for name in names {
            let name = name.as_str().ok_or_else(|| {
                ParseError::InvalidMessage("result column name is not a string".to_string())
            })?;
            statement.add_result_column(name)?;
        }
    }
    Ok(statement)
}

fn decode_rows(statement: &mut Statement, object: &Map<String, Json>) -> Result<(), ParseError> {
    let Some(rows) = object.get(KEY_RESULT_VALUES) else {
        return Ok(());
    };
    let rows = rows
        .as_array()
        .ok_or_else(|| ParseError::InvalidMessage(format!("{} is not a list", KEY_RESULT_VALUES)))?;
    let mut columns: Vec<&mut ResultColumn> = statement.result_columns_mut().collect();
    for (index, row) in rows.iter().enumerate() {
        let cells = row
            .as_array()
            .filter(|cells| cells.len() == columns.len())
            .ok_or_else(|| {
                ParseError::InvalidMessage(format!(
                    "result row {} does not have {} values",
                    index,
                    columns.len()
                ))
            })?;
        for (column, cell) in columns.iter_mut().zip(cells) {
            let value = column.primitive().parse(&scalar_text(cell)?)?;
            column.push(value);
        }
    }
    Ok(())
}

fn required_str(object: &Map<String, Json>, key: &str) -> Result<String, ParseError> {
    optional_str(object, key)?.ok_or_else(|| ParseError::MissingField(key.to_string()))
}

fn optional_str(object: &Map<String, Json>, key: &str) -> Result<Option<String>, ParseError> {
    match object.get(key) {
        None | Some(Json::Null) => Ok(None),
        Some(Json::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ParseError::InvalidMessage(format!("{} is not a string", key))),
    }
}

fn string_map(
    object: &Map<String, Json>,
    key: &str,
) -> Result<Vec<(String, String)>, ParseError> {
    match object.get(key) {
        None | Some(Json::Null) => Ok(Vec::new()),
        Some(Json::Object(map)) => map
            .iter()
            .map(|(name, value)| Ok((name.clone(), scalar_text(value)?)))
            .collect(),
        Some(_) => Err(ParseError::InvalidMessage(format!("{} is not an object", key))),
    }
}

/// Text of a scalar cell; senders sometimes write bare numbers and booleans
fn scalar_text(value: &Json) -> Result<String, ParseError> {
    match value {
        Json::String(s) => Ok(s.clone()),
        Json::Number(n) => Ok(n.to_string()),
        Json::Bool(true) => Ok("True".to_string()),
        Json::Bool(false) => Ok("False".to_string()),
        Json::Null => Ok(crate::primitive::UNCONSTRAINED.to_string()),
        _ => Err(ParseError::InvalidMessage(format!(
            "expected a scalar, found {}",
            value
        ))),
    }
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
