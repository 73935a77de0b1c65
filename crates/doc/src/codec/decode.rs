//! Shape-driven decoding (spec.md §4.4): symmetric to `encode`, plus
//! detection of the query array form.
use super::{looks_like_query, normalize_payload, Options};
use crate::error::{CodecError, Error};
use crate::query;
use crate::shape::{Datatype, Shape};
use crate::value::{self, Object, Value};
use json::locale::Locale;
use json::Json;
use url::Url;

/// Parses `input` (optionally Base64- or URL-encoded) and decodes it
/// against `shape` and `base`. Arrays recognized as the query form
/// (spec.md §4.3) decode to `Value::Query`; everything else decodes
/// through the ordinary shaped-object rules.
pub fn decode(input: &str, shape: Option<&Shape>, base: &Url, options: &Options) -> Result<Value, Error> {
    let normalized = normalize_payload(input);
    let tree = json::tree::parse(&normalized)?;

    if looks_like_query(&tree) {
        let query_shape = shape.cloned().unwrap_or_default();
        let query = query::parse_json(&tree, &query_shape)?;
        return Ok(Value::Query(Box::new(query)));
    }

    Ok(decode_value(&tree, shape, base, options)?)
}

fn decode_value(
    json: &Json,
    shape: Option<&Shape>,
    base: &Url,
    options: &Options,
) -> Result<Value, CodecError> {
    match json {
        Json::Null => Ok(Value::Nil),
        Json::Bool(b) => Ok(Value::Bit(*b)),
        Json::Number(n) => Ok(decode_number(n, shape)),
        Json::String(s) => decode_scalar_string(s, shape, base),
        Json::Array(items) => decode_array(items, shape, base, options),
        Json::Object(fields) => decode_object_like(fields, shape, base, options),
    }
}

fn decode_number(n: &json::Number, shape: Option<&Shape>) -> Value {
    use json::Number::*;
    match (n, shape.and_then(|s| s.datatype)) {
        (Integral(i), Some(Datatype::Floating)) => Value::Floating(*i as f64),
        (i, _) => match i {
            Integral(v) => Value::Integral(*v),
            Floating(v) => Value::Floating(*v),
            Integer(v) => Value::Integer(v.clone()),
            Decimal(v) => Value::Decimal(v.clone()),
        },
    }
}

fn decode_scalar_string(s: &str, shape: Option<&Shape>, base: &Url) -> Result<Value, CodecError> {
    match shape.and_then(|sh| sh.datatype) {
        Some(Datatype::Uri) => Ok(Value::Uri(
            json::uri::resolve(base, s).map_err(|_| CodecError::WrongIdOrTypeField { line: 0, column: 0 })?,
        )),
        Some(Datatype::Text) => Ok(Value::Text(Locale::Root, s.to_string())),
        Some(Datatype::Temporal) => value::decode::temporal(s)
            .ok_or(CodecError::WrongIdOrTypeField { line: 0, column: 0 }),
        Some(Datatype::TemporalAmount) => value::decode::temporal_amount(s)
            .ok_or(CodecError::WrongIdOrTypeField { line: 0, column: 0 }),
        Some(Datatype::Bit) => value::decode::bit(s).ok_or(CodecError::WrongIdOrTypeField { line: 0, column: 0 }),
        Some(Datatype::Object) => {
            // `{id:"path"}` inline shorthand: a bare string where an id
            // field is declared.
            let resolved = json::uri::resolve(base, s)
                .map_err(|_| CodecError::WrongIdOrTypeField { line: 0, column: 0 })?;
            let mut object = Object::new();
            object.id = Some(resolved);
            if let Some(sh) = shape {
                object.shape = Some(std::rc::Rc::new(sh.clone()));
            }
            Ok(Value::Object(object))
        }
        _ => Ok(Value::String(s.to_string())),
    }
}

fn decode_array(
    items: &[Json],
    shape: Option<&Shape>,
    base: &Url,
    options: &Options,
) -> Result<Value, CodecError> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if shape.is_some() && matches!(item, Json::Array(_)) {
            return Err(CodecError::NestedArray { line: 0, column: 0 });
        }
        if shape.is_some() && matches!(item, Json::Null) {
            return Err(CodecError::UnexpectedNull { line: 0, column: 0 });
        }
        out.push(decode_value(item, shape, base, options)?);
    }
    Ok(Value::Array(out))
}

fn decode_object_like(
    fields: &indexmap::IndexMap<std::string::String, Json>,
    shape: Option<&Shape>,
    base: &Url,
    options: &Options,
) -> Result<Value, CodecError> {
    if fields.contains_key("@value") {
        return decode_value_wrapper(fields, base);
    }
    decode_object(fields, shape, base, options)
}

fn decode_value_wrapper(
    fields: &indexmap::IndexMap<std::string::String, Json>,
    base: &Url,
) -> Result<Value, CodecError> {
    let value_json = fields.get("@value").unwrap();
    let lexical = value_json
        .as_str()
        .ok_or(CodecError::DuplicateValue { line: 0, column: 0 })?;

    let language = fields.get("@language").and_then(Json::as_str);
    let datatype = fields.get("@type").and_then(Json::as_str);

    if fields.len() > 2 || (language.is_some() && datatype.is_some()) {
        return Err(CodecError::UnexpectedKeyword {
            line: 0,
            column: 0,
            keyword: "@value".to_string(),
        });
    }

    if let Some(tag) = language {
        let locale = Locale::decode(tag).map_err(|_| CodecError::MalformedLocale(tag.to_string()))?;
        return Ok(Value::Text(locale, lexical.to_string()));
    }
    if let Some(datatype) = datatype {
        let resolved = json::uri::resolve(base, datatype)
            .map_err(|_| CodecError::WrongIdOrTypeField { line: 0, column: 0 })?;
        return Ok(Value::Data(resolved, lexical.to_string()));
    }
    Ok(Value::Text(Locale::Root, lexical.to_string()))
}

fn decode_object(
    fields: &indexmap::IndexMap<std::string::String, Json>,
    shape: Option<&Shape>,
    base: &Url,
    options: &Options,
) -> Result<Value, CodecError> {
    let mut object = Object::new();
    if let Some(sh) = shape {
        object.shape = Some(std::rc::Rc::new(sh.clone()));
    }
    let id_field = shape.and_then(|s| s.id.clone());
    let type_field = shape.and_then(|s| s.type_.clone());

    for (name, value) in fields.iter() {
        if Some(name) == id_field.as_ref() {
            let s = value
                .as_str()
                .ok_or(CodecError::WrongIdOrTypeField { line: 0, column: 0 })?;
            object.id = Some(
                json::uri::resolve(base, s).map_err(|_| CodecError::WrongIdOrTypeField { line: 0, column: 0 })?,
            );
            continue;
        }
        if Some(name) == type_field.as_ref() {
            let s = value
                .as_str()
                .ok_or(CodecError::WrongIdOrTypeField { line: 0, column: 0 })?;
            object.type_ = Some(s.to_string());
            continue;
        }

        let property = shape.and_then(|s| s.property(name));
        if property.is_none() && shape.is_some() {
            return Err(CodecError::UnknownProperty {
                line: 0,
                column: 0,
                property: name.clone(),
            });
        }
        let nested_shape = property.map(|p| &p.shape);
        let decoded = decode_field(value, nested_shape, base, options)?;
        if options.prune && decoded.is_prunable() {
            continue;
        }
        object.fields.insert(name.clone(), decoded);
    }

    Ok(Value::Object(object))
}

/// Decodes one Object field, expanding the language-map shorthand when
/// the nested shape declares `datatype = Text` and the raw JSON is a map
/// rather than the explicit `{@value,@language}` form.
fn decode_field(
    json: &Json,
    nested_shape: Option<&Shape>,
    base: &Url,
    options: &Options,
) -> Result<Value, CodecError> {
    let is_text_shape = nested_shape.and_then(|s| s.datatype) == Some(Datatype::Text);
    if is_text_shape {
        if let Json::Object(map) = json {
            if !map.contains_key("@value") {
                return decode_language_map(map);
            }
        }
    }
    decode_value(json, nested_shape, base, options)
}

fn decode_language_map(map: &indexmap::IndexMap<std::string::String, Json>) -> Result<Value, CodecError> {
    let mut texts = Vec::new();
    for (tag, value) in map.iter() {
        let locale = Locale::decode(tag).map_err(|_| CodecError::MalformedLocale(tag.clone()))?;
        match value {
            Json::String(s) => texts.push(Value::Text(locale, s.clone())),
            Json::Array(items) => {
                for item in items {
                    let s = item
                        .as_str()
                        .ok_or(CodecError::WrongIdOrTypeField { line: 0, column: 0 })?;
                    texts.push(Value::Text(locale.clone(), s.to_string()));
                }
            }
            _ => return Err(CodecError::WrongIdOrTypeField { line: 0, column: 0 }),
        }
    }
    Ok(Value::Array(texts))
}
