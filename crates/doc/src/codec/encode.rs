//! Shape-driven encoding (spec.md §4.4).
use super::Options;
use crate::query::{Probe, Query};
use crate::shape::{Datatype, Shape};
use crate::value::{Object, Value};
use json::locale::Locale;
use json::{Json, Number};
use std::fmt::Write as _;
use url::Url;

/// Encodes `value` against `shape` (if any) and `base`, returning JSON
/// text.
pub fn encode(value: &Value, shape: Option<&Shape>, base: &Url, options: &Options) -> String {
    let json = to_json(value, shape, base, options);
    write_json(&json, options, 0)
}

fn to_json(value: &Value, shape: Option<&Shape>, base: &Url, options: &Options) -> Json {
    match value {
        Value::Nil => Json::Null,
        Value::Bit(b) => Json::Bool(*b),
        Value::Integral(n) => Json::Number(Number::Integral(*n)),
        Value::Floating(f) => Json::Number(Number::Floating(*f)),
        Value::Integer(n) => Json::Number(Number::Integer(n.clone())),
        Value::Decimal(d) => Json::Number(Number::Decimal(d.clone())),
        Value::String(s) => Json::String(s.clone()),
        Value::Uri(abs) => Json::String(json::uri::relativize(base, abs)),
        Value::Temporal(t) => Json::String(t.encode()),
        Value::TemporalAmount(t) => Json::String(t.encode()),
        Value::Text(locale, s) => encode_text_scalar(locale, s),
        Value::Data(datatype, lexical) => encode_data_scalar(shape, datatype, lexical, base),
        Value::Object(object) => encode_object(object, shape, base, options),
        Value::Array(items) => Json::Array(
            items
                .iter()
                .map(|v| to_json(v, shape, base, options))
                .collect(),
        ),
        Value::Query(query) => encode_query(query, base, options),
        Value::Specs(specs) => encode_specs_probes(&specs.probes, base, options),
    }
}

fn encode_text_scalar(locale: &Locale, s: &str) -> Json {
    let mut obj = indexmap::IndexMap::new();
    obj.insert("@value".to_string(), Json::String(s.to_string()));
    obj.insert("@language".to_string(), Json::String(locale.encode()));
    Json::Object(obj)
}

fn encode_data_scalar(shape: Option<&Shape>, datatype: &str, lexical: &str, base: &Url) -> Json {
    let known = shape
        .and_then(|s| s.datatype)
        .map(|d| d == Datatype::Data)
        .unwrap_or(false);
    if known {
        Json::String(lexical.to_string())
    } else {
        let mut obj = indexmap::IndexMap::new();
        obj.insert("@value".to_string(), Json::String(lexical.to_string()));
        obj.insert(
            "@type".to_string(),
            Json::String(json::uri::relativize(base, datatype)),
        );
        Json::Object(obj)
    }
}

fn encode_object(object: &Object, shape: Option<&Shape>, base: &Url, options: &Options) -> Json {
    let effective = object.shape.as_deref().or(shape);
    let mut fields = indexmap::IndexMap::new();

    if let (Some(id), Some(id_field)) = (&object.id, effective.and_then(|s| s.id.clone())) {
        fields.insert(id_field, Json::String(json::uri::relativize(base, id)));
    }
    if let (Some(type_), Some(type_field)) = (&object.type_, effective.and_then(|s| s.type_.clone())) {
        fields.insert(type_field, Json::String(type_.clone()));
    }

    for (name, value) in object.fields.iter() {
        let property = effective.and_then(|s| s.property(name));
        if let Some(p) = property {
            if p.hidden {
                continue;
            }
        } else if effective.is_some() {
            continue; // unknown field under a shape: drop silently on encode
        }
        let nested_shape = property.map(|p| &p.shape);
        let json_value = encode_field(value, nested_shape, base, options);
        if options.prune && is_prunable_json(&json_value) {
            continue;
        }
        fields.insert(name.clone(), json_value);
    }

    Json::Object(fields)
}

/// Encodes one Object field, applying the language-map and typed-literal
/// shorthands that only apply at this position (spec.md §4.4 rules 3-4).
fn encode_field(value: &Value, nested_shape: Option<&Shape>, base: &Url, options: &Options) -> Json {
    let is_text_shape = nested_shape.and_then(|s| s.datatype) == Some(Datatype::Text);
    if is_text_shape {
        let unique_lang = nested_shape.map(|s| s.unique_lang).unwrap_or(false);
        match value {
            Value::Text(locale, s) => encode_language_map(&[(locale.clone(), s.clone())], unique_lang),
            Value::Array(items) => {
                let pairs: Vec<(Locale, std::string::String)> = items
                    .iter()
                    .filter_map(|v| match v {
                        Value::Text(l, s) => Some((l.clone(), s.clone())),
                        _ => None,
                    })
                    .collect();
                encode_language_map(&pairs, unique_lang)
            }
            other => to_json(other, nested_shape, base, options),
        }
    } else {
        to_json(value, nested_shape, base, options)
    }
}

fn encode_language_map(pairs: &[(Locale, std::string::String)], unique_lang: bool) -> Json {
    let mut map: indexmap::IndexMap<std::string::String, Json> = indexmap::IndexMap::new();
    for (locale, text) in pairs {
        let key = locale.encode();
        if unique_lang {
            map.insert(key, Json::String(text.clone()));
        } else {
            match map.get_mut(&key) {
                Some(Json::Array(items)) => items.push(Json::String(text.clone())),
                Some(existing) => {
                    let prior = existing.clone();
                    *existing = Json::Array(vec![prior, Json::String(text.clone())]);
                }
                None => {
                    map.insert(key, Json::String(text.clone()));
                }
            }
        }
    }
    Json::Object(map)
}

fn is_prunable_json(json: &Json) -> bool {
    match json {
        Json::Null => true,
        Json::Object(o) => o.is_empty(),
        Json::Array(a) => a.is_empty(),
        _ => false,
    }
}

fn encode_query(query: &Query, base: &Url, options: &Options) -> Json {
    let mut fields: indexmap::IndexMap<std::string::String, Json> = indexmap::IndexMap::new();

    for (expr, criterion) in query.criteria.iter() {
        let path = expr.render();
        if let Some(n) = criterion.order {
            let value = match n {
                1 => Json::String("increasing".to_string()),
                -1 => Json::String("decreasing".to_string()),
                other => Json::Number(Number::Integral(other as i64)),
            };
            fields.insert(format!("^{path}"), value);
        }
        if let Some(v) = &criterion.lt {
            fields.insert(format!("<{path}"), Json::String(v.encode(base)));
        }
        if let Some(v) = &criterion.lte {
            fields.insert(format!("<={path}"), Json::String(v.encode(base)));
        }
        if let Some(v) = &criterion.gt {
            fields.insert(format!(">{path}"), Json::String(v.encode(base)));
        }
        if let Some(v) = &criterion.gte {
            fields.insert(format!(">={path}"), Json::String(v.encode(base)));
        }
        if let Some(like) = &criterion.like {
            fields.insert(format!("~{path}"), Json::String(like.clone()));
        }
        if let Some(any) = &criterion.any {
            let value = match any.len() {
                0 => Json::String("*".to_string()),
                1 if any[0] == Value::Nil => Json::String(std::string::String::new()),
                1 => Json::String(any[0].encode(base)),
                _ => Json::Array(any.iter().map(|v| Json::String(v.encode(base))).collect()),
            };
            fields.insert(path, value);
        }
    }

    if let Value::Specs(specs) = &query.model {
        for (key, value) in specs_fields(&specs.probes, base, options) {
            fields.insert(key, value);
        }
    }

    if let Some(offset) = query.offset {
        fields.insert("@".to_string(), Json::Number(Number::Integral(offset)));
    }
    if let Some(limit) = query.limit {
        fields.insert("#".to_string(), Json::Number(Number::Integral(limit)));
    }

    Json::Array(vec![Json::Object(fields)])
}

fn encode_specs_probes(probes: &[Probe], base: &Url, options: &Options) -> Json {
    let fields = specs_fields(probes, base, options).into_iter().collect();
    Json::Array(vec![Json::Object(fields)])
}

fn specs_fields(
    probes: &[Probe],
    base: &Url,
    options: &Options,
) -> Vec<(std::string::String, Json)> {
    probes
        .iter()
        .map(|probe| {
            let key = probe_key(probe);
            let value = to_json(&probe.model, None, base, options);
            (key, value)
        })
        .collect()
}

fn probe_key(probe: &Probe) -> std::string::String {
    let rendered = probe.expression.render();
    if probe.alias == rendered {
        probe.alias.clone()
    } else {
        format!("{}={}", probe.alias, rendered)
    }
}

fn write_json(json: &Json, options: &Options, depth: usize) -> std::string::String {
    let mut out = std::string::String::new();
    write_value(&mut out, json, options, depth);
    out
}

fn write_value(out: &mut std::string::String, json: &Json, options: &Options, depth: usize) {
    match json {
        Json::Null => out.push_str("null"),
        Json::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Json::Number(n) => out.push_str(&n.encode()),
        Json::String(s) => write_string(out, s),
        Json::Array(items) => write_array(out, items, options, depth),
        Json::Object(fields) => write_object(out, fields, options, depth),
    }
}

fn write_array(out: &mut std::string::String, items: &[Json], options: &Options, depth: usize) {
    if items.is_empty() {
        out.push_str("[]");
        return;
    }
    out.push('[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        newline_indent(out, options, depth + 1);
        write_value(out, item, options, depth + 1);
    }
    newline_indent(out, options, depth);
    out.push(']');
}

fn write_object(
    out: &mut std::string::String,
    fields: &indexmap::IndexMap<std::string::String, Json>,
    options: &Options,
    depth: usize,
) {
    if fields.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push('{');
    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        newline_indent(out, options, depth + 1);
        write_string(out, key);
        out.push(':');
        write_value(out, value, options, depth + 1);
    }
    newline_indent(out, options, depth);
    out.push('}');
}

fn newline_indent(out: &mut std::string::String, options: &Options, depth: usize) {
    if let Some(width) = options.indent {
        out.push('\n');
        for _ in 0..(width * depth) {
            out.push(' ');
        }
    }
}

fn write_string(out: &mut std::string::String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Property;
    use crate::test_base;

    #[test]
    fn prunes_empty_fields_when_enabled() {
        let mut object = Object::new();
        object.fields.insert("a".to_string(), Value::Nil);
        object.fields.insert("b".to_string(), Value::Integral(1));

        let base = test_base();
        let options = Options::new().with_prune(true);
        let text = encode(&Value::Object(object), None, &base, &options);
        assert_eq!(text, r#"{"b":1}"#);
    }

    #[test]
    fn text_collapses_to_language_map() {
        let shape = Shape::new().with_property(
            Property::new("label", Shape::new().with_datatype(Datatype::Text)),
        );
        let mut object = Object::new();
        object.fields.insert(
            "label".to_string(),
            Value::Array(vec![
                Value::Text(Locale::Tag("en".into()), "hello".into()),
                Value::Text(Locale::Tag("fr".into()), "bonjour".into()),
            ]),
        );
        let base = test_base();
        let text = encode(&Value::Object(object), Some(&shape), &base, &Options::new());
        assert!(text.contains(r#""en":"hello""#));
        assert!(text.contains(r#""fr":"bonjour""#));
    }
}
