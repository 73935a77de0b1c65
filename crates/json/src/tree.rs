//! A minimal order-preserving JSON tree, parsed with [`crate::Lexer`] rather
//! than `serde_json` so object key order and duplicate keys survive into
//! the codec and query layers above this crate.
use crate::error::{Error, Location};
use crate::{Lexer, Number, Token};
use indexmap::IndexMap;

#[derive(Clone, Debug, PartialEq)]
pub enum Json {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Json>),
    /// Preserves insertion order; a repeated key is a [`Error::DuplicateKey`].
    Object(IndexMap<String, Json>),
}

impl Json {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Json::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Json>> {
        match self {
            Json::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Json]> {
        match self {
            Json::Array(a) => Some(a),
            _ => None,
        }
    }
}

/// Parses exactly one JSON value from `input`, rejecting trailing
/// non-whitespace content.
pub fn parse(input: &str) -> Result<Json, Error> {
    let mut lexer = Lexer::new(input);
    let value = parse_value(&mut lexer)?;
    let (tok, loc) = lexer.next_token()?;
    if tok != Token::Eof {
        return Err(Error::TrailingInput(loc));
    }
    Ok(value)
}

fn parse_value(lexer: &mut Lexer) -> Result<Json, Error> {
    let (tok, loc) = lexer.next_token()?;
    parse_value_from(lexer, tok, loc)
}

fn parse_value_from(lexer: &mut Lexer, tok: Token, loc: Location) -> Result<Json, Error> {
    match tok {
        Token::Null => Ok(Json::Null),
        Token::Bool(b) => Ok(Json::Bool(b)),
        Token::Number(n) => Ok(Json::Number(n)),
        Token::String(s) => Ok(Json::String(s)),
        Token::BracketOpen => parse_array(lexer),
        Token::BraceOpen => parse_object(lexer),
        Token::Eof => Err(Error::UnexpectedEof(loc)),
        other => Err(Error::UnexpectedChar(loc, token_char(&other))),
    }
}

fn token_char(tok: &Token) -> char {
    match tok {
        Token::BraceClose => '}',
        Token::BracketClose => ']',
        Token::Colon => ':',
        Token::Comma => ',',
        _ => '?',
    }
}

fn parse_array(lexer: &mut Lexer) -> Result<Json, Error> {
    let mut items = Vec::new();
    let (tok, loc) = lexer.next_token()?;
    if tok == Token::BracketClose {
        return Ok(Json::Array(items));
    }
    items.push(parse_value_from(lexer, tok, loc)?);
    loop {
        let (tok, loc) = lexer.next_token()?;
        match tok {
            Token::BracketClose => return Ok(Json::Array(items)),
            Token::Comma => items.push(parse_value(lexer)?),
            other => return Err(Error::UnexpectedChar(loc, token_char(&other))),
        }
    }
}

fn parse_object(lexer: &mut Lexer) -> Result<Json, Error> {
    let mut fields = IndexMap::new();
    let (tok, loc) = lexer.next_token()?;
    if tok == Token::BraceClose {
        return Ok(Json::Object(fields));
    }
    parse_entry(lexer, tok, loc, &mut fields)?;
    loop {
        let (tok, loc) = lexer.next_token()?;
        match tok {
            Token::BraceClose => return Ok(Json::Object(fields)),
            Token::Comma => {
                let (tok, loc) = lexer.next_token()?;
                parse_entry(lexer, tok, loc, &mut fields)?;
            }
            other => return Err(Error::UnexpectedChar(loc, token_char(&other))),
        }
    }
}

fn parse_entry(
    lexer: &mut Lexer,
    tok: Token,
    loc: Location,
    fields: &mut IndexMap<String, Json>,
) -> Result<(), Error> {
    let key = match tok {
        Token::String(s) => s,
        other => return Err(Error::UnexpectedChar(loc, token_char(&other))),
    };
    let (colon, colon_loc) = lexer.next_token()?;
    if colon != Token::Colon {
        return Err(Error::UnexpectedChar(colon_loc, token_char(&colon)));
    }
    let value = parse_value(lexer)?;
    if fields.insert(key.clone(), value).is_some() {
        return Err(Error::DuplicateKey(loc, key));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_object_preserving_order() {
        let json = parse("{'x':1,'y':2}").unwrap();
        let obj = json.as_object().unwrap();
        let keys: Vec<_> = obj.keys().cloned().collect();
        assert_eq!(keys, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn nested_array_round_trips_through_the_tree() {
        let json = parse(r#"{"a":[1,2,{"b":true}]}"#).unwrap();
        let expected = Json::Object(IndexMap::from_iter([(
            "a".to_string(),
            Json::Array(vec![
                Json::Number(Number::Integral(1)),
                Json::Number(Number::Integral(2)),
                Json::Object(IndexMap::from_iter([("b".to_string(), Json::Bool(true))])),
            ]),
        )]));
        assert_eq!(json, expected);
    }

    #[test]
    fn rejects_duplicate_keys() {
        let err = parse(r#"{"x":1,"x":2}"#).unwrap_err();
        assert!(matches!(err, Error::DuplicateKey(_, _)));
    }

    #[test]
    fn rejects_trailing_input() {
        let err = parse("1 2").unwrap_err();
        assert!(matches!(err, Error::TrailingInput(_)));
    }

    #[test]
    fn parses_nested_array() {
        let json = parse("[1,[2,3],null,true]").unwrap();
        assert_eq!(json.as_array().unwrap().len(), 4);
    }
}
