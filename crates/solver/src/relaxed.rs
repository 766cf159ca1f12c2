//! Relaxed literal reader.
//!
//! The generator is instructed to quote keys and values "properly" but is
//! not guaranteed to emit strict JSON. In practice it produces a
//! Python-flavored literal dialect: single OR double quotes, bareword keys,
//! `True`/`False`/`None` alongside `true`/`false`/`null`, trailing commas,
//! and sometimes a bare comma-separated sequence of mappings with no
//! surrounding brackets (a "tuple" in the upstream runtime's eyes). This
//! reader accepts that dialect and produces a `serde_json::Value`.
//!
//! Shape only — no semantic interpretation happens here.

use serde_json::{Map, Number, Value};

/// Parse a relaxed literal. Returns `None` on any malformation; the caller
/// decides what failure means.
pub(crate) fn parse(text: &str) -> Option<Value> {
    let mut r = Reader::new(text);
    r.skip_ws();
    let first = r.value()?;
    r.skip_ws();

    // A bare `{...}, {...}` sequence is list-shaped: the upstream runtime
    // would read it as a tuple, and the generator is told to emit a
    // "comma separated list" which sometimes arrives without brackets.
    if r.peek() == Some(b',') {
        let mut items = vec![first];
        while r.peek() == Some(b',') {
            r.bump();
            r.skip_ws();
            if r.at_end() {
                break; // trailing comma
            }
            items.push(r.value()?);
            r.skip_ws();
        }
        if !r.at_end() {
            return None;
        }
        return Some(Value::Array(items));
    }

    if r.at_end() { Some(first) } else { None }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    fn value(&mut self) -> Option<Value> {
        self.skip_ws();
        match self.peek()? {
            b'{' => self.object(),
            b'[' => self.sequence(b'[', b']'),
            b'(' => self.sequence(b'(', b')'),
            b'\'' | b'"' => self.string().map(Value::String),
            b'-' | b'+' | b'.' | b'0'..=b'9' => self.number(),
            c if c == b'_' || c.is_ascii_alphabetic() => self.bareword_value(),
            _ => None,
        }
    }

    fn object(&mut self) -> Option<Value> {
        self.bump(); // '{'
        let mut map = Map::new();
        self.skip_ws();
        if self.peek()? == b'}' {
            self.bump();
            return Some(Value::Object(map));
        }
        loop {
            let key = self.key()?;
            self.skip_ws();
            if self.bump()? != b':' {
                return None;
            }
            let val = self.value()?;
            map.insert(key, val);
            self.skip_ws();
            match self.bump()? {
                b'}' => return Some(Value::Object(map)),
                b',' => {
                    self.skip_ws();
                    if self.peek()? == b'}' {
                        self.bump();
                        return Some(Value::Object(map));
                    }
                }
                _ => return None,
            }
        }
    }

    /// `[...]` or `(...)` — both read as arrays.
    fn sequence(&mut self, open: u8, close: u8) -> Option<Value> {
        debug_assert_eq!(self.peek(), Some(open));
        self.bump();
        let mut items = Vec::new();
        self.skip_ws();
        if self.peek()? == close {
            self.bump();
            return Some(Value::Array(items));
        }
        loop {
            items.push(self.value()?);
            self.skip_ws();
            match self.bump()? {
                b if b == close => return Some(Value::Array(items)),
                b',' => {
                    self.skip_ws();
                    if self.peek()? == close {
                        self.bump();
                        return Some(Value::Array(items));
                    }
                }
                _ => return None,
            }
        }
    }

    fn key(&mut self) -> Option<String> {
        match self.peek()? {
            b'\'' | b'"' => self.string(),
            c if c == b'_' || c.is_ascii_alphabetic() => Some(self.ident()),
            _ => None,
        }
    }

    /// A quoted string, single or double. Multibyte UTF-8 content is copied
    /// through untouched.
    fn string(&mut self) -> Option<String> {
        let quote = self.bump()?;
        let mut buf: Vec<u8> = Vec::new();
        loop {
            let b = self.bump()?;
            if b == quote {
                return String::from_utf8(buf).ok();
            }
            if b != b'\\' {
                buf.push(b);
                continue;
            }
            match self.bump()? {
                b'n' => buf.push(b'\n'),
                b't' => buf.push(b'\t'),
                b'r' => buf.push(b'\r'),
                b'u' => {
                    let code = self.hex4()?;
                    let ch = char::from_u32(code)?;
                    let mut tmp = [0u8; 4];
                    buf.extend_from_slice(ch.encode_utf8(&mut tmp).as_bytes());
                }
                // Unknown escapes pass through verbatim — the generator
                // over-escapes more often than it under-escapes.
                other => buf.push(other),
            }
        }
    }

    fn hex4(&mut self) -> Option<u32> {
        let mut code = 0u32;
        for _ in 0..4 {
            let b = self.bump()?;
            code = code * 16 + (b as char).to_digit(16)?;
        }
        Some(code)
    }

    fn ident(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c == b'_' || c.is_ascii_alphanumeric()) {
            self.pos += 1;
        }
        // Identifier bytes are ASCII by construction.
        String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned()
    }

    /// Only the known literal barewords are valid as values; anything else
    /// is a malformation, not something to guess at.
    fn bareword_value(&mut self) -> Option<Value> {
        let word = self.ident();
        match word.as_str() {
            "True" | "true" => Some(Value::Bool(true)),
            "False" | "false" => Some(Value::Bool(false)),
            "None" | "null" => Some(Value::Null),
            _ => None,
        }
    }

    fn number(&mut self) -> Option<Value> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        while matches!(
            self.peek(),
            Some(b'0'..=b'9' | b'.' | b'e' | b'E' | b'+' | b'-')
        ) {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos]).ok()?;
        if let Ok(i) = text.parse::<i64>() {
            return Some(Value::Number(Number::from(i)));
        }
        let f = text.parse::<f64>().ok()?;
        Number::from_f64(f).map(Value::Number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_quoted_list_of_dicts() {
        let v = parse("[{'expr': '2+2', 'result': 4}]").unwrap();
        assert_eq!(v, json!([{"expr": "2+2", "result": 4}]));
    }

    #[test]
    fn double_quotes_also_accepted() {
        let v = parse(r#"[{"expr": "x", "result": 2}]"#).unwrap();
        assert_eq!(v, json!([{"expr": "x", "result": 2}]));
    }

    #[test]
    fn mixed_quote_styles() {
        let v = parse(r#"{'expr': "0x7f", "result": 'ok'}"#).unwrap();
        assert_eq!(v, json!({"expr": "0x7f", "result": "ok"}));
    }

    #[test]
    fn bareword_keys() {
        let v = parse("{expr: '2+2', result: 4, assign: False}").unwrap();
        assert_eq!(v, json!({"expr": "2+2", "result": 4, "assign": false}));
    }

    #[test]
    fn python_literals() {
        let v = parse("[{'a': True, 'b': False, 'c': None}]").unwrap();
        assert_eq!(v, json!([{"a": true, "b": false, "c": null}]));
    }

    #[test]
    fn json_literals() {
        let v = parse("{'a': true, 'b': false, 'c': null}").unwrap();
        assert_eq!(v, json!({"a": true, "b": false, "c": null}));
    }

    #[test]
    fn trailing_commas() {
        assert_eq!(parse("[1, 2, 3,]").unwrap(), json!([1, 2, 3]));
        assert_eq!(parse("{'a': 1,}").unwrap(), json!({"a": 1}));
    }

    #[test]
    fn numbers() {
        assert_eq!(parse("42").unwrap(), json!(42));
        assert_eq!(parse("-7").unwrap(), json!(-7));
        assert_eq!(parse("3.5").unwrap(), json!(3.5));
        assert_eq!(parse("1e3").unwrap(), json!(1000.0));
    }

    #[test]
    fn nested_structures() {
        let v = parse("[{'rows': [[1, 2], [3, 4]], 'meta': {'ok': True}}]").unwrap();
        assert_eq!(v, json!([{"rows": [[1, 2], [3, 4]], "meta": {"ok": true}}]));
    }

    #[test]
    fn unbracketed_comma_sequence_becomes_list() {
        let v = parse("{'expr': 'x', 'result': 2}, {'expr': 'y', 'result': 5}").unwrap();
        assert_eq!(
            v,
            json!([{"expr": "x", "result": 2}, {"expr": "y", "result": 5}])
        );
    }

    #[test]
    fn parenthesized_tuple_becomes_list() {
        let v = parse("({'a': 1}, {'b': 2})").unwrap();
        assert_eq!(v, json!([{"a": 1}, {"b": 2}]));
    }

    #[test]
    fn escape_sequences() {
        assert_eq!(parse(r"'a\nb'").unwrap(), json!("a\nb"));
        assert_eq!(parse(r"'don\'t'").unwrap(), json!("don't"));
        assert_eq!(parse(r#"'é'"#).unwrap(), json!("é"));
    }

    #[test]
    fn multibyte_content_survives() {
        assert_eq!(parse("'π ≈ 3.14159'").unwrap(), json!("π ≈ 3.14159"));
    }

    #[test]
    fn empty_containers() {
        assert_eq!(parse("[]").unwrap(), json!([]));
        assert_eq!(parse("{}").unwrap(), json!({}));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse("not valid at all {{{").is_none());
        assert!(parse("[{'expr': }]").is_none());
        assert!(parse("{'a' 1}").is_none());
        assert!(parse("'unterminated").is_none());
        assert!(parse("[1, 2] trailing").is_none());
        assert!(parse("").is_none());
    }

    #[test]
    fn rejects_unknown_bareword_values() {
        assert!(parse("{'expr': undefined}").is_none());
    }
}
