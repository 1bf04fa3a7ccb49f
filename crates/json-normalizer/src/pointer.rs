//! JSON Pointer helpers for addressing locations inside schema documents.
use std::borrow::Cow;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use serde_json::Value;

/// Characters that may not appear verbatim in a URI fragment.
const FRAGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b']')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Look up a value by a JSON Pointer.
#[must_use]
pub(crate) fn pointer<'a>(document: &'a Value, pointer: &str) -> Option<&'a Value> {
    if pointer.is_empty() {
        return Some(document);
    }
    if !pointer.starts_with('/') {
        return None;
    }
    pointer.split('/').skip(1).map(unescape_segment).try_fold(
        document,
        |target, token| match target {
            Value::Object(map) => map.get(&*token),
            Value::Array(list) => parse_index(&token).and_then(|x| list.get(x)),
            _ => None,
        },
    )
}

// Taken from `serde_json`.
#[must_use]
pub(crate) fn parse_index(s: &str) -> Option<usize> {
    if s.starts_with('+') || (s.starts_with('0') && s.len() != 1) {
        return None;
    }
    s.parse().ok()
}

/// Unescape a single reference token (`~1` -> `/`, `~0` -> `~`).
#[must_use]
pub(crate) fn unescape_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains('~') {
        Cow::Owned(segment.replace("~1", "/").replace("~0", "~"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Escape a single reference token (`~` -> `~0`, `/` -> `~1`).
#[must_use]
pub(crate) fn escape_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains(['~', '/']) {
        Cow::Owned(segment.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Append a reference token to `pointer`.
#[must_use]
pub(crate) fn join(pointer: &str, segment: &str) -> String {
    let escaped = escape_segment(segment);
    let mut joined = String::with_capacity(pointer.len() + escaped.len() + 1);
    joined.push_str(pointer);
    joined.push('/');
    joined.push_str(&escaped);
    joined
}

/// Append an array index to `pointer`.
#[must_use]
pub(crate) fn join_index(pointer: &str, index: usize) -> String {
    let mut buffer = itoa::Buffer::new();
    join(pointer, buffer.format(index))
}

/// Turn a JSON Pointer into a URI fragment (without the leading `#`).
#[must_use]
pub(crate) fn to_fragment(pointer: &str) -> String {
    utf8_percent_encode(pointer, FRAGMENT).to_string()
}

/// Decode a URI fragment into a JSON Pointer.
///
/// Returns `None` if the fragment is not a pointer (e.g. a plain-name anchor) or is not valid UTF-8
/// after percent-decoding.
#[must_use]
pub(crate) fn from_fragment(fragment: &str) -> Option<String> {
    let decoded = percent_decode_str(fragment).decode_utf8().ok()?;
    if decoded.is_empty() || decoded.starts_with('/') {
        Some(decoded.into_owned())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_case::test_case;

    use super::{from_fragment, join, join_index, pointer, to_fragment};

    #[test]
    fn test_empty_pointer() {
        let document = json!({});
        assert_eq!(pointer(&document, ""), Some(&document));
    }

    #[test_case("/definitions/foo", Some(&json!({"type": "string"})); "object member")]
    #[test_case("/items/1", Some(&json!(true)); "array element")]
    #[test_case("/items/01", None; "leading zero")]
    #[test_case("/a~1b", Some(&json!(1)); "escaped slash")]
    #[test_case("/m~0n", Some(&json!(2)); "escaped tilde")]
    #[test_case("definitions", None; "missing leading slash")]
    fn lookup(path: &str, expected: Option<&serde_json::Value>) {
        let document = json!({
            "definitions": {"foo": {"type": "string"}},
            "items": [false, true],
            "a/b": 1,
            "m~n": 2
        });
        assert_eq!(pointer(&document, path), expected);
    }

    #[test]
    fn join_escapes_segments() {
        assert_eq!(join("/properties", "a/b~c"), "/properties/a~1b~0c");
        assert_eq!(join_index("/anyOf", 3), "/anyOf/3");
    }

    #[test_case("/properties/foo bar", "/properties/foo%20bar")]
    #[test_case("/properties/100%", "/properties/100%25")]
    #[test_case("", "")]
    fn fragment_roundtrip(pointer: &str, fragment: &str) {
        assert_eq!(to_fragment(pointer), fragment);
        assert_eq!(from_fragment(fragment).as_deref(), Some(pointer));
    }

    #[test]
    fn anchors_are_not_pointers() {
        assert_eq!(from_fragment("foo"), None);
    }
}
