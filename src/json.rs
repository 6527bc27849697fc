//! JSON text parsing without a nesting limit.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ConversionError;

/// Parses `bytes` as a single JSON document, however deeply it nests.
///
/// serde_json normally stops at 128 levels; here the limit is lifted and
/// the stack grows on demand instead.
pub(crate) fn parse(bytes: &[u8], context: impl Into<String>) -> Result<Value, ConversionError> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    deserializer.disable_recursion_limit();
    let parsed = Value::deserialize(serde_stacker::Deserializer::new(&mut deserializer));
    parsed
        .and_then(|value| deserializer.end().map(|()| value))
        .map_err(|e| ConversionError::malformed(context, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested(depth: usize) -> String {
        format!("{}1{}", r#"{"a":"#.repeat(depth), "}".repeat(depth))
    }

    #[test]
    fn test_parses_past_default_depth() {
        let value = parse(nested(1000).as_bytes(), "doc").unwrap();
        let mut current = &value;
        let mut depth = 0;
        while let Some(inner) = current.get("a") {
            current = inner;
            depth += 1;
        }
        assert_eq!(depth, 1000);
        assert_eq!(current, &Value::from(1));
    }

    #[test]
    fn test_rejects_trailing_content() {
        let err = parse(br#"{"a": 1} {"b": 2}"#, "doc").unwrap_err();
        assert!(matches!(
            err,
            ConversionError::MalformedInput { ref context, .. } if context == "doc"
        ));
    }

    #[test]
    fn test_rejects_truncated_input() {
        assert!(parse(br#"{"a": ["#, "doc").is_err());
    }
}
