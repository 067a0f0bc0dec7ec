use serde_json::{Map, Value};

/// Parse a request body based on its Content-Type header.
///
/// JSON is the primary format; urlencoded bodies are accepted so the form
/// still works without scripting. Without a content type, JSON is tried
/// first, then urlencoded.
pub fn parse_body(content_type: Option<&str>, body: &[u8]) -> Result<Value, String> {
    match content_type {
        Some(ct) if ct.contains("application/json") => {
            serde_json::from_slice(body).map_err(|e| format!("Invalid JSON: {e}"))
        }
        Some(ct) if ct.contains("application/x-www-form-urlencoded") => {
            parse_form_urlencoded(body)
        }
        Some(ct) => Err(format!("Unsupported content type: {ct}")),
        None => serde_json::from_slice(body)
            .or_else(|_| parse_form_urlencoded(body))
            .map_err(|e| format!("Unable to parse body: {e}")),
    }
}

fn parse_form_urlencoded(body: &[u8]) -> Result<Value, String> {
    std::str::from_utf8(body).map_err(|e| format!("Invalid UTF-8: {e}"))?;

    let map: Map<String, Value> = form_urlencoded::parse(body)
        .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
        .collect();
    Ok(Value::Object(map))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_json_and_forms() {
        let json_body = parse_body(Some("application/json"), br#"{"name":"Asha"}"#).unwrap();
        assert_eq!(json_body, json!({ "name": "Asha" }));

        let form = parse_body(
            Some("application/x-www-form-urlencoded"),
            b"name=Asha+K&message=Hello%0AWorld",
        )
        .unwrap();
        assert_eq!(form, json!({ "name": "Asha K", "message": "Hello\nWorld" }));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_body(Some("application/json"), b"{not json").is_err());
        assert!(parse_body(Some("text/plain"), b"name=Asha").is_err());
    }
}
