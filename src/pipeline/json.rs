//! JSON tree walker: extract base64 images from a parsed document in place.
//!
//! Two conventions are recognised:
//!
//! * an object with `"mime_type": "image/…"` and a sibling string `"data"`
//!   holding raw base64: `data` is overwritten with the file reference and
//!   `mime_type` is left alone. A failure here is fatal: the caller asked for
//!   a structured image field and it is broken.
//! * any string value that is a Markdown image or a bare data-URL, replaced
//!   as described in [`crate::pipeline::text`]. Failures are non-fatal.
//!
//! Key order is preserved because `serde_json` is built with
//! `preserve_order`, and overwriting an existing key keeps its position.

use crate::error::{B64Error, SkippedPayload};
use crate::pipeline::save::{PayloadSaver, SavedPayload};
use crate::pipeline::text::{rewrite_string_value, StringRewrite};
use serde_json::Value;
use tracing::debug;

/// Payloads handled while walking a document.
#[derive(Debug, Default)]
pub struct JsonRewrite {
    pub saved: Vec<SavedPayload>,
    pub skipped: Vec<SkippedPayload>,
}

/// Walk `root` and rewrite every embedded image.
pub fn rewrite_json(root: &mut Value, saver: &PayloadSaver<'_>) -> Result<JsonRewrite, B64Error> {
    let mut report = JsonRewrite::default();
    walk(root, saver, &mut report)?;
    debug!(
        "JSON walk done: {} saved, {} skipped",
        report.saved.len(),
        report.skipped.len()
    );
    Ok(report)
}

fn walk(value: &mut Value, saver: &PayloadSaver<'_>, report: &mut JsonRewrite) -> Result<(), B64Error> {
    match value {
        Value::Object(map) => {
            let image_mime = map
                .get("mime_type")
                .and_then(Value::as_str)
                .filter(|m| m.starts_with("image/"));
            let data = map.get("data").and_then(Value::as_str);

            if let (Some(mime), Some(data)) = (image_mime, data) {
                let saved = saver.save(data, mime)?;
                debug!("Rewrote mime_type/data pair → {}", saved.reference);
                map.insert("data".to_string(), Value::String(saved.reference.clone()));
                report.saved.push(saved);
            }

            for child in map.values_mut() {
                visit_child(child, saver, report)?;
            }
        }
        Value::Array(items) => {
            for child in items.iter_mut() {
                visit_child(child, saver, report)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn visit_child(child: &mut Value, saver: &PayloadSaver<'_>, report: &mut JsonRewrite) -> Result<(), B64Error> {
    if let Value::String(s) = child {
        match rewrite_string_value(s, saver) {
            StringRewrite::Replaced { value, saved } => {
                *child = Value::String(value);
                report.saved.push(saved);
            }
            StringRewrite::Skipped(skip) => report.skipped.push(skip),
            StringRewrite::Untouched => {}
        }
        return Ok(());
    }
    walk(child, saver, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::naming::NameSequence;
    use serde_json::json;
    use tempfile::TempDir;

    const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUg==";

    #[test]
    fn mime_type_data_pair_and_data_url_are_both_rewritten() {
        let tmp = TempDir::new().unwrap();
        let names = NameSequence::new();
        let saver = PayloadSaver::new(Some(&tmp.path().join("decoded")), &names);

        let mut doc = json!({
            "id": 7,
            "parts": [
                {"mime_type": "image/png", "data": PNG_B64, "caption": "a"},
                {"thumb": format!("data:image/png;base64,{PNG_B64}"), "n": 1.5}
            ],
            "ok": true
        });

        let report = rewrite_json(&mut doc, &saver).unwrap();
        assert_eq!(report.saved.len(), 2);

        let part0 = &doc["parts"][0];
        assert_eq!(part0["mime_type"], "image/png");
        assert_eq!(part0["data"], report.saved[0].reference.as_str());
        assert_eq!(part0["caption"], "a");
        assert_eq!(doc["parts"][1]["thumb"], report.saved[1].reference.as_str());
        assert_eq!(doc["parts"][1]["n"], 1.5);
        assert_eq!(doc["id"], 7);
    }

    #[test]
    fn key_order_is_preserved() {
        let tmp = TempDir::new().unwrap();
        let names = NameSequence::new();
        let saver = PayloadSaver::new(Some(tmp.path()), &names);

        let mut doc: Value = serde_json::from_str(&format!(
            r#"{{"z":1,"data":"{PNG_B64}","mime_type":"image/png","a":2}}"#
        ))
        .unwrap();
        rewrite_json(&mut doc, &saver).unwrap();

        let keys: Vec<&str> = doc.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "data", "mime_type", "a"]);
    }

    #[test]
    fn malformed_data_field_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let names = NameSequence::new();
        let saver = PayloadSaver::new(Some(tmp.path()), &names);

        let mut doc = json!({"mime_type": "image/png", "data": "not base64!"});
        let err = rewrite_json(&mut doc, &saver).unwrap_err();
        assert!(matches!(err, B64Error::MalformedBase64(_)));
    }

    #[test]
    fn malformed_data_url_string_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let names = NameSequence::new();
        let saver = PayloadSaver::new(Some(tmp.path()), &names);

        let original = "data:image/png;base64,@@@";
        let mut doc = json!({"list": [original, "keep"]});
        let report = rewrite_json(&mut doc, &saver).unwrap();

        assert_eq!(doc["list"][0], original);
        assert_eq!(doc["list"][1], "keep");
        assert_eq!(report.skipped.len(), 1);
    }

    #[test]
    fn non_image_mime_type_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let names = NameSequence::new();
        let saver = PayloadSaver::new(Some(tmp.path()), &names);

        let mut doc = json!({"mime_type": "application/pdf", "data": PNG_B64});
        let before = doc.clone();
        let report = rewrite_json(&mut doc, &saver).unwrap();
        assert_eq!(doc, before);
        assert!(report.saved.is_empty());
    }

    #[test]
    fn deeply_nested_arrays_are_walked() {
        let tmp = TempDir::new().unwrap();
        let names = NameSequence::new();
        let saver = PayloadSaver::new(Some(tmp.path()), &names);

        let mut doc = json!([[[[{"mime_type": "image/jpeg", "data": PNG_B64}]]]]);
        let report = rewrite_json(&mut doc, &saver).unwrap();
        assert_eq!(report.saved.len(), 1);
        assert!(report.saved[0].reference.ends_with(".jpg"));
    }
}
