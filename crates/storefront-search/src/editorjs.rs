use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

/// Plain text of an EditorJS document: block texts and list items with
/// markup removed, joined by single spaces.
pub fn clean_editor_js_text(definitions: &Value) -> String {
    let Some(blocks) = definitions.get("blocks").and_then(Value::as_array) else {
        return String::new();
    };

    let mut plain_text = Vec::new();
    for block in blocks {
        let Some(data) = block.get("data").and_then(Value::as_object) else {
            continue;
        };

        if block.get("type").and_then(Value::as_str) == Some("list") {
            let items = data.get("items").and_then(Value::as_array);
            for item in items.into_iter().flatten() {
                if let Some(text) = item.as_str().filter(|text| !text.is_empty()) {
                    plain_text.push(strip_tags(text));
                }
            }
        } else if let Some(text) = data
            .get("text")
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
        {
            plain_text.push(strip_tags(text));
        }
    }

    plain_text.join(" ")
}

fn strip_tags(text: &str) -> String {
    TAG.replace_all(text, "")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
