const FENCE: &str = "```";

/// Remove markdown code fences a model may wrap its JSON in.
///
/// Strips one opening fence (with an optional language tag such as `json`)
/// at the very start, one closing fence at the very end, then any stray
/// fences left in the body, and finally trims whitespace. Idempotent.
pub fn strip_code_fences(text: &str) -> String {
    let mut body = text.trim_start();
    if let Some(rest) = body.strip_prefix(FENCE) {
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        body = rest[tag_len..].trim_start();
    }

    let mut body = body.trim_end();
    if let Some(rest) = body.strip_suffix(FENCE) {
        body = rest.trim_end();
    }

    body.replace(FENCE, "").trim().to_string()
}
