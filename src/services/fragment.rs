use serde::Deserialize;

/// Event-stream marker some upstream deployments prefix each line with.
const EVENT_PREFIX: &str = "data:";

/// One decoded increment of generated text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamFragment {
    pub text: String,
    /// Upstream reported that generation finished.
    pub done: bool,
}

/// Wire shape of one upstream line. Unknown fields (model, timings...) are ignored.
#[derive(Debug, Deserialize)]
struct UpstreamLine {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Decode one framed line into a text fragment.
///
/// Blank lines decode to an empty fragment. Anything else must be JSON after
/// the optional `data:` prefix; a line that is not is a protocol violation.
pub fn decode_fragment(line: &str) -> Result<StreamFragment, FragmentError> {
    let line = line.trim();
    let payload = line.strip_prefix(EVENT_PREFIX).unwrap_or(line).trim_start();
    if payload.is_empty() {
        return Ok(StreamFragment::default());
    }

    let parsed: UpstreamLine =
        serde_json::from_str(payload).map_err(|source| FragmentError::Malformed {
            line: truncate(payload, 200),
            source,
        })?;

    if let Some(message) = parsed.error {
        return Err(FragmentError::Upstream(message));
    }

    Ok(StreamFragment {
        text: parsed.response.unwrap_or_default(),
        done: parsed.done,
    })
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FragmentError {
    #[error("Malformed upstream line `{line}`: {source}")]
    Malformed {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Upstream model reported an error: {0}")]
    Upstream(String),
}
