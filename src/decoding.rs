use crate::error::{RepartitionError, Result};
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const BYTE_ORDER_MARK: char = '\u{feff}';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum TextEncoding {
    #[schemars(description = "UTF-8, with a leading byte-order mark removed when present")]
    Utf8Sig,

    #[schemars(description = "ISO-8859-1: every byte maps to the code point of the same value")]
    Latin1,

    #[schemars(description = "Strict UTF-8")]
    Utf8,
}

impl TextEncoding {
    pub const DEFAULT_CANDIDATES: [TextEncoding; 3] =
        [TextEncoding::Utf8Sig, TextEncoding::Latin1, TextEncoding::Utf8];

    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8Sig => {
                let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
                std::str::from_utf8(bytes).ok().map(str::to_string)
            }
            TextEncoding::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
            TextEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_string),
        }
    }
}

/// Decodes raw report bytes with the first candidate encoding that succeeds,
/// then removes any byte-order marks left in the text.
pub fn decode_report(bytes: &[u8], candidates: &[TextEncoding]) -> Result<String> {
    for encoding in candidates {
        if let Some(text) = encoding.decode(bytes) {
            debug!("Decoded {} bytes as {:?}", bytes.len(), encoding);
            return Ok(text.replace(BYTE_ORDER_MARK, ""));
        }
        debug!("Report is not valid {:?}", encoding);
    }

    Err(RepartitionError::Decode {
        tried: candidates
            .iter()
            .map(|e| format!("{:?}", e))
            .collect::<Vec<_>>()
            .join(", "),
    })
}
