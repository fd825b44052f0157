//! Anchor record text format
//!
//! A record is a set of `key:value` lines; the anchor lives under `last`.
//! Writers only ever produce `last:<n>\n`, but readers tolerate extra keys
//! so the record stays extensible.

/// Key under which the anchor is stored
pub const ANCHOR_KEY: &str = "last";

/// Render the record for `anchor`
pub fn render_record(anchor: u64) -> String {
    format!("{}:{}\n", ANCHOR_KEY, anchor)
}

/// Extract the anchor from record text.
///
/// An empty record means the source has never been scanned and reads as 0.
pub fn parse_record(contents: &str) -> Result<u64, String> {
    if contents.trim().is_empty() {
        return Ok(0);
    }

    for line in contents.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        if key.trim() == ANCHOR_KEY {
            return value
                .trim()
                .parse::<u64>()
                .map_err(|e| format!("invalid '{}' value '{}': {}", ANCHOR_KEY, value.trim(), e));
        }
    }

    Err(format!("no '{}' entry in record", ANCHOR_KEY))
}
