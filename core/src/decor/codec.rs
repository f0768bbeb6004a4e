//! Slot encoding — the compact persisted form of the cooldown map.
//!
//! Format contract: live entries are encoded as `id,expirySeconds` pairs
//! joined by `|`, and the whole string is percent-encoded. The delimiters
//! are part of the contract, which is why marker ids may not contain `|`
//! or `,`. Expiries are stored at second resolution.
//!
//! Decoding is forgiving: a bad segment is dropped on its own, and a value
//! that can't be decoded at all yields an empty map. Nothing here can fail
//! the caller.

use std::collections::HashMap;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except the characters `encodeURIComponent` leaves alone.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');


/// Encode the live entries of a cooldown map.
///
/// Entries whose expiry is at or before `now_ms` are left out. Pairs are
/// sorted by id so the same state always encodes to the same string.
pub fn encode(entries: &HashMap<String, u64>, now_ms: u64) -> String {
    let mut parts: Vec<String> = entries
        .iter()
        .filter(|(_, &exp_ms)| exp_ms > now_ms)
        .map(|(id, exp_ms)| format!("{},{}", id, exp_ms / 1000))
        .collect();
    parts.sort();
    utf8_percent_encode(&parts.join("|"), COMPONENT).to_string()
}


/// Decode a persisted slot value into an `id → expiry ms` map.
pub fn decode(raw: &str) -> HashMap<String, u64> {
    let mut entries = HashMap::new();
    if raw.trim().is_empty() {
        return entries;
    }

    let decoded = match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::warn!("cooldown slot is not valid text, starting empty: {}", e);
            return entries;
        }
    };

    for part in decoded.split('|') {
        let Some((id, sec)) = part.split_once(',') else {
            tracing::debug!("dropping slot segment without delimiter: {:?}", part);
            continue;
        };
        if id.is_empty() {
            continue;
        }
        // The slot is user-forgeable: a huge seconds value may parse but
        // overflow the ms conversion, so that segment is dropped too.
        match sec.parse::<u64>().ok().and_then(|s| s.checked_mul(1000)) {
            Some(exp_ms) => {
                entries.insert(id.to_string(), exp_ms);
            }
            None => {
                tracing::debug!("dropping slot segment with bad expiry: {:?}", part);
            }
        }
    }
    entries
}
