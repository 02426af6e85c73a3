pub(crate) fn now_ms() -> i64 {
    js_sys::Date::now().round() as i64
}

/// Uniform sample in `[0, 1)`; falls back to the midpoint if the entropy source is unavailable.
pub(crate) fn random_unit() -> f64 {
    let mut buf = [0u8; 8];
    if getrandom::getrandom(&mut buf).is_err() {
        return 0.5;
    }
    unit_from_bytes(buf)
}

pub(crate) fn unit_from_bytes(buf: [u8; 8]) -> f64 {
    // 53 significant bits fit an f64 mantissa exactly.
    let bits = u64::from_le_bytes(buf) >> 11;
    bits as f64 / (1u64 << 53) as f64
}

/// Extracts the profile identifier from a shared link.
///
/// Accepts full profile URLs (`https://bonjour.bio/alice/?ref=x`) as well as bare identifiers.
pub(crate) fn identifier_from_link(link: &str) -> String {
    let link = link.trim();
    let without_scheme = link
        .strip_prefix("https://")
        .or_else(|| link.strip_prefix("http://"));

    let path = match without_scheme {
        Some(rest) => rest.split_once('/').map(|(_, p)| p).unwrap_or(""),
        None => link,
    };

    let path = path.split(['?', '#']).next().unwrap_or("");
    path.trim_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_from_bytes_range() {
        assert_eq!(unit_from_bytes([0; 8]), 0.0);
        let max = unit_from_bytes([0xff; 8]);
        assert!(max < 1.0);
        assert!(max > 0.999);
    }

    #[test]
    fn test_identifier_from_link() {
        assert_eq!(identifier_from_link("https://bonjour.bio/rabithua"), "rabithua");
        assert_eq!(identifier_from_link("https://bonjour.bio/alice/"), "alice");
        assert_eq!(identifier_from_link("http://bonjour.bio/bob?ref=nfc#x"), "bob");
        assert_eq!(identifier_from_link("  carol "), "carol");
        assert_eq!(identifier_from_link("https://bonjour.bio"), "");
        assert_eq!(identifier_from_link(""), "");
    }
}
