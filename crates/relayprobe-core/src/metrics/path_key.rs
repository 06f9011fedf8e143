//! Path-key normalization for metric labels.

/// Prefix applied when a key would be empty or start with `_`.
const ROOT_PREFIX: &str = "root";

/// Map a raw request path to its metrics grouping key.
///
/// ASCII letters, digits and `/` are kept; every other character (including
/// each non-ASCII character) becomes `_`. An empty result, or one starting
/// with `_`, gets the `root` prefix. The output is a fixed point:
/// `normalize_path(&normalize_path(p)) == normalize_path(p)`.
pub fn normalize_path(raw: &str) -> String {
    let mut key: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '/' { c } else { '_' })
        .collect();

    if key.is_empty() || key.starts_with('_') {
        key.insert_str(0, ROOT_PREFIX);
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_plain_paths() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/a/b"), "/a/b");
        assert_eq!(normalize_path("/health/live"), "/health/live");
    }

    #[test]
    fn replaces_everything_else() {
        assert_eq!(normalize_path("/a?b=1"), "/a_b_1");
        assert_eq!(normalize_path("/v1.2/x-y"), "/v1_2/x_y");
        // one underscore per character, not per byte
        assert_eq!(normalize_path("/caf\u{e9}"), "/caf_");
    }

    #[test]
    fn root_prefix() {
        assert_eq!(normalize_path(""), "root");
        assert_eq!(normalize_path("*"), "root_");
        assert_eq!(normalize_path(".well-known"), "root_well_known");
    }
}
