//! Cleanup of raw interpreter output.

const HEADER_PREFIX: &str = "content-type:";

/// Strip the MIME header `php-cgi` may prepend to stdout.
///
/// When the first 13 characters match `content-type:` (ignoring ASCII case),
/// the first line is dropped and the remaining lines are rejoined with `\n`.
/// Anything else, including empty output, is returned unchanged.
pub fn strip_content_type_header(raw: &str) -> String {
    let has_header = raw
        .get(..HEADER_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(HEADER_PREFIX));
    if !has_header {
        return raw.to_string();
    }
    raw.lines().skip(1).collect::<Vec<_>>().join("\n")
}
