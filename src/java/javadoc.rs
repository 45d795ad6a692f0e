//! Doc comment cleanup.

use std::sync::LazyLock;

use regex::Regex;

static INLINE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{@(?:code|literal|link|linkplain|value)\s+([^}]*)\}").expect("valid regex")
});

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[a-zA-Z][^>]*>").expect("valid regex"));

/// Turn the raw body of a `/** ... */` comment into a one-paragraph description.
///
/// Leading `*` gutters are removed, inline tags are replaced by their text,
/// block tags (`@param`, `@deprecated`, ...) end the description and
/// whitespace is collapsed. Returns `None` when nothing is left.
pub fn clean_doc(raw: &str) -> Option<String> {
    let mut lines = Vec::new();
    for line in raw.lines() {
        let line = line.trim_start();
        let line = line.strip_prefix('*').unwrap_or(line).trim();
        if line.starts_with('@') {
            break;
        }
        lines.push(line);
    }

    let text = lines.join(" ");
    let text = INLINE_TAG.replace_all(&text, |caps: &regex::Captures| {
        let body = caps[1].trim();
        // {@link Foo#bar label} renders the label
        match body.split_once(char::is_whitespace) {
            Some((_, label)) if caps[0].starts_with("{@link") => label.trim().to_string(),
            _ => body.to_string(),
        }
    });
    let text = HTML_TAG.replace_all(&text, " ");

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_doc_strips_gutters_and_tags() {
        let raw = "\n     * Connection timeout, see {@code Duration}.\n     * <p>\n     * Applies to {@link Client#connect the client}.\n     * @see Other\n     ";
        assert_eq!(
            clean_doc(raw).as_deref(),
            Some("Connection timeout, see Duration. Applies to the client.")
        );
    }

    #[test]
    fn test_clean_doc_empty() {
        assert_eq!(clean_doc("  *  \n  * @deprecated use x"), None);
        assert_eq!(clean_doc(" Lowest. ").as_deref(), Some("Lowest."));
    }
}
