//! Fallback markup for regions whose own template failed.

/// Simple HTML escape for user-facing messages.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Render an error list as section error blocks.
pub fn error_markup(messages: &[String]) -> String {
    messages
        .iter()
        .map(|m| format!(r#"<div class="section-error">{}</div>"#, html_escape(m)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_error_markup() {
        let html = error_markup(&["Item <b>gone</b>".to_string(), "Try again".to_string()]);
        assert_eq!(
            html,
            r#"<div class="section-error">Item &lt;b&gt;gone&lt;/b&gt;</div><div class="section-error">Try again</div>"#
        );
        assert_eq!(error_markup(&[]), "");
    }
}
