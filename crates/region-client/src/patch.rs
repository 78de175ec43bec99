//! Marker-delimited content substitution.
//!
//! A live region's output is wrapped in a pair of identical markers,
//! `<!-- name -->...<!-- name -->`. When the enclosing region is served from
//! cache, the content between the first pair of markers is swapped for
//! freshly rendered output.

/// Marker comment for a section name.
pub fn marker(name: &str) -> String {
    format!("<!-- {} -->", name)
}

/// Surround `html` with the markers of `name`.
pub fn wrap(html: &str, name: &str) -> String {
    let m = marker(name);
    format!("{m}{html}{m}")
}

/// Strip one surrounding marker pair of `name`, if present.
pub fn unwrap<'a>(html: &'a str, name: &str) -> &'a str {
    let m = marker(name);
    if html.len() >= 2 * m.len() {
        if let Some(inner) = html.strip_prefix(&m).and_then(|s| s.strip_suffix(&m)) {
            return inner;
        }
    }
    html
}

/// Replace the content between the first marker pair of `name` with `fresh`.
///
/// `fresh` may already be wrapped. When the pair is missing the cached HTML
/// is returned unchanged.
pub fn patch(cached: &str, fresh: &str, name: &str) -> String {
    let m = marker(name);

    let Some(start) = cached.find(&m) else {
        return cached.to_string();
    };
    let inner_start = start + m.len();
    let Some(len) = cached[inner_start..].find(&m) else {
        return cached.to_string();
    };
    let inner_end = inner_start + len;

    let mut html = String::with_capacity(cached.len() + fresh.len());
    html.push_str(&cached[..inner_start]);
    html.push_str(unwrap(fresh, name));
    html.push_str(&cached[inner_end..]);
    html
}
