//! RFC 3986 URI machinery (component B): a non-owning structural view of a
//! URI reference, parsing, §5.2.2 reference resolution, §5.3 merge-and-strip
//! serialisation, scheme detection and URI-to-path conversion.
//!
//! Every range borrows directly from the input string; nothing here
//! allocates except [`serialise`], which necessarily has to build a new
//! string. `Option::None` distinguishes an absent component from a present
//! but empty one (e.g. `file:///tmp` has an authority component present and
//! empty, while `tmp` has no authority component at all) — the role the
//! original C struct filled with a null `buf` pointer versus a zero `len`.

use crate::chars::{is_alpha, is_digit};
use crate::error::NotAFileUri;

/// A parsed (or resolved) URI reference, split into the six ranges RFC 3986
/// §3 names plus `path_base`, which only `resolve` populates (the prefix of
/// `base`'s path a relative reference's path must be merged onto).
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct UriView<'a> {
    pub scheme: &'a str,
    pub authority: Option<&'a str>,
    pub path_base: Option<&'a str>,
    pub path: &'a str,
    pub query: Option<&'a str>,
    /// Includes the leading `#`, matching the original reader's convention
    /// so `serialise` never has to special-case adding it back.
    pub fragment: Option<&'a str>,
}

impl<'a> UriView<'a> {
    pub const NULL: UriView<'static> = UriView {
        scheme: "",
        authority: None,
        path_base: None,
        path: "",
        query: None,
        fragment: None,
    };
}

/// RFC 3986 §3.1: `scheme ::= ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`.
pub fn string_has_scheme(s: &str) -> bool {
    let b = s.as_bytes();
    if b.is_empty() || !is_alpha(b[0]) {
        return false;
    }
    for &c in &b[1..] {
        match c {
            b':' => return true,
            b'+' | b'-' | b'.' => {}
            c if is_alpha(c) || is_digit(c) => {}
            _ => return false,
        }
    }
    false
}

/// Parses `s` as a URI reference, splitting it into borrowed ranges without
/// validating percent-encoding or character classes beyond what's needed to
/// find component boundaries (RFC 3986 §3).
pub fn parse(s: &str) -> UriView<'_> {
    let b = s.as_bytes();
    let mut pos;

    let scheme_end = if !b.is_empty() && is_alpha(b[0]) {
        let mut j = 1;
        let mut found = None;
        loop {
            match b.get(j) {
                None | Some(b'/') | Some(b'?') | Some(b'#') => break,
                Some(b':') => {
                    found = Some(j);
                    break;
                }
                Some(&c) if c == b'+' || c == b'-' || c == b'.' => j += 1,
                Some(&c) if is_alpha(c) || is_digit(c) => j += 1,
                _ => break,
            }
        }
        found
    } else {
        None
    };

    let scheme;
    if let Some(end) = scheme_end {
        scheme = &s[..end];
        pos = end + 1;
    } else {
        scheme = "";
        pos = 0;
    }

    let mut authority = None;
    if b[pos..].starts_with(b"//") {
        pos += 2;
        let start = pos;
        while pos < b.len() && !matches!(b[pos], b'/' | b'?' | b'#') {
            pos += 1;
        }
        authority = Some(&s[start..pos]);
    }

    let mut path = "";
    match b.get(pos) {
        Some(b'?') | Some(b'#') | None => {}
        _ => {
            let start = pos;
            while pos < b.len() && !matches!(b[pos], b'?' | b'#') {
                pos += 1;
            }
            path = &s[start..pos];
        }
    }

    let mut query = None;
    if b.get(pos) == Some(&b'?') {
        pos += 1;
        let start = pos;
        while pos < b.len() && b[pos] != b'#' {
            pos += 1;
        }
        query = Some(&s[start..pos]);
    }

    let fragment = if b.get(pos) == Some(&b'#') {
        Some(&s[pos..])
    } else {
        None
    };

    UriView {
        scheme,
        authority,
        path_base: None,
        path,
        query,
        fragment,
    }
}

/// RFC 3986 §5.2.2: resolves reference `r` against `base`, merging `r`'s
/// path onto `base`'s when `r` has no scheme of its own.
pub fn resolve<'a>(r: &UriView<'a>, base: &UriView<'a>) -> UriView<'a> {
    if !r.scheme.is_empty() {
        return UriView { path_base: None, ..*r };
    }

    let mut t = UriView::default();
    t.fragment = r.fragment;
    t.scheme = base.scheme;

    if r.authority.is_some() {
        t.authority = r.authority;
        t.path = r.path;
        t.query = r.query;
    } else {
        t.path = r.path;
        if r.path.is_empty() {
            t.path_base = Some(base.path);
            t.query = if r.query.is_some() { r.query } else { base.query };
        } else {
            if !r.path.starts_with('/') {
                t.path_base = Some(base.path);
            }
            t.query = r.query;
        }
        t.authority = base.authority;
    }

    t
}

/// RFC 3986 §5.3 (with the §5.2.3 dot-segment merge folded in): writes out
/// `uri`, merging `uri.path` onto `uri.path_base` when both are present and
/// stripping/collapsing `.`/`..` path segments as it goes.
pub fn serialise(uri: &UriView<'_>) -> String {
    let mut out = String::new();

    if !uri.scheme.is_empty() {
        out.push_str(uri.scheme);
        out.push(':');
    }
    if let Some(authority) = uri.authority {
        out.push_str("//");
        out.push_str(authority);
    }

    match uri.path_base {
        Some(path_base) if !path_base.is_empty() => {
            if uri.path.is_empty() && (uri.fragment.is_some() || uri.query.is_some()) {
                out.push_str(path_base);
            } else if !uri.path.is_empty() {
                merge_path(&mut out, path_base, uri.path);
            }
        }
        _ => out.push_str(uri.path),
    }

    if let Some(query) = uri.query {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = uri.fragment {
        out.push_str(fragment);
    }

    out
}

/// The dot-segment-merge-and-strip half of §5.3, split out of
/// [`serialise`] for readability: chops leading `./`, `../`, `.`, `..` and
/// collapsed `//` off `path`, counts how many trailing path_base segments
/// that implies walking back over, then writes `path_base`'s surviving
/// prefix followed by what's left of `path`.
fn merge_path(out: &mut String, path_base: &str, path: &str) {
    let pb = path_base.as_bytes();
    let pp = path.as_bytes();
    let mut begin = 0usize;
    let end = pp.len();
    let mut up = 1usize;

    loop {
        if begin >= end {
            break;
        }
        match pp[begin] {
            b'.' => match pp.get(begin + 1) {
                Some(b'/') => begin += 2,
                Some(b'.') => {
                    up += 1;
                    match pp.get(begin + 2) {
                        Some(b'/') => begin += 3,
                        _ => begin += 2,
                    }
                }
                _ => begin += 1,
            },
            b'/' if pp.get(begin + 1) == Some(&b'/') => begin += 1,
            _ => break,
        }
    }

    if !path_base.is_empty() {
        let mut base_last = pb.len() - 1;
        loop {
            if pb[base_last] == b'/' {
                up -= 1;
            }
            if up == 0 || base_last == 0 {
                break;
            }
            base_last -= 1;
        }
        let base_len = base_last + 1;
        out.push_str(&path_base[..base_len]);
    }

    out.push_str(&path[begin..end]);
}

/// Strips a `file://` (or bare `file:`) prefix off an absolute URI,
/// returning the filesystem path it names. Returns [`NotAFileUri`] for any
/// other absolute-URI scheme (relative references are assumed to already
/// be paths and are returned unchanged).
pub fn to_path(uri: &str) -> Result<&str, NotAFileUri> {
    if !string_has_scheme(uri) {
        return Ok(uri);
    }
    if let Some(rest) = uri.strip_prefix("file:") {
        if let Some(rest) = rest.strip_prefix("//") {
            Ok(rest)
        } else {
            Err(NotAFileUri(uri.to_string()))
        }
    } else {
        Err(NotAFileUri(uri.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_scheme() {
        assert!(string_has_scheme("http://example.org/"));
        assert!(string_has_scheme("file:///tmp/x"));
        assert!(!string_has_scheme("//example.org/"));
        assert!(!string_has_scheme("relative/path"));
        assert!(!string_has_scheme("123:notascheme"));
    }

    #[test]
    fn parse_full_uri() {
        let u = parse("http://a/b/c/d;p?q#f");
        assert_eq!(u.scheme, "http");
        assert_eq!(u.authority, Some("a"));
        assert_eq!(u.path, "/b/c/d;p");
        assert_eq!(u.query, Some("q"));
        assert_eq!(u.fragment, Some("#f"));
    }

    #[test]
    fn parse_relative_path_only() {
        let u = parse("../c");
        assert_eq!(u.scheme, "");
        assert_eq!(u.authority, None);
        assert_eq!(u.path, "../c");
    }

    // RFC 3986 §5.4.1 normal examples, base = http://a/b/c/d;p?q
    fn base() -> UriView<'static> {
        parse("http://a/b/c/d;p?q")
    }

    fn resolve_str(reference: &str) -> String {
        let base = base();
        let r = parse(reference);
        let t = resolve(&r, &base);
        serialise(&t)
    }

    #[test]
    fn resolve_examples() {
        assert_eq!(resolve_str("g:h"), "g:h");
        assert_eq!(resolve_str("g"), "http://a/b/c/g");
        assert_eq!(resolve_str("./g"), "http://a/b/c/g");
        assert_eq!(resolve_str("g/"), "http://a/b/c/g/");
        assert_eq!(resolve_str("/g"), "http://a/g");
        assert_eq!(resolve_str("//g"), "http://g");
        assert_eq!(resolve_str("?y"), "http://a/b/c/d;p?y");
        assert_eq!(resolve_str("g?y"), "http://a/b/c/g?y");
        assert_eq!(resolve_str("#s"), "http://a/b/c/d;p?q#s");
        assert_eq!(resolve_str("g#s"), "http://a/b/c/g#s");
        assert_eq!(resolve_str(""), "http://a/b/c/d;p?q");
        assert_eq!(resolve_str("."), "http://a/b/c/");
        assert_eq!(resolve_str("./"), "http://a/b/c/");
        assert_eq!(resolve_str(".."), "http://a/b/");
        assert_eq!(resolve_str("../"), "http://a/b/");
        assert_eq!(resolve_str("../g"), "http://a/b/g");
        assert_eq!(resolve_str("../.."), "http://a/");
        assert_eq!(resolve_str("../../g"), "http://a/g");
    }

    #[test]
    fn to_path_variants() {
        assert_eq!(to_path("file:///tmp/x.ttl").unwrap(), "/tmp/x.ttl");
        assert_eq!(to_path("relative.ttl").unwrap(), "relative.ttl");
        assert!(to_path("http://example.org/x.ttl").is_err());
        assert!(to_path("file:/tmp/x.ttl").is_err());
    }
}
