//! Origin comparison and the synchronous CORS probe.

use url::Url;

use crate::OriginProbe;

/// Resolves `href` against `document_href` and reports whether both share an origin.
///
/// Origins are compared in their serialized form, the way `anchor.origin` and
/// `location.origin` compare as strings: two opaque origins (a `file:` page and a
/// `file:` link) both serialize to `"null"` and count as the same. Unparseable input is
/// treated as cross-origin.
pub fn is_same_origin(document_href: &str, href: &str) -> bool {
    let Ok(base) = Url::parse(document_href) else {
        return false;
    };
    let Ok(resolved) = base.join(href) else {
        return false;
    };
    base.origin().ascii_serialization() == resolved.origin().ascii_serialization()
}

/// Issues a blocking HEAD request and reports whether the status is in `200..=299`.
///
/// Any failure counts as not permissive.
pub fn is_cors_enabled(probe: &dyn OriginProbe, url: &str) -> bool {
    match probe.head_status(url) {
        Ok(status) => {
            log::debug!("HEAD {url} -> {status}");
            (200..=299).contains(&status)
        }
        Err(err) => {
            log::debug!("HEAD {url} failed: {err}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct FixedProbe(HashMap<&'static str, Result<u16, String>>);

    impl OriginProbe for FixedProbe {
        fn head_status(&self, url: &str) -> Result<u16, String> {
            self.0
                .get(url)
                .cloned()
                .unwrap_or_else(|| Err("network error".to_string()))
        }
    }

    #[test]
    fn same_origin_matches_expected_cases() {
        let page = "https://app.example.com/reports/index.html";
        let cases = [
            ("/report.pdf", true),
            ("report.pdf", true),
            ("https://app.example.com:443/a", true),
            ("https://cdn.example.com/report.pdf", false),
            ("http://app.example.com/report.pdf", false),
            ("https://app.example.com:8443/report.pdf", false),
            ("data:text/plain,hi", false),
        ];
        for (href, expected) in cases {
            assert_eq!(is_same_origin(page, href), expected, "href={href:?}");
        }
    }

    #[test]
    fn file_pages_treat_file_links_as_same_origin() {
        let page = "file:///home/user/reports/index.html";
        let cases = [
            ("report.pdf", true),
            ("/tmp/report.pdf", true),
            ("file:///etc/report.pdf", true),
            ("https://app.example.com/report.pdf", false),
        ];
        for (href, expected) in cases {
            assert_eq!(is_same_origin(page, href), expected, "href={href:?}");
        }
    }

    #[test]
    fn unresolvable_document_is_never_same_origin() {
        assert!(!is_same_origin("about:blank", "/report.pdf"));
        assert!(!is_same_origin("not a url", "/report.pdf"));
    }

    #[test]
    fn cors_probe_accepts_only_success_statuses() {
        let probe = FixedProbe(HashMap::from([
            ("https://a/ok", Ok(200)),
            ("https://a/edge", Ok(299)),
            ("https://a/redirect", Ok(300)),
            ("https://a/opaque", Ok(0)),
            ("https://a/missing", Ok(404)),
        ]));

        assert!(is_cors_enabled(&probe, "https://a/ok"));
        assert!(is_cors_enabled(&probe, "https://a/edge"));
        assert!(!is_cors_enabled(&probe, "https://a/redirect"));
        assert!(!is_cors_enabled(&probe, "https://a/opaque"));
        assert!(!is_cors_enabled(&probe, "https://a/missing"));
        assert!(!is_cors_enabled(&probe, "https://a/unknown"));
    }
}
