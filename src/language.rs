//! Language tag normalisation and capability resolution.
//!
//! OCR engines index their recognition capabilities by base language
//! subtag (`ko`, `en`, `ja`), while users habitually pass region-qualified
//! BCP-47 tags (`ko-KR`, `en-US`). [`normalize_tag`] reduces a
//! user-supplied tag to the form engines index by; [`resolve`] then
//! validates the normalised tag against the engine's installed capability
//! set, failing fast — before any page is processed — when nothing matches.
//!
//! Chinese is the one script-qualified exception: `zh-CN` means Simplified
//! (`zh-Hans`) and `zh-TW` Traditional (`zh-Hant`), so those region tags
//! map to script tags rather than collapsing to a bare `zh`.

use crate::error::ExtractError;

/// Region tags that map to something other than their bare base subtag.
const LANGUAGE_MAP: &[(&str, &str)] = &[
    ("ko-kr", "ko"),
    ("ko", "ko"),
    ("en-us", "en"),
    ("en", "en"),
    ("ja-jp", "ja"),
    ("ja", "ja"),
    ("zh-cn", "zh-Hans"),
    ("zh-hans", "zh-Hans"),
    ("zh-tw", "zh-Hant"),
    ("zh-hant", "zh-Hant"),
];

/// Reduce a BCP-47-style tag to the form OCR engines index by.
///
/// Underscores are treated as hyphens (`en_US` == `en-US`), lookup is
/// case-insensitive, and unknown region-qualified tags fall back to their
/// lowercased base subtag (`pt-BR` → `pt`).
pub fn normalize_tag(tag: &str) -> String {
    let canonical = tag.trim().replace('_', "-");
    let key = canonical.to_lowercase();
    if let Some((_, mapped)) = LANGUAGE_MAP.iter().find(|(k, _)| *k == key) {
        return (*mapped).to_string();
    }
    if let Some((base, _)) = canonical.split_once('-') {
        return base.to_lowercase();
    }
    canonical.to_lowercase()
}

/// Resolve a user-supplied tag against the engine's installed capability
/// set, returning the installed tag to recognise with.
///
/// Matching is case-insensitive: first by exact normalised tag, then by
/// base language subtag (so `ko-KR` resolves to an installed `ko`, and a
/// region-qualified installed tag satisfies a bare base request). The
/// base-subtag fallback never crosses a script boundary: `zh-Hans` and
/// `zh-Hant` share a base subtag but are different writing systems, so a
/// Simplified request with only Traditional installed fails rather than
/// silently recognising with the wrong script. Fails with
/// [`ExtractError::UnsupportedLanguage`] carrying the original tag and
/// the installed list for the remediation message.
pub fn resolve(tag: &str, installed: &[String]) -> Result<String, ExtractError> {
    let normalized = normalize_tag(tag);

    // Exact match against installed tags.
    if let Some(found) = installed
        .iter()
        .find(|cap| cap.eq_ignore_ascii_case(&normalized))
    {
        return Ok(found.clone());
    }

    // Base-subtag match: an installed `ko` satisfies `ko-KR`, and an
    // installed `en-US` satisfies `en`. When both sides carry a script
    // subtag, the scripts must agree.
    let (base, script) = split_tag(&normalized);
    if let Some(found) = installed.iter().find(|cap| {
        let (cap_base, cap_script) = split_tag(cap);
        if !cap_base.eq_ignore_ascii_case(base) {
            return false;
        }
        match (script, cap_script) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => true,
        }
    }) {
        return Ok(found.clone());
    }

    Err(ExtractError::UnsupportedLanguage {
        requested: tag.to_string(),
        normalized,
        installed: installed.to_vec(),
    })
}

/// Split a tag into its base language subtag and optional script subtag.
///
/// Script subtags are exactly four letters (`Hans`, `Hant`); two-letter
/// region subtags (`KR`, `US`) are not scripts and are ignored here.
fn split_tag(tag: &str) -> (&str, Option<&str>) {
    let mut parts = tag.split('-');
    let base = parts.next().unwrap_or(tag);
    let script = parts
        .next()
        .filter(|s| s.len() == 4 && s.chars().all(|c| c.is_ascii_alphabetic()));
    (base, script)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn known_region_tags_map_to_base() {
        assert_eq!(normalize_tag("ko-KR"), "ko");
        assert_eq!(normalize_tag("en-US"), "en");
        assert_eq!(normalize_tag("ja-JP"), "ja");
    }

    #[test]
    fn chinese_regions_map_to_script_tags() {
        assert_eq!(normalize_tag("zh-CN"), "zh-Hans");
        assert_eq!(normalize_tag("zh-TW"), "zh-Hant");
        assert_eq!(normalize_tag("zh-Hant"), "zh-Hant");
    }

    #[test]
    fn underscores_and_case_are_tolerated() {
        assert_eq!(normalize_tag("en_us"), "en");
        assert_eq!(normalize_tag(" KO-kr "), "ko");
    }

    #[test]
    fn unknown_region_tag_strips_to_base() {
        assert_eq!(normalize_tag("pt-BR"), "pt");
        assert_eq!(normalize_tag("de"), "de");
    }

    #[test]
    fn resolves_region_tag_against_base_capability() {
        let resolved = resolve("ko-KR", &caps(&["en", "ko"])).unwrap();
        assert_eq!(resolved, "ko");
    }

    #[test]
    fn resolves_base_request_against_qualified_capability() {
        let resolved = resolve("en", &caps(&["en-US"])).unwrap();
        assert_eq!(resolved, "en-US");
    }

    #[test]
    fn exact_match_wins_over_base_match() {
        let resolved = resolve("zh-CN", &caps(&["zh-Hant", "zh-Hans"])).unwrap();
        assert_eq!(resolved, "zh-Hans");
    }

    #[test]
    fn simplified_request_never_resolves_to_traditional() {
        let err = resolve("zh-CN", &caps(&["zh-Hant"])).unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedLanguage { .. }));
    }

    #[test]
    fn traditional_request_never_resolves_to_simplified() {
        let err = resolve("zh-TW", &caps(&["en", "zh-Hans"])).unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedLanguage { .. }));
    }

    #[test]
    fn script_request_accepts_unscripted_capability() {
        // An installed bare `zh` carries no script claim, so either
        // script-qualified request may use it.
        let resolved = resolve("zh-CN", &caps(&["zh"])).unwrap();
        assert_eq!(resolved, "zh");
    }

    #[test]
    fn unsupported_tag_errors_with_installed_list() {
        let err = resolve("xx-XX", &caps(&["en", "ko"])).unwrap_err();
        match err {
            ExtractError::UnsupportedLanguage {
                requested,
                normalized,
                installed,
            } => {
                assert_eq!(requested, "xx-XX");
                assert_eq!(normalized, "xx");
                assert_eq!(installed, caps(&["en", "ko"]));
            }
            other => panic!("expected UnsupportedLanguage, got {other:?}"),
        }
    }
}
