//! Media-type selection among the variants registered for one route.
//!
//! Matching is exact string comparison after trimming surrounding
//! whitespace: no wildcards, no parameters, no quality values.

use axum::http::HeaderMap;

use super::registry::{NegotiationHeader, Variant};

/// The declared media type from `header`, if present and non-empty.
pub fn declared_media_type(headers: &HeaderMap, header: NegotiationHeader) -> Option<&str> {
    headers
        .get(header.header_name())
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Pick the candidate whose media type equals `declared`, falling back to
/// the candidate without a media type. `None` means no variant applies.
pub fn match_media_type<'a>(candidates: &'a [Variant], declared: Option<&str>) -> Option<&'a Variant> {
    declared
        .and_then(|declared| {
            candidates
                .iter()
                .find(|variant| variant.media_type == Some(declared))
        })
        .or_else(|| candidates.iter().find(|variant| variant.media_type.is_none()))
}

#[cfg(test)]
mod tests {
    use axum::http::header::ACCEPT;
    use axum::http::HeaderValue;
    use tourline_core::representation::RepresentationShape;

    use super::*;
    use crate::negotiation::registry::TourOperation;

    fn variant(name: &'static str, media_type: Option<&'static str>) -> Variant {
        Variant {
            name,
            media_type,
            operation: TourOperation::Read(RepresentationShape::FLAT),
            policies: Vec::new(),
        }
    }

    #[test]
    fn exact_match_wins_over_default() {
        let candidates = [variant("default", None), variant("flat", Some("application/x.flat"))];
        let chosen = match_media_type(&candidates, Some("application/x.flat")).unwrap();
        assert_eq!(chosen.name, "flat");
    }

    #[test]
    fn absent_or_unknown_type_falls_back_to_default() {
        let candidates = [variant("default", None), variant("flat", Some("application/x.flat"))];
        assert_eq!(match_media_type(&candidates, None).unwrap().name, "default");
        assert_eq!(
            match_media_type(&candidates, Some("text/html")).unwrap().name,
            "default"
        );
    }

    #[test]
    fn no_default_means_no_match() {
        let candidates = [variant("flat", Some("application/x.flat"))];
        assert!(match_media_type(&candidates, Some("application/json")).is_none());
        assert!(match_media_type(&candidates, None).is_none());
    }

    #[test]
    fn matching_is_exact() {
        let candidates = [variant("flat", Some("application/x.flat"))];
        assert!(match_media_type(&candidates, Some("application/*")).is_none());
        assert!(match_media_type(&candidates, Some("application/x.flat; q=0.9")).is_none());
        assert!(match_media_type(&candidates, Some("APPLICATION/X.FLAT")).is_none());
    }

    #[test]
    fn declared_type_is_trimmed_and_empty_is_absent() {
        let mut headers = HeaderMap::new();
        assert_eq!(declared_media_type(&headers, NegotiationHeader::Accept), None);

        headers.insert(ACCEPT, HeaderValue::from_static("  application/x.flat "));
        assert_eq!(
            declared_media_type(&headers, NegotiationHeader::Accept),
            Some("application/x.flat")
        );

        headers.insert(ACCEPT, HeaderValue::from_static(""));
        assert_eq!(declared_media_type(&headers, NegotiationHeader::Accept), None);
    }
}
