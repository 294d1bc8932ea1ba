//! Common helpers shared by the LOD services

use crate::sparql::RdfTerm;

/// Language assumed for terms without a tag
pub const DEFAULT_LANGUAGE: &str = "en";

/// Last path segment of `uri`
///
/// Returns the input unchanged when it has no `/`.
///
/// ```
/// use lodgeo::utils::id_from_uri;
///
/// assert_eq!(id_from_uri("http://www.wikidata.org/entity/Q220"), "Q220");
/// assert_eq!(id_from_uri("Q220"), "Q220");
/// ```
pub fn id_from_uri(uri: &str) -> &str {
    match uri.rfind('/') {
        Some(i) => &uri[i + 1..],
        None => uri,
    }
}

/// Language tag of each term, untagged terms counting as [`DEFAULT_LANGUAGE`]
pub fn languages_of(terms: &[RdfTerm]) -> Vec<String> {
    terms
        .iter()
        .map(|t| t.lang().unwrap_or(DEFAULT_LANGUAGE).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_uri() {
        assert_eq!(id_from_uri("http://dbpedia.org/resource/Rome"), "Rome");
        assert_eq!(id_from_uri("http://sws.geonames.org/3169070/"), "");
        assert_eq!(id_from_uri(""), "");
    }

    #[test]
    fn test_languages_of() {
        let terms = vec![
            RdfTerm::lang_literal("Roma", "it"),
            RdfTerm::literal("Rome"),
            RdfTerm::lang_literal("Rom", "de"),
        ];
        assert_eq!(languages_of(&terms), vec!["it", "en", "de"]);
        assert!(languages_of(&[]).is_empty());
    }
}
