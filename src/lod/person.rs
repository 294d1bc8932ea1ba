//! Person facts from DBpedia

use std::sync::Arc;

use super::fetch_cached;
use crate::cache::LodCache;
use crate::lookup::{LookupError, SparqlSource};
use crate::sparql::query::PERSON_VAR;
use crate::sparql::{PersonInfo, QueryBuilder, TermMerger};

/// Cache key prefix of raw person results
pub const PERSON_PREFIX: &str = "person.";

/// Cache key of the person result for `id` in `languages`
pub fn person_key(id: &str, languages: &[String]) -> String {
    if languages.is_empty() {
        format!("{PERSON_PREFIX}{id}")
    } else {
        format!("{PERSON_PREFIX}{id}:{}", languages.join(","))
    }
}

/// Looks up people
#[derive(Clone)]
pub struct PersonService {
    source: Arc<dyn SparqlSource>,
    cache: Arc<LodCache>,
}

impl std::fmt::Debug for PersonService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersonService")
            .field("source", &self.source.name())
            .finish_non_exhaustive()
    }
}

impl PersonService {
    pub fn new(source: Arc<dyn SparqlSource>, cache: Arc<LodCache>) -> Self {
        Self { source, cache }
    }

    /// Facts about the person `id`
    ///
    /// `languages` restricts labels and abstracts; the first entry is also the
    /// preferred language for single-valued fields. Returns `None` when the
    /// endpoint knows nothing about `id`.
    pub async fn get_info(
        &self,
        id: &str,
        languages: &[String],
    ) -> Result<Option<PersonInfo>, LookupError> {
        let key = person_key(id, languages);
        let query = QueryBuilder::build_person_query(id, languages);

        let Some(result) = fetch_cached(&self.cache, self.source.as_ref(), &key, &query).await?
        else {
            return Ok(None);
        };

        let preferred = languages.first().map(String::as_str);
        Ok(TermMerger::merge_person(&result, PERSON_VAR, preferred))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_key() {
        let id = "http://dbpedia.org/resource/Dante_Alighieri";
        assert_eq!(
            person_key(id, &[]),
            "person.http://dbpedia.org/resource/Dante_Alighieri"
        );
        assert_eq!(
            person_key(id, &["en".to_string(), "it".to_string()]),
            "person.http://dbpedia.org/resource/Dante_Alighieri:en,it"
        );
    }
}
