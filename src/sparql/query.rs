//! SPARQL query templates per entity kind and endpoint
//!
//! The builder is a pure templating layer: identifiers are not validated and a
//! malformed IRI simply yields a query with zero rows. Every field the merger
//! may need is requested through `OPTIONAL` so that missing data never drops
//! the subject; only the mandatory pattern (`a owl:Thing` for people,
//! `rdfs:label` for places) can.

const PREFIXES: &str = "PREFIX dbo: <http://dbpedia.org/ontology/>
PREFIX dbp: <http://dbpedia.org/property/>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX foaf: <http://xmlns.com/foaf/0.1/>
PREFIX owl: <http://www.w3.org/2002/07/owl#>
PREFIX geo: <http://www.w3.org/2003/01/geo/wgs84_pos#>
PREFIX georss: <http://www.georss.org/georss/>
";

const WIKIDATA_PREFIXES: &str = "PREFIX wd: <http://www.wikidata.org/entity/>
PREFIX wdt: <http://www.wikidata.org/prop/direct/>
PREFIX p: <http://www.wikidata.org/prop/>
PREFIX psv: <http://www.wikidata.org/prop/statement/value/>
PREFIX wikibase: <http://wikiba.se/ontology#>
";

/// Subject variable of person queries
pub const PERSON_VAR: &str = "person";

/// Subject variable of place and position queries
pub const PLACE_VAR: &str = "place";

/// SPARQL query builder
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryBuilder;

impl QueryBuilder {
    /// Build a language filter accepting any of `languages` for `variable`
    ///
    /// Returns an empty string for an empty language list, leaving the
    /// endpoint default in place.
    ///
    /// ```
    /// use lodgeo::sparql::QueryBuilder;
    ///
    /// let languages = vec!["en".to_string(), "it".to_string()];
    /// let filter = QueryBuilder::lang_filter("?name", &languages);
    /// assert_eq!(filter, r#"FILTER(lang(?name)="en" || lang(?name)="it")"#);
    /// ```
    pub fn lang_filter(variable: &str, languages: &[String]) -> String {
        if languages.is_empty() {
            return String::new();
        }

        let clauses: Vec<String> = languages
            .iter()
            .map(|lang| format!("lang({variable})=\"{lang}\""))
            .collect();

        format!("FILTER({})", clauses.join(" || "))
    }

    /// Build the DBpedia person query
    ///
    /// Selects names, abstracts, birth and death data, depiction and the
    /// primary Wikipedia topic of `id`.
    pub fn build_person_query(id: &str, languages: &[String]) -> String {
        let name_filter = Self::lang_filter("?name", languages);
        let abstract_filter = Self::lang_filter("?abstract", languages);
        let birth_label_filter = Self::lang_filter("?birth_place_label", languages);
        let death_label_filter = Self::lang_filter("?death_place_label", languages);

        format!(
            "{PREFIXES}
SELECT DISTINCT ?{PERSON_VAR} ?name
  ?birth_date ?birth_place ?birth_place_label
  ?death_date ?death_place ?death_place_label
  ?topic ?depiction ?abstract
WHERE {{
  BIND(<{id}> AS ?{PERSON_VAR})
  ?{PERSON_VAR} a owl:Thing .
  OPTIONAL {{
    ?{PERSON_VAR} dbp:title ?name .
    {name_filter}
  }}
  OPTIONAL {{
    ?{PERSON_VAR} foaf:name ?name .
    {name_filter}
  }}
  OPTIONAL {{ ?{PERSON_VAR} dbo:birthDate ?birth_date . }}
  OPTIONAL {{ ?{PERSON_VAR} dbo:deathDate ?death_date . }}
  OPTIONAL {{ ?{PERSON_VAR} foaf:isPrimaryTopicOf ?topic . }}
  OPTIONAL {{ ?{PERSON_VAR} foaf:depiction ?depiction . }}
  OPTIONAL {{
    ?{PERSON_VAR} dbo:abstract ?abstract .
    {abstract_filter}
  }}
  OPTIONAL {{
    ?{PERSON_VAR} dbo:birthPlace ?birth_place .
    ?birth_place rdfs:label ?birth_place_label .
    {birth_label_filter}
  }}
  OPTIONAL {{
    ?{PERSON_VAR} dbo:deathPlace ?death_place .
    ?death_place rdfs:label ?death_place_label .
    {death_label_filter}
  }}
}}"
        )
    }

    /// Build the DBpedia place query
    ///
    /// Requests all three coordinate encodings (`lat`/`long`, `wkt`, `point`)
    /// so the resolver can fall back between them.
    pub fn build_place_query(id: &str, languages: &[String]) -> String {
        let label_filter = Self::lang_filter("?label", languages);
        let abstract_filter = Self::lang_filter("?abstract", languages);
        let description_filter = Self::lang_filter("?description", languages);

        format!(
            "{PREFIXES}
SELECT DISTINCT ?{PLACE_VAR} ?label ?abstract ?description
  ?lat ?long ?wkt ?point ?depiction ?topic
WHERE {{
  BIND(<{id}> AS ?{PLACE_VAR})
  ?{PLACE_VAR} rdfs:label ?label .
  {label_filter}
  OPTIONAL {{
    ?{PLACE_VAR} dbo:abstract ?abstract .
    {abstract_filter}
  }}
  OPTIONAL {{
    ?{PLACE_VAR} rdfs:comment ?description .
    {description_filter}
  }}
  OPTIONAL {{ ?{PLACE_VAR} geo:lat ?lat ; geo:long ?long . }}
  OPTIONAL {{ ?{PLACE_VAR} geo:geometry ?wkt . }}
  OPTIONAL {{ ?{PLACE_VAR} georss:point ?point . }}
  OPTIONAL {{ ?{PLACE_VAR} foaf:depiction ?depiction . }}
  OPTIONAL {{ ?{PLACE_VAR} foaf:isPrimaryTopicOf ?topic . }}
}}"
        )
    }

    /// Build the cheaper coordinates-only DBpedia query
    pub fn build_position_query(id: &str) -> String {
        format!(
            "{PREFIXES}
SELECT DISTINCT ?{PLACE_VAR} ?lat ?long ?wkt ?point
WHERE {{
  BIND(<{id}> AS ?{PLACE_VAR})
  OPTIONAL {{ ?{PLACE_VAR} geo:lat ?lat ; geo:long ?long . }}
  OPTIONAL {{ ?{PLACE_VAR} geo:geometry ?wkt . }}
  OPTIONAL {{ ?{PLACE_VAR} georss:point ?point . }}
}}"
        )
    }

    /// Build the Wikidata coordinates query for an entity id (`Q220`)
    ///
    /// Wikidata stores `P625` as a WKT literal; the decomposed latitude and
    /// longitude of the statement value are requested too.
    pub fn build_wikidata_position_query(qid: &str) -> String {
        format!(
            "{WIKIDATA_PREFIXES}
SELECT ?{PLACE_VAR} ?lat ?long ?wkt
WHERE {{
  BIND(wd:{qid} AS ?{PLACE_VAR})
  ?{PLACE_VAR} wdt:P625 ?wkt .
  OPTIONAL {{
    ?{PLACE_VAR} p:P625/psv:P625 ?coord_value .
    ?coord_value wikibase:geoLatitude ?lat ;
                 wikibase:geoLongitude ?long .
  }}
}}
LIMIT 1"
        )
    }

    /// Build the Wikidata crosswalk query for a GeoNames id (`3169070`)
    pub fn build_geonames_position_query(geonames_id: &str) -> String {
        format!(
            "{WIKIDATA_PREFIXES}
SELECT ?{PLACE_VAR} ?lat ?long ?wkt
WHERE {{
  ?{PLACE_VAR} wdt:P1566 \"{geonames_id}\" ;
         wdt:P625 ?wkt .
  OPTIONAL {{
    ?{PLACE_VAR} p:P625/psv:P625 ?coord_value .
    ?coord_value wikibase:geoLatitude ?lat ;
                 wikibase:geoLongitude ?long .
  }}
}}
LIMIT 1"
        )
    }
}
