//! Folding of SPARQL result rows into typed records
//!
//! A subject usually appears in several rows because each multi-valued
//! `OPTIONAL` join multiplies the result (one row per language variant, per
//! depiction, ...). The merger walks all rows and applies one policy per
//! field:
//!
//! - subject URI: first row carrying it wins and is never overwritten
//! - sets (names, labels, abstracts): one entry per distinct language tag
//! - single values: replaced by every later row carrying the field, unless
//!   the running value already has the preferred language

use serde::{Deserialize, Serialize};

use super::{Binding, QueryResult, RdfTerm};
use crate::geo::{CoordinateResolver, GeoPoint};
use crate::utils::{id_from_uri, languages_of};

/// Record built from the rows of one result
pub trait InfoRecord: Default {
    /// Current subject URI
    fn uri(&self) -> Option<&str>;

    /// Set the subject URI
    fn set_uri(&mut self, uri: String);

    /// Absorb the non-subject fields of one row
    fn absorb(&mut self, binding: &Binding, preferred_lang: Option<&str>);
}

/// Facts about a person
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonInfo {
    pub uri: Option<String>,
    pub names: Vec<RdfTerm>,
    pub abstracts: Vec<RdfTerm>,
    pub birth_date: Option<RdfTerm>,
    pub birth_place: Option<RdfTerm>,
    pub birth_place_label: Option<RdfTerm>,
    pub death_date: Option<RdfTerm>,
    pub death_place: Option<RdfTerm>,
    pub death_place_label: Option<RdfTerm>,
    pub depiction: Option<RdfTerm>,
    pub topic: Option<RdfTerm>,
}

impl PersonInfo {
    /// Last path segment of the subject URI
    pub fn short_id(&self) -> Option<&str> {
        self.uri.as_deref().map(id_from_uri)
    }

    /// Languages the abstracts are available in
    pub fn abstract_languages(&self) -> Vec<String> {
        languages_of(&self.abstracts)
    }
}

impl InfoRecord for PersonInfo {
    fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    fn set_uri(&mut self, uri: String) {
        self.uri = Some(uri);
    }

    fn absorb(&mut self, binding: &Binding, preferred_lang: Option<&str>) {
        TermMerger::add_term(binding, "name", &mut self.names);
        TermMerger::add_term(binding, "abstract", &mut self.abstracts);

        let single = [
            ("birth_date", &mut self.birth_date),
            ("birth_place", &mut self.birth_place),
            ("birth_place_label", &mut self.birth_place_label),
            ("death_date", &mut self.death_date),
            ("death_place", &mut self.death_place),
            ("death_place_label", &mut self.death_place_label),
            ("depiction", &mut self.depiction),
            ("topic", &mut self.topic),
        ];
        for (name, term) in single {
            TermMerger::replace_term(binding, name, preferred_lang, term);
        }
    }
}

/// Facts about a place
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceInfo {
    pub uri: Option<String>,
    pub labels: Vec<RdfTerm>,
    pub abstracts: Vec<RdfTerm>,
    pub descriptions: Vec<RdfTerm>,
    pub depiction: Option<RdfTerm>,
    pub topic: Option<RdfTerm>,

    /// Coordinates resolved from any of the supported encodings
    ///
    /// Filled by [`TermMerger::merge_place`]; the generic fold leaves it empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<GeoPoint>,
}

impl InfoRecord for PlaceInfo {
    fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    fn set_uri(&mut self, uri: String) {
        self.uri = Some(uri);
    }

    fn absorb(&mut self, binding: &Binding, preferred_lang: Option<&str>) {
        TermMerger::add_term(binding, "label", &mut self.labels);
        TermMerger::add_term(binding, "abstract", &mut self.abstracts);
        TermMerger::add_term(binding, "description", &mut self.descriptions);

        TermMerger::replace_term(binding, "depiction", preferred_lang, &mut self.depiction);
        TermMerger::replace_term(binding, "topic", preferred_lang, &mut self.topic);
    }
}

/// Stateless merge policies
#[derive(Debug, Clone, Copy, Default)]
pub struct TermMerger;

impl TermMerger {
    /// Fold all rows of `result` into a record
    ///
    /// Returns `None` when the result has no rows; callers treat "no rows"
    /// and "no match" the same way.
    pub fn merge_bindings<T: InfoRecord>(
        result: &QueryResult,
        subject_var: &str,
        preferred_lang: Option<&str>,
    ) -> Option<T> {
        if result.is_empty() {
            return None;
        }

        let mut info = T::default();
        for binding in result.bindings() {
            if info.uri().is_none() {
                if let Some(subject) = binding.get(subject_var) {
                    info.set_uri(subject.value.clone());
                }
            }
            info.absorb(binding, preferred_lang);
        }

        Some(info)
    }

    /// Fold a person query result
    pub fn merge_person(
        result: &QueryResult,
        subject_var: &str,
        preferred_lang: Option<&str>,
    ) -> Option<PersonInfo> {
        Self::merge_bindings(result, subject_var, preferred_lang)
    }

    /// Fold a place query result, resolving its point with `resolver`
    ///
    /// Coordinates carry no language tag, so every row with a resolvable
    /// point replaces the previous one.
    pub fn merge_place(
        result: &QueryResult,
        subject_var: &str,
        preferred_lang: Option<&str>,
        resolver: &CoordinateResolver,
    ) -> Option<PlaceInfo> {
        let mut info: PlaceInfo = Self::merge_bindings(result, subject_var, preferred_lang)?;

        for binding in result.bindings() {
            if let Some(point) = resolver.extract(binding) {
                info.point = Some(point);
            }
        }

        Some(info)
    }

    /// Add the `name` term of `binding` to `set` unless its language is already there
    ///
    /// Returns true when the term was added.
    pub fn add_term(binding: &Binding, name: &str, set: &mut Vec<RdfTerm>) -> bool {
        let Some(term) = binding.get(name) else {
            return false;
        };

        if set.iter().any(|t| t.lang == term.lang) {
            return false;
        }

        set.push(term.clone());
        true
    }

    /// Replace `term` with the `name` term of `binding`
    ///
    /// The running value is kept only when a preferred language is given and
    /// the running value already has it. Without a preference, the last row
    /// carrying the field wins.
    pub fn replace_term(
        binding: &Binding,
        name: &str,
        preferred_lang: Option<&str>,
        term: &mut Option<RdfTerm>,
    ) {
        let Some(candidate) = binding.get(name) else {
            return;
        };

        if let (Some(current), Some(preferred)) = (term.as_ref(), preferred_lang) {
            if current.lang() == Some(preferred) {
                return;
            }
        }

        *term = Some(candidate.clone());
    }
}
