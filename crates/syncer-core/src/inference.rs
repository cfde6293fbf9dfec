//! Special-type inference (C1): a pure, deterministic mapping from a field's
//! name, storage type, and primary-key-ness to an inferred `special_type`.
//!
//! The pattern table in [`PATTERNS`] is the documented, ordered asset this
//! component exposes: the first entry whose regex matches the lower-cased
//! field name *and* whose base-type gate admits the field's `base_type` wins.
//! Order matters — see the module docs on each gate for why suffix and exact
//! patterns are interleaved rather than grouped.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{BaseType, SpecialType, SyncError};

/// Which base types a pattern is allowed to fire for.
#[derive(Debug, Clone, Copy)]
pub enum Gate {
    /// Matches regardless of `base_type`.
    Any,
    /// Matches only if `base_type` is textual (`CharField`/`TextField`).
    Textual,
    /// Matches only if `base_type` is a float-like numeric.
    Float,
    /// Matches if `base_type` is textual or an integer.
    IntOrText,
    /// Matches if `base_type` is boolean or an integer.
    BoolOrInt,
}

impl Gate {
    fn admits(self, base_type: BaseType) -> bool {
        match self {
            Gate::Any => true,
            Gate::Textual => base_type.is_textual(),
            Gate::Float => base_type.is_float(),
            Gate::IntOrText => base_type.is_textual() || base_type.is_integer(),
            Gate::BoolOrInt => base_type.is_boolean() || base_type.is_integer(),
        }
    }
}

/// One row of the ordered pattern table: a regex over the lower-cased field
/// name, the base-type gate it requires, and the special_type it produces.
type PatternEntry = (&'static str, Gate, SpecialType);

/// The ordered pattern table. Position determines precedence: the first
/// admitting match wins. Suffix forms (`_type`) are listed beside their
/// exact-match counterparts to preserve the documented tie-break order.
pub const PATTERNS: &[PatternEntry] = &[
    // Float-gated: latitude/longitude variants. Leading-underscore forms are
    // suffix matches (e.g. "store_lat"); bare forms require an exact name.
    (r"_lat$", Gate::Float, SpecialType::Latitude),
    (r"_lon$", Gate::Float, SpecialType::Longitude),
    (r"_lng$", Gate::Float, SpecialType::Longitude),
    (r"_long$", Gate::Float, SpecialType::Longitude),
    (r"_longitude$", Gate::Float, SpecialType::Longitude),
    (r"_latitude$", Gate::Float, SpecialType::Latitude),
    (r"^lat$", Gate::Float, SpecialType::Latitude),
    (r"^latitude$", Gate::Float, SpecialType::Latitude),
    (r"^lon$", Gate::Float, SpecialType::Longitude),
    (r"^lng$", Gate::Float, SpecialType::Longitude),
    (r"^long$", Gate::Float, SpecialType::Longitude),
    (r"^longitude$", Gate::Float, SpecialType::Longitude),
    // Int-or-text-gated: category and zip code.
    (r"_rating$", Gate::IntOrText, SpecialType::Category),
    (r"_type$", Gate::IntOrText, SpecialType::Category),
    (r"^rating$", Gate::IntOrText, SpecialType::Category),
    (r"^role$", Gate::IntOrText, SpecialType::Category),
    (r"^sex$", Gate::IntOrText, SpecialType::Category),
    (r"^status$", Gate::IntOrText, SpecialType::Category),
    (r"^type$", Gate::IntOrText, SpecialType::Category),
    (r"^currency$", Gate::IntOrText, SpecialType::Category),
    (r"^gender$", Gate::IntOrText, SpecialType::Category),
    (r"^postalcode$", Gate::IntOrText, SpecialType::ZipCode),
    (r"^postal_code$", Gate::IntOrText, SpecialType::ZipCode),
    (r"^zip_code$", Gate::IntOrText, SpecialType::ZipCode),
    (r"^zipcode$", Gate::IntOrText, SpecialType::ZipCode),
    // Bool-or-int-gated.
    (r"^active$", Gate::BoolOrInt, SpecialType::Category),
    // Text-gated.
    (r"_url$", Gate::Textual, SpecialType::Url),
    (r"^url$", Gate::Textual, SpecialType::Url),
    (r"^city$", Gate::Textual, SpecialType::City),
    (r"^country$", Gate::Textual, SpecialType::Country),
    (r"^countrycode$", Gate::Textual, SpecialType::Country),
    (r"^first_name$", Gate::Textual, SpecialType::Name),
    (r"^last_name$", Gate::Textual, SpecialType::Name),
    (r"^full_name$", Gate::Textual, SpecialType::Name),
    (r"^name$", Gate::Textual, SpecialType::Name),
    (r"^state$", Gate::Textual, SpecialType::State),
];

static COMPILED: OnceLock<Vec<(Regex, Gate, SpecialType)>> = OnceLock::new();

/// Compile and self-validate [`PATTERNS`], caching the result. Panics are
/// impossible here by construction (the patterns are a fixed `const`); the
/// fallible path is exercised by [`validate_pattern_table`] for callers that
/// want to fail startup cleanly instead of trusting the cache.
fn compiled_patterns() -> &'static [(Regex, Gate, SpecialType)] {
    COMPILED.get_or_init(|| {
        PATTERNS
            .iter()
            .map(|(pattern, gate, special_type)| {
                let regex = Regex::new(pattern)
                    .unwrap_or_else(|e| panic!("invalid inference pattern {pattern:?}: {e}"));
                (regex, *gate, *special_type)
            })
            .collect()
    })
}

/// Validate the pattern table without panicking: every regex must compile.
/// Called once at engine startup; a failure is
/// [`SyncError::InferenceTableMisconfiguration`] and refuses the run.
pub fn validate_pattern_table() -> Result<(), SyncError> {
    for (pattern, _gate, _special_type) in PATTERNS {
        Regex::new(pattern)
            .map_err(|e| SyncError::InferenceTableMisconfiguration(format!("{pattern:?}: {e}")))?;
    }
    Ok(())
}

/// Input to special-type inference: just enough of a field to decide.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor<'a> {
    pub name: &'a str,
    pub base_type: BaseType,
    pub is_pk: bool,
    pub prior_special_type: Option<SpecialType>,
}

/// Infer a `special_type` for a field, or `None` if nothing applies.
///
/// Order: an existing `prior_special_type` always wins unchanged; then
/// primary-key-ness; then an exact `"id"` name match; then the ordered
/// pattern table; otherwise no inference.
pub fn infer_special_type(field: FieldDescriptor<'_>) -> Option<SpecialType> {
    if let Some(prior) = field.prior_special_type {
        return Some(prior);
    }
    if field.is_pk {
        return Some(SpecialType::Id);
    }
    let lower = field.name.to_lowercase();
    if lower == "id" {
        return Some(SpecialType::Id);
    }
    compiled_patterns()
        .iter()
        .find(|(regex, gate, _)| regex.is_match(&lower) && gate.admits(field.base_type))
        .map(|(_, _, special_type)| *special_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field<'a>(name: &'a str, base_type: BaseType) -> FieldDescriptor<'a> {
        FieldDescriptor {
            name,
            base_type,
            is_pk: false,
            prior_special_type: None,
        }
    }

    #[test]
    fn pattern_table_self_validates() {
        validate_pattern_table().expect("pattern table must compile");
    }

    #[test]
    fn prior_special_type_wins_unconditionally() {
        let mut f = field("anything", BaseType::TextField);
        f.prior_special_type = Some(SpecialType::Json);
        assert_eq!(infer_special_type(f), Some(SpecialType::Json));
    }

    #[test]
    fn primary_key_always_infers_id() {
        let mut f = field("account_number", BaseType::IntegerField);
        f.is_pk = true;
        assert_eq!(infer_special_type(f), Some(SpecialType::Id));
    }

    #[test]
    fn exact_id_name_infers_id() {
        assert_eq!(
            infer_special_type(field("id", BaseType::IntegerField)),
            Some(SpecialType::Id)
        );
        assert_eq!(
            infer_special_type(field("ID", BaseType::IntegerField)),
            Some(SpecialType::Id)
        );
    }

    #[test]
    fn latitude_requires_float_gate() {
        assert_eq!(
            infer_special_type(field("latitude", BaseType::FloatField)),
            Some(SpecialType::Latitude)
        );
        assert_eq!(
            infer_special_type(field("latitude", BaseType::CharField)),
            None
        );
    }

    #[test]
    fn underscore_longitude_variants() {
        for name in ["_lon", "_lng", "_long", "_longitude"] {
            assert_eq!(
                infer_special_type(field(name, BaseType::FloatField)),
                Some(SpecialType::Longitude),
                "{name} should infer longitude"
            );
        }
    }

    #[test]
    fn category_gate_admits_int_or_text_not_float() {
        assert_eq!(
            infer_special_type(field("status", BaseType::CharField)),
            Some(SpecialType::Category)
        );
        assert_eq!(
            infer_special_type(field("status", BaseType::IntegerField)),
            Some(SpecialType::Category)
        );
        assert_eq!(
            infer_special_type(field("status", BaseType::FloatField)),
            None
        );
    }

    #[test]
    fn active_gate_admits_bool_or_int_not_text() {
        assert_eq!(
            infer_special_type(field("active", BaseType::BooleanField)),
            Some(SpecialType::Category)
        );
        assert_eq!(
            infer_special_type(field("active", BaseType::IntegerField)),
            Some(SpecialType::Category)
        );
        assert_eq!(
            infer_special_type(field("active", BaseType::CharField)),
            None
        );
    }

    #[test]
    fn zip_code_variants() {
        for name in ["postalCode", "postal_code", "zip_code", "zipcode"] {
            assert_eq!(
                infer_special_type(field(name, BaseType::CharField)),
                Some(SpecialType::ZipCode),
                "{name} should infer zip_code"
            );
        }
    }

    #[test]
    fn url_requires_textual_gate() {
        assert_eq!(
            infer_special_type(field("homepage_url", BaseType::CharField)),
            Some(SpecialType::Url) // suffix match on "_url"
        );
        assert_eq!(
            infer_special_type(field("url", BaseType::CharField)),
            Some(SpecialType::Url)
        );
        assert_eq!(
            infer_special_type(field("url", BaseType::IntegerField)),
            None
        );
    }

    #[test]
    fn type_suffix_and_exact_both_infer_category() {
        assert_eq!(
            infer_special_type(field("account_type", BaseType::CharField)),
            Some(SpecialType::Category)
        );
        assert_eq!(
            infer_special_type(field("type", BaseType::CharField)),
            Some(SpecialType::Category)
        );
    }

    #[test]
    fn name_variants_require_textual_gate() {
        for name in ["first_name", "last_name", "full_name", "name"] {
            assert_eq!(
                infer_special_type(field(name, BaseType::CharField)),
                Some(SpecialType::Name),
                "{name} should infer name"
            );
        }
    }

    #[test]
    fn unmatched_name_infers_nothing() {
        assert_eq!(
            infer_special_type(field("widget_count", BaseType::IntegerField)),
            None
        );
    }
}
