//! Input rules checked before a mutation reaches the store.

use larder_types::{normalize_name, RecipeDraft};

use crate::config::{Bounds, Limits};
use crate::error::{CatalogError, CatalogResult};

/// Trim a name and reject it if nothing is left.
pub fn check_name(field: &'static str, raw: &str) -> CatalogResult<String> {
    let name = normalize_name(raw);
    if name.is_empty() {
        return Err(CatalogError::validation(field, "must not be empty"));
    }
    Ok(name)
}

/// Validate a recipe draft against `limits`, returning a copy with the name
/// trimmed.
pub fn check_draft(draft: &RecipeDraft, limits: &Limits) -> CatalogResult<RecipeDraft> {
    let name = check_name("name", &draft.name)?;
    check_bounds("serving", draft.serving, limits.serving)?;
    check_bounds("time", draft.time, limits.time)?;
    if limits.require_instructions && draft.instructions.trim().is_empty() {
        return Err(CatalogError::validation("instructions", "must not be empty"));
    }
    Ok(RecipeDraft {
        name,
        ..draft.clone()
    })
}

fn check_bounds(field: &'static str, value: u32, bounds: Bounds) -> CatalogResult<()> {
    if bounds.contains(value) {
        Ok(())
    } else {
        Err(CatalogError::validation(
            field,
            format!("{value} is outside {}..={}", bounds.min, bounds.max),
        ))
    }
}
