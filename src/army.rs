//! Army aggregation: many units, one profile.

use crate::attributes::AttributeVector;
use crate::catalog::UnitCatalog;
use crate::error::{AdvisorError, AdvisorResult};

/// Average the attribute vectors of the selected units.
///
/// Selecting the same unit twice counts it twice.
///
/// # Errors
///
/// Returns [`AdvisorError::InvalidInput`] for an empty selection and
/// [`AdvisorError::UnitNotFound`] for the first unknown id.
pub fn aggregate<S: AsRef<str>>(
    unit_ids: &[S],
    catalog: &UnitCatalog,
) -> AdvisorResult<AttributeVector> {
    if unit_ids.is_empty() {
        return Err(AdvisorError::InvalidInput("no units selected".to_string()));
    }

    let units = unit_ids
        .iter()
        .map(|id| catalog.lookup(id.as_ref()))
        .collect::<AdvisorResult<Vec<_>>>()?;

    let profile = AttributeVector::mean(units.iter().map(|u| &u.attributes))
        .ok_or_else(|| AdvisorError::InvalidInput("no units selected".to_string()))?;
    log::debug!("aggregated {} units into {profile:?}", unit_ids.len());
    Ok(profile)
}
