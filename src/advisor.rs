//! End-to-end recommendation: aggregate, modify, rank.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::army::aggregate;
use crate::attributes::AttributeVector;
use crate::dataset::{Dataset, slugify};
use crate::error::{AdvisorError, AdvisorResult};
use crate::modifiers::{Conditions, CriticalWarning, apply_modifiers};
use crate::ranking::{AffinityContext, RankedStrategy, rank};

/// A recommendation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Selected unit ids; repeats weight the average.
    pub units: Vec<String>,
    /// Terrain name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terrain: Option<String>,
    /// Weather name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
    /// Troop status name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub troop_status: Option<String>,
}

impl Request {
    /// A request with units only.
    #[must_use]
    pub fn new<I, S>(units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            units: units.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Set the terrain.
    #[must_use]
    pub fn with_terrain(mut self, terrain: impl Into<String>) -> Self {
        self.terrain = Some(terrain.into());
        self
    }

    /// Set the weather.
    #[must_use]
    pub fn with_weather(mut self, weather: impl Into<String>) -> Self {
        self.weather = Some(weather.into());
        self
    }

    /// Set the troop status.
    #[must_use]
    pub fn with_troop_status(mut self, status: impl Into<String>) -> Self {
        self.troop_status = Some(status.into());
        self
    }

    /// Borrow the conditions of this request.
    #[must_use]
    pub fn conditions(&self) -> Conditions<'_> {
        Conditions {
            terrain: self.terrain.as_deref(),
            weather: self.weather.as_deref(),
            troop_status: self.troop_status.as_deref(),
        }
    }
}

/// Full result of a recommendation.
///
/// Serializes with an extra `top_strategy` field (the first ranking entry,
/// or `null`).
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    /// Mean profile of the selected units.
    pub army_profile: AttributeVector,
    /// Profile after terrain, weather and troop status.
    pub modified_profile: AttributeVector,
    /// Slug of the terrain name.
    pub terrain_id: Option<String>,
    /// Terrain name as requested.
    pub terrain_name: Option<String>,
    /// Weather name as requested.
    pub weather_name: Option<String>,
    /// Troop status name as requested.
    pub troop_status_name: Option<String>,
    /// `CRITICAL` entries that fired.
    pub critical_warnings: Vec<CriticalWarning>,
    /// Strategies, best first.
    pub ranking: Vec<RankedStrategy>,
}

impl Recommendation {
    /// The best strategy, if the catalog is not empty.
    #[must_use]
    pub fn top_strategy(&self) -> Option<&RankedStrategy> {
        self.ranking.first()
    }
}

impl Serialize for Recommendation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Recommendation", 9)?;
        state.serialize_field("army_profile", &self.army_profile)?;
        state.serialize_field("modified_profile", &self.modified_profile)?;
        state.serialize_field("terrain_id", &self.terrain_id)?;
        state.serialize_field("terrain_name", &self.terrain_name)?;
        state.serialize_field("weather_name", &self.weather_name)?;
        state.serialize_field("troop_status_name", &self.troop_status_name)?;
        state.serialize_field("critical_warnings", &self.critical_warnings)?;
        state.serialize_field("ranking", &self.ranking)?;
        state.serialize_field("top_strategy", &self.top_strategy())?;
        state.end()
    }
}

/// Runs requests against a dataset.
#[derive(Debug, Clone, Copy)]
pub struct Advisor<'a> {
    dataset: &'a Dataset,
}

impl<'a> Advisor<'a> {
    /// Create an advisor over a dataset.
    #[must_use]
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    /// The dataset this advisor reads.
    #[must_use]
    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Produce a ranked recommendation.
    ///
    /// # Errors
    ///
    /// Returns [`AdvisorError::InvalidInput`] if no units are selected and
    /// [`AdvisorError::UnitNotFound`] for an unknown unit id.
    pub fn recommend(&self, request: &Request) -> AdvisorResult<Recommendation> {
        if request.units.is_empty() {
            return Err(AdvisorError::InvalidInput(
                "at least one unit must be selected".to_string(),
            ));
        }

        let army_profile = aggregate(&request.units, self.dataset.units())?;
        let conditions = request.conditions();
        let modified = apply_modifiers(&army_profile, &conditions, self.dataset.modifiers());

        let context = self.dataset.affinity().map(|config| AffinityContext {
            unit_ids: &request.units,
            terrain: conditions.terrain,
            weather: conditions.weather,
            config,
        });
        let ranking = rank(&modified.vector, self.dataset.strategies(), context.as_ref());

        if let Some(top) = ranking.first() {
            log::debug!(
                "top strategy {} ({:.1}%) for {} units",
                top.strategy.id,
                top.compatibility,
                request.units.len()
            );
        }

        Ok(Recommendation {
            army_profile,
            modified_profile: modified.vector,
            terrain_id: request.terrain.as_deref().map(slugify),
            terrain_name: request.terrain.clone(),
            weather_name: request.weather.clone(),
            troop_status_name: request.troop_status.clone(),
            critical_warnings: modified.warnings,
            ranking,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affinity::AffinityConfig;
    use crate::attributes::Attribute;
    use crate::catalog::{Strategy, Unit};
    use crate::modifiers::ModifierTable;

    fn dataset(affinity: Option<AffinityConfig>) -> Dataset {
        let mut scouts = AttributeVector::splat(0.5);
        scouts.set(Attribute::Stealth, 0.9);
        scouts.set(Attribute::Discipline, 0.3);
        let units = vec![
            Unit {
                id: "line".into(),
                name: "Line Infantry".into(),
                description: String::new(),
                attributes: AttributeVector::splat(0.5),
            },
            Unit {
                id: "scouts".into(),
                name: "Scouts".into(),
                description: String::new(),
                attributes: scouts,
            },
        ];
        let mut stealthy = AttributeVector::splat(0.5);
        stealthy.set(Attribute::Stealth, 0.9);
        let strategies = vec![
            Strategy {
                id: "frontal".into(),
                name: "Frontal Assault".into(),
                description: String::new(),
                ideal: AttributeVector::splat(0.5),
            },
            Strategy {
                id: "ambush".into(),
                name: "Ambush".into(),
                description: String::new(),
                ideal: stealthy,
            },
        ];
        let modifiers: ModifierTable = serde_json::from_str(
            r#"{"terrain": {"Deep Forest": {"U5_discipline": "CRITICAL"}}}"#,
        )
        .unwrap();
        Dataset::new(units, strategies, modifiers, affinity).unwrap()
    }

    #[test]
    fn test_round_trip_scenario() {
        let dataset = dataset(None);
        let rec = Advisor::new(&dataset).recommend(&Request::new(["line"])).unwrap();
        let top = rec.top_strategy().unwrap();
        assert_eq!(top.strategy.id, "frontal");
        assert_eq!(top.distance, 0.0);
        assert_eq!(top.compatibility, 100.0);
        assert!(rec.critical_warnings.is_empty());
        assert_eq!(rec.terrain_id, None);
    }

    #[test]
    fn test_conditions_flow_through() {
        let dataset = dataset(None);
        let request = Request::new(["scouts"]).with_terrain("Deep Forest");
        let rec = Advisor::new(&dataset).recommend(&request).unwrap();
        assert_eq!(rec.terrain_id.as_deref(), Some("deep_forest"));
        assert_eq!(rec.critical_warnings.len(), 1);
        assert!((rec.modified_profile[Attribute::Discipline] - 0.15).abs() < 1e-9);
        assert!((rec.army_profile[Attribute::Discipline] - 0.3).abs() < 1e-9);
        assert_eq!(rec.top_strategy().unwrap().strategy.id, "ambush");
    }

    #[test]
    fn test_affinity_applied_when_configured() {
        // Both strategies sit at the same raw distance from this army; the
        // affinity bonus of the line infantry breaks the tie.
        let request = Request::new(["line", "scouts"])
            .with_terrain("Open Field")
            .with_weather("Night");

        let plain = dataset(None);
        let rec = Advisor::new(&plain).recommend(&request).unwrap();
        assert_eq!(rec.ranking[0].distance, rec.ranking[1].distance);
        assert_eq!(rec.top_strategy().unwrap().strategy.id, "frontal");

        let config: AffinityConfig = serde_json::from_str(
            r#"{
                "unit_strategy_affinity": {"line": {"natural_strategies": ["ambush"], "max_adjustment": 0.2}},
                "environment_affinity": {"line": {"terrain": {"Open Field": 1.0}, "weather": {"Night": 1.0}}}
            }"#,
        )
        .unwrap();
        let with_affinity = dataset(Some(config));
        let rec = Advisor::new(&with_affinity).recommend(&request).unwrap();
        let ids: Vec<_> = rec.ranking.iter().map(|r| r.strategy.id.as_str()).collect();
        assert_eq!(ids, ["ambush", "frontal"]);
        assert!((rec.ranking[1].distance - rec.ranking[0].distance - 0.1).abs() < 1e-3);
    }

    #[test]
    fn test_errors() {
        let dataset = dataset(None);
        let advisor = Advisor::new(&dataset);
        let err = advisor.recommend(&Request::default()).unwrap_err();
        assert!(matches!(err, AdvisorError::InvalidInput(_)));
        let err = advisor.recommend(&Request::new(["line", "ogres"])).unwrap_err();
        assert!(matches!(err, AdvisorError::UnitNotFound(ref id) if id == "ogres"));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_request_json() {
        let request: Request =
            serde_json::from_str(r#"{"units": ["line", "line"], "weather": "Fog"}"#).unwrap();
        assert_eq!(request.units.len(), 2);
        assert_eq!(request.conditions().weather, Some("Fog"));
        assert_eq!(request.conditions().terrain, None);
    }

    #[test]
    fn test_recommendation_json_shape() {
        let dataset = dataset(None);
        let rec = Advisor::new(&dataset)
            .recommend(&Request::new(["scouts"]).with_terrain("Deep Forest"))
            .unwrap();
        let json = serde_json::to_value(&rec).unwrap();
        assert!(json["critical_warnings"][0].as_str().unwrap().starts_with("CRITICAL"));
        assert_eq!(json["ranking"][0]["id"], "ambush");
        assert!(json["ranking"][0]["ideal_attributes"]["U4_stealth"].is_number());
        assert_eq!(json["top_strategy"], json["ranking"][0]);
        assert_eq!(json["terrain_id"], "deep_forest");
    }

    #[test]
    fn test_empty_catalog_has_null_top_strategy() {
        let units = vec![Unit {
            id: "line".into(),
            name: "Line Infantry".into(),
            description: String::new(),
            attributes: AttributeVector::splat(0.5),
        }];
        let dataset = Dataset::new(units, vec![], ModifierTable::default(), None).unwrap();
        let rec = Advisor::new(&dataset).recommend(&Request::new(["line"])).unwrap();
        assert!(rec.top_strategy().is_none());
        let json = serde_json::to_value(&rec).unwrap();
        assert!(json["top_strategy"].is_null());
        assert_eq!(json["ranking"], serde_json::json!([]));
    }
}
