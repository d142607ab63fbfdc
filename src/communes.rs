use crate::error::{RepartitionError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::io::Read;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CommuneShare {
    #[schemars(description = "Commune name; unique within its region")]
    pub commune: String,

    #[schemars(
        description = "Allocation weight. Applied as given: fractions of 1.0, or percentages when converted with the Percent convention"
    )]
    pub weight: f64,
}

impl CommuneShare {
    pub fn new(commune: impl Into<String>, weight: f64) -> Self {
        Self {
            commune: commune.into(),
            weight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum WeightConvention {
    #[default]
    #[schemars(description = "Weights are fractional shares, typically summing to 1.0 per region")]
    Fraction,

    #[schemars(description = "Weights are percentages, typically summing to 100 per region")]
    Percent,
}

impl WeightConvention {
    pub fn scale(self) -> f64 {
        match self {
            WeightConvention::Fraction => 1.0,
            WeightConvention::Percent => 0.01,
        }
    }
}

/// Region name to ordered commune shares.
///
/// This is reference data supplied by the caller; the allocator never checks
/// that a region's weights add up to anything in particular.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct RegionCommuneMap {
    regions: BTreeMap<String, Vec<CommuneShare>>,
}

impl RegionCommuneMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, region: impl Into<String>, shares: Vec<CommuneShare>) {
        self.regions.insert(region.into(), shares);
    }

    pub fn with_region(mut self, region: impl Into<String>, shares: Vec<CommuneShare>) -> Self {
        self.insert(region, shares);
        self
    }

    pub fn get(&self, region: &str) -> Option<&[CommuneShare]> {
        self.regions.get(region).map(Vec::as_slice)
    }

    pub fn contains_region(&self, region: &str) -> bool {
        self.regions.contains_key(region)
    }

    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn weight_total(&self, region: &str) -> Option<f64> {
        self.get(region).map(|shares| shares.iter().map(|s| s.weight).sum())
    }

    /// Rejects duplicate communes within a region and negative or non-finite weights.
    pub fn validate(&self) -> Result<()> {
        for (region, shares) in &self.regions {
            let mut seen = HashSet::new();
            for share in shares {
                if !share.weight.is_finite() || share.weight < 0.0 {
                    return Err(RepartitionError::InvalidWeight {
                        region: region.clone(),
                        commune: share.commune.clone(),
                        weight: share.weight,
                    });
                }
                if !seen.insert(share.commune.as_str()) {
                    return Err(RepartitionError::DuplicateCommune {
                        region: region.clone(),
                        commune: share.commune.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Rescales every weight from `convention` to fractional shares.
    pub fn to_fractions(&self, convention: WeightConvention) -> Self {
        let scale = convention.scale();
        self.map_weights(|_, w| w * scale)
    }

    /// Rescales each region so its weights sum to 1.0. Regions whose weights
    /// sum to zero are left untouched.
    pub fn normalized(&self) -> Self {
        let totals: BTreeMap<&str, f64> = self
            .regions
            .iter()
            .map(|(region, shares)| (region.as_str(), shares.iter().map(|s| s.weight).sum()))
            .collect();

        self.map_weights(|region, w| {
            let total = totals.get(region).copied().unwrap_or(0.0);
            if total == 0.0 {
                w
            } else {
                w / total
            }
        })
    }

    fn map_weights(&self, f: impl Fn(&str, f64) -> f64) -> Self {
        let regions = self
            .regions
            .iter()
            .map(|(region, shares)| {
                let shares = shares
                    .iter()
                    .map(|s| CommuneShare::new(s.commune.clone(), f(region, s.weight)))
                    .collect();
                (region.clone(), shares)
            })
            .collect();
        Self { regions }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(RegionCommuneMap)
    }
}
