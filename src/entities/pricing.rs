use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{config_error, Error};

/// Static fare parameters for one delivery provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingProfile {
    pub base_fare: f64,
    pub per_km_rate: f64,
    pub min_fare: f64,
    pub max_fare: f64,
    #[serde(rename = "estimatedDeliveryTime", default)]
    pub nominal_delivery_minutes: u32,
}

impl PricingProfile {
    pub fn new(
        base_fare: f64,
        per_km_rate: f64,
        min_fare: f64,
        max_fare: f64,
        nominal_delivery_minutes: u32,
    ) -> Self {
        Self {
            base_fare,
            per_km_rate,
            min_fare,
            max_fare,
            nominal_delivery_minutes,
        }
    }

    fn validate(&self, provider: &str) -> Result<(), Error> {
        let fields = [
            ("baseFare", self.base_fare),
            ("perKmRate", self.per_km_rate),
            ("minFare", self.min_fare),
            ("maxFare", self.max_fare),
        ];

        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(config_error(format!(
                    "pricing profile {}: {} must be a non-negative number",
                    provider, name
                )));
            }
        }

        if self.min_fare > self.max_fare {
            return Err(config_error(format!(
                "pricing profile {}: minFare {} exceeds maxFare {}",
                provider, self.min_fare, self.max_fare
            )));
        }

        Ok(())
    }
}

/// Provider id to pricing profile. Built once at startup and shared
/// read-only between requests.
#[derive(Clone, Debug, PartialEq)]
pub struct PricingTable {
    profiles: BTreeMap<String, PricingProfile>,
}

impl PricingTable {
    pub fn new<I, S>(profiles: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (S, PricingProfile)>,
        S: Into<String>,
    {
        let mut table = BTreeMap::new();

        for (provider, profile) in profiles {
            let provider = provider.into();

            if provider.trim().is_empty() {
                return Err(config_error("pricing profile with an empty provider id"));
            }

            profile.validate(&provider)?;

            if table.insert(provider.clone(), profile).is_some() {
                return Err(config_error(format!(
                    "duplicate pricing profile for provider {}",
                    provider
                )));
            }
        }

        Ok(Self { profiles: table })
    }

    /// Reads a JSON object of `provider -> profile` from disk.
    #[tracing::instrument]
    pub fn from_json_file(path: &Path) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)?;
        let profiles: BTreeMap<String, PricingProfile> = serde_json::from_str(&raw)?;

        let table = Self::new(profiles)?;
        if table.is_empty() {
            return Err(config_error(format!(
                "pricing table {} has no providers",
                path.display()
            )));
        }

        Ok(table)
    }

    pub fn get(&self, provider: &str) -> Option<&PricingProfile> {
        self.profiles.get(provider)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PricingProfile)> {
        self.profiles.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        let profiles = BTreeMap::from([
            ("porter".to_string(), PricingProfile::new(30.0, 12.0, 30.0, 500.0, 45)),
            ("dunzo".to_string(), PricingProfile::new(35.0, 13.0, 35.0, 600.0, 60)),
            ("rapido".to_string(), PricingProfile::new(25.0, 10.0, 25.0, 400.0, 40)),
            ("swiggy_genie".to_string(), PricingProfile::new(40.0, 14.0, 40.0, 700.0, 50)),
            ("self_service".to_string(), PricingProfile::new(0.0, 0.0, 0.0, 0.0, 0)),
        ]);

        Self { profiles }
    }
}

#[test]
fn default_table_is_valid() {
    let table = PricingTable::default();
    let rebuilt = PricingTable::new(
        table
            .iter()
            .map(|(id, profile)| (id.to_string(), profile.clone())),
    )
    .unwrap();

    assert_eq!(rebuilt, table);
    assert_eq!(table.len(), 5);
    assert!(table.get("swiggy_genie").is_some());
    assert_eq!(table.get("porter").unwrap().max_fare, 500.0);
}

#[test]
fn rejects_inverted_fare_bounds() {
    let err = PricingTable::new([("porter", PricingProfile::new(30.0, 12.0, 600.0, 500.0, 45))])
        .unwrap_err();

    assert_eq!(err.code, 1);
    assert!(err.message.contains("minFare"));
}

#[test]
fn rejects_negative_rates() {
    assert!(PricingTable::new([("rapido", PricingProfile::new(25.0, -1.0, 25.0, 400.0, 40))]).is_err());
    assert!(PricingTable::new([("", PricingProfile::new(0.0, 0.0, 0.0, 0.0, 0))]).is_err());
}

#[test]
fn parses_camel_case_profiles() {
    let profiles: BTreeMap<String, PricingProfile> = serde_json::from_str(
        r#"{"porter": {"baseFare": 30, "perKmRate": 12, "minFare": 30, "maxFare": 500, "estimatedDeliveryTime": 45}}"#,
    )
    .unwrap();
    let table = PricingTable::new(profiles).unwrap();

    assert_eq!(
        table.get("porter"),
        Some(&PricingProfile::new(30.0, 12.0, 30.0, 500.0, 45))
    );
}

#[test]
fn empty_pricing_file_is_rejected() {
    let path =
        std::env::temp_dir().join(format!("mealroute-pricing-{}.json", std::process::id()));
    std::fs::write(&path, "{}").unwrap();

    let err = PricingTable::from_json_file(&path).unwrap_err();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(err.code, 1);
    assert!(err.message.contains("has no providers"));
}
