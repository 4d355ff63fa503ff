//! Vehicle model
//!
//! `VehicleRecord` is the persisted listing. `VehicleDraft` and `VehiclePatch`
//! are the validated inputs for create and partial update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::utils::validation::validate_positive_price;

pub type VehicleId = u64;

pub const DEFAULT_VEHICLE_TYPE: &str = "auto";

/// Sale status of a listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    #[default]
    Available,
    Reserved,
    Sold,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Available => "available",
            VehicleStatus::Reserved => "reserved",
            VehicleStatus::Sold => "sold",
        }
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(VehicleStatus::Available),
            "reserved" => Ok(VehicleStatus::Reserved),
            "sold" => Ok(VehicleStatus::Sold),
            other => Err(format!(
                "Unknown status '{}' (expected available, reserved or sold)",
                other
            )),
        }
    }
}

fn default_vehicle_type() -> String {
    DEFAULT_VEHICLE_TYPE.to_string()
}

/// One vehicle listing as stored in the catalog document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRecord {
    pub id: VehicleId,
    #[serde(rename = "type", default = "default_vehicle_type")]
    pub vehicle_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub year: u64,
    #[serde(default)]
    pub km: u64,
    #[serde(default)]
    pub fuel: String,
    #[serde(default)]
    pub transmission: String,
    #[serde(default)]
    pub power: String,
    #[serde(default)]
    pub status: VehicleStatus,
    /// Asset references in upload order
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl VehicleRecord {
    /// Build a new record from a validated draft
    pub fn from_draft(
        id: VehicleId,
        draft: VehicleDraft,
        images: Vec<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            vehicle_type: draft.vehicle_type,
            title: draft.title,
            price: draft.price,
            year: draft.year,
            km: draft.km,
            fuel: draft.fuel,
            transmission: draft.transmission,
            power: draft.power,
            status: draft.status,
            images,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge the supplied fields; untouched fields keep their value
    pub fn apply_patch(&mut self, patch: VehiclePatch) {
        if let Some(vehicle_type) = patch.vehicle_type {
            self.vehicle_type = vehicle_type;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(year) = patch.year {
            self.year = year;
        }
        if let Some(km) = patch.km {
            self.km = km;
        }
        if let Some(fuel) = patch.fuel {
            self.fuel = fuel;
        }
        if let Some(transmission) = patch.transmission {
            self.transmission = transmission;
        }
        if let Some(power) = patch.power {
            self.power = power;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

/// Fields for a new listing, already coerced from the wire format
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct VehicleDraft {
    pub vehicle_type: String,
    #[validate(length(min = 3, message = "Title must be at least 3 characters"))]
    pub title: String,
    #[validate(custom = "validate_positive_price")]
    pub price: f64,
    pub year: u64,
    pub km: u64,
    pub fuel: String,
    pub transmission: String,
    pub power: String,
    pub status: VehicleStatus,
}

impl Default for VehicleDraft {
    fn default() -> Self {
        Self {
            vehicle_type: default_vehicle_type(),
            title: String::new(),
            price: 0.0,
            year: 0,
            km: 0,
            fuel: String::new(),
            transmission: String::new(),
            power: String::new(),
            status: VehicleStatus::Available,
        }
    }
}

/// Partial update; `None` means "not supplied"
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct VehiclePatch {
    pub vehicle_type: Option<String>,
    #[validate(length(min = 3, message = "Title must be at least 3 characters"))]
    pub title: Option<String>,
    #[validate(custom = "validate_positive_price")]
    pub price: Option<f64>,
    pub year: Option<u64>,
    pub km: Option<u64>,
    pub fuel: Option<String>,
    pub transmission: Option<String>,
    pub power: Option<String>,
    pub status: Option<VehicleStatus>,
}

/// An uploaded image before it is written to the asset store
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub original_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(
        original_name: impl Into<String>,
        content_type: Option<&str>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            original_name: original_name.into(),
            content_type: content_type.map(str::to_string),
            bytes: bytes.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, price: f64) -> VehicleDraft {
        VehicleDraft {
            title: title.to_string(),
            price,
            ..VehicleDraft::default()
        }
    }

    #[test]
    fn draft_requires_title_and_positive_price() {
        assert!(draft("Fiat Panda", 8500.0).validate().is_ok());
        assert!(draft("Ka", 8500.0).validate().is_err());
        assert!(draft("Fiat Panda", 0.0).validate().is_err());
    }

    #[test]
    fn patch_only_validates_supplied_fields() {
        assert!(VehiclePatch::default().validate().is_ok());
        let bad = VehiclePatch {
            price: Some(-1.0),
            ..VehiclePatch::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn record_serializes_with_wire_names() {
        let now = Utc::now();
        let record = VehicleRecord::from_draft(7, draft("Fiat Panda", 8500.0), vec![], now);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "auto");
        assert_eq!(json["status"], "available");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }

    #[test]
    fn record_tolerates_missing_optional_fields() {
        let record: VehicleRecord =
            serde_json::from_str(r#"{"id": 3, "title": "Vespa 125"}"#).unwrap();
        assert_eq!(record.vehicle_type, "auto");
        assert_eq!(record.km, 0);
        assert_eq!(record.status, VehicleStatus::Available);
        assert!(record.images.is_empty());
    }

    #[test]
    fn patch_merges_only_supplied_fields() {
        let now = Utc::now();
        let mut record = VehicleRecord::from_draft(1, draft("Fiat Panda", 8500.0), vec![], now);
        record.fuel = "Benzina".to_string();

        record.apply_patch(VehiclePatch {
            price: Some(7900.0),
            status: Some(VehicleStatus::Reserved),
            ..VehiclePatch::default()
        });

        assert_eq!(record.price, 7900.0);
        assert_eq!(record.status, VehicleStatus::Reserved);
        assert_eq!(record.title, "Fiat Panda");
        assert_eq!(record.fuel, "Benzina");
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("SOLD".parse::<VehicleStatus>(), Ok(VehicleStatus::Sold));
        assert!("leased".parse::<VehicleStatus>().is_err());
    }
}
