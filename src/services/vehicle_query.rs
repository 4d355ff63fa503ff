//! Vehicle query engine
//!
//! A pure function over a snapshot of the collection: filter by type, search
//! title/fuel/transmission, sort stably, then cut one page. The same snapshot
//! and query always produce the same page in the same order; records with
//! equal sort keys keep their collection order.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::models::VehicleRecord;
use crate::utils::validation::parse_positive_or;

pub const ALL_TYPES: &str = "all";
pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 6;

/// Supported orderings; unknown keys fall back to `PriceAsc`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    #[serde(rename = "price-asc")]
    PriceAsc,
    #[serde(rename = "price-desc")]
    PriceDesc,
    #[serde(rename = "year-desc")]
    YearDesc,
    #[serde(rename = "km-asc")]
    KmAsc,
    #[serde(rename = "km-desc")]
    KmDesc,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::PriceAsc => "price-asc",
            SortKey::PriceDesc => "price-desc",
            SortKey::YearDesc => "year-desc",
            SortKey::KmAsc => "km-asc",
            SortKey::KmDesc => "km-desc",
        }
    }

    /// Lenient parse used at the wire boundary
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }

    fn compare(&self, a: &VehicleRecord, b: &VehicleRecord) -> Ordering {
        match self {
            SortKey::PriceAsc => a.price.total_cmp(&b.price),
            SortKey::PriceDesc => b.price.total_cmp(&a.price),
            SortKey::YearDesc => b.year.cmp(&a.year),
            SortKey::KmAsc => a.km.cmp(&b.km),
            SortKey::KmDesc => b.km.cmp(&a.km),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "price-asc" => Ok(SortKey::PriceAsc),
            "price-desc" => Ok(SortKey::PriceDesc),
            "year-desc" => Ok(SortKey::YearDesc),
            "km-asc" => Ok(SortKey::KmAsc),
            "km-desc" => Ok(SortKey::KmDesc),
            other => Err(format!("unknown sort key '{}'", other)),
        }
    }
}

/// A fully defaulted catalog query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleQuery {
    /// `None` means every type
    pub vehicle_type: Option<String>,
    /// Lowercased, trimmed search text; empty means no search
    pub search: String,
    pub sort: SortKey,
    pub page: u64,
    pub limit: u64,
}

impl Default for VehicleQuery {
    fn default() -> Self {
        Self {
            vehicle_type: None,
            search: String::new(),
            sort: SortKey::PriceAsc,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl VehicleQuery {
    /// Build from raw wire values, defaulting anything absent or malformed
    pub fn from_raw(
        vehicle_type: Option<&str>,
        search: Option<&str>,
        sort: Option<&str>,
        page: Option<&str>,
        limit: Option<&str>,
    ) -> Self {
        let vehicle_type = vehicle_type
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != ALL_TYPES)
            .map(str::to_string);

        Self {
            vehicle_type,
            search: search.unwrap_or("").trim().to_lowercase(),
            sort: SortKey::parse_or_default(sort),
            page: parse_positive_or(page, DEFAULT_PAGE),
            limit: parse_positive_or(limit, DEFAULT_LIMIT),
        }
    }

    fn matches(&self, vehicle: &VehicleRecord) -> bool {
        if let Some(vehicle_type) = &self.vehicle_type {
            if vehicle.vehicle_type != *vehicle_type {
                return false;
            }
        }
        if self.search.is_empty() {
            return true;
        }
        [&vehicle.title, &vehicle.fuel, &vehicle.transmission]
            .iter()
            .any(|field| field.to_lowercase().contains(&self.search))
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct QueryPage<T> {
    #[serde(default)]
    pub data: Vec<T>,
    #[serde(default)]
    pub page: u64,
    #[serde(default)]
    pub limit: u64,
    /// Matches after filtering, before pagination
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: u64,
}

/// Run a query over a snapshot
pub fn query(records: &[VehicleRecord], q: &VehicleQuery) -> QueryPage<VehicleRecord> {
    let mut matched: Vec<&VehicleRecord> = records.iter().filter(|v| q.matches(v)).collect();
    // sort_by is stable: ties keep collection order
    matched.sort_by(|a, b| q.sort.compare(a, b));

    let total = matched.len() as u64;
    let limit = q.limit.max(1);
    let page = q.page.max(1);
    let start = (page - 1).saturating_mul(limit);

    let data = if start >= total {
        Vec::new()
    } else {
        matched
            .into_iter()
            .skip(start as usize)
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect()
    };

    QueryPage {
        data,
        page,
        limit,
        total,
        total_pages: total.div_ceil(limit),
    }
}
