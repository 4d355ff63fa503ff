use serde::{Deserialize, Serialize};

use crate::models::{VehicleDraft, VehiclePatch, VehicleRecord, VehicleStatus, DEFAULT_VEHICLE_TYPE};
use crate::repositories::AssetFailure;
use crate::services::{QueryPage, VehicleQuery};
use crate::utils::errors::{validation_error, AppResult};
use crate::utils::validation::{non_blank, parse_amount_or_zero, parse_count_or};

// Query string of GET /api/vehicles; kept as raw text so malformed values default instead of failing
#[derive(Debug, Default, Deserialize)]
pub struct ListVehiclesParams {
    #[serde(rename = "type")]
    pub vehicle_type: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListVehiclesParams {
    pub fn to_query(&self) -> VehicleQuery {
        VehicleQuery::from_raw(
            self.vehicle_type.as_deref(),
            self.search.as_deref(),
            self.sort.as_deref(),
            self.page.as_deref(),
            self.limit.as_deref(),
        )
    }
}

// Text parts of the multipart create/update form
#[derive(Debug, Default, Clone, PartialEq)]
pub struct VehicleForm {
    pub vehicle_type: Option<String>,
    pub title: Option<String>,
    pub price: Option<String>,
    pub year: Option<String>,
    pub km: Option<String>,
    pub fuel: Option<String>,
    pub transmission: Option<String>,
    pub power: Option<String>,
    pub status: Option<String>,
}

impl VehicleForm {
    /// Record one text field; unknown names are ignored
    pub fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            "type" => &mut self.vehicle_type,
            "title" => &mut self.title,
            "price" => &mut self.price,
            "year" => &mut self.year,
            "km" => &mut self.km,
            "fuel" => &mut self.fuel,
            "transmission" => &mut self.transmission,
            "power" => &mut self.power,
            "status" => &mut self.status,
            _ => return,
        };
        *slot = Some(value);
    }

    /// Coerce into a creation draft; validation rules run in the store
    pub fn into_draft(self) -> AppResult<VehicleDraft> {
        let status = parse_status(self.status.as_deref())?.unwrap_or_default();

        Ok(VehicleDraft {
            vehicle_type: non_blank(self.vehicle_type.as_deref())
                .unwrap_or_else(|| DEFAULT_VEHICLE_TYPE.to_string()),
            title: self.title.as_deref().unwrap_or("").trim().to_string(),
            price: parse_amount_or_zero(self.price.as_deref()),
            year: parse_count_or(self.year.as_deref(), 0),
            km: parse_count_or(self.km.as_deref(), 0),
            fuel: self.fuel.unwrap_or_default(),
            transmission: self.transmission.unwrap_or_default(),
            power: self.power.unwrap_or_default(),
            status,
        })
    }

    /// Coerce into a partial update; blank fields count as not supplied
    pub fn into_patch(self) -> AppResult<VehiclePatch> {
        let supplied = |value: &Option<String>| non_blank(value.as_deref());

        Ok(VehiclePatch {
            vehicle_type: supplied(&self.vehicle_type),
            title: supplied(&self.title),
            price: supplied(&self.price).map(|p| parse_amount_or_zero(Some(&p))),
            year: supplied(&self.year).map(|y| parse_count_or(Some(&y), 0)),
            km: supplied(&self.km).map(|k| parse_count_or(Some(&k), 0)),
            fuel: supplied(&self.fuel),
            transmission: supplied(&self.transmission),
            power: supplied(&self.power),
            status: parse_status(self.status.as_deref())?,
        })
    }
}

fn parse_status(raw: Option<&str>) -> AppResult<Option<VehicleStatus>> {
    match non_blank(raw) {
        Some(value) => value
            .parse::<VehicleStatus>()
            .map(Some)
            .map_err(validation_error),
        None => Ok(None),
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteImageRequest {
    #[serde(rename = "imagePath")]
    pub image_path: Option<String>,
}

// Public paginated listing
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePageResponse {
    pub success: bool,
    pub data: Vec<VehicleRecord>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl From<QueryPage<VehicleRecord>> for VehiclePageResponse {
    fn from(page: QueryPage<VehicleRecord>) -> Self {
        Self {
            success: true,
            data: page.data,
            page: page.page,
            limit: page.limit,
            total: page.total,
            total_pages: page.total_pages,
        }
    }
}

// Administrative full listing
#[derive(Debug, Serialize)]
pub struct AdminVehicleListResponse {
    pub success: bool,
    pub data: Vec<VehicleRecord>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteVehicleResponse {
    pub success: bool,
    pub message: String,
    pub deleted_id: u64,
    pub asset_failures: Vec<AssetFailure>,
}
