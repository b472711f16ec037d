use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::filter::FilterField;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(CompanyId);
id_newtype!(StoreId);
id_newtype!(ItemId);
id_newtype!(ReportId);

/// The back-office list screens backed by a paginated listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingResource {
    Users,
    Companies,
    Stores,
    Inventory,
    MaintenanceReports,
}

impl ListingResource {
    pub const ALL: [ListingResource; 5] = [
        ListingResource::Users,
        ListingResource::Companies,
        ListingResource::Stores,
        ListingResource::Inventory,
        ListingResource::MaintenanceReports,
    ];

    pub fn path(self) -> &'static str {
        match self {
            ListingResource::Users => "/users",
            ListingResource::Companies => "/companies",
            ListingResource::Stores => "/stores",
            ListingResource::Inventory => "/inventory",
            ListingResource::MaintenanceReports => "/maintenance-reports",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ListingResource::Users => "users",
            ListingResource::Companies => "companies",
            ListingResource::Stores => "stores",
            ListingResource::Inventory => "inventory",
            ListingResource::MaintenanceReports => "maintenance-reports",
        }
    }

    pub fn supports(self, field: FilterField) -> bool {
        match field {
            FilterField::Search | FilterField::Page => true,
            FilterField::Role => self == ListingResource::Users,
            FilterField::Company => self != ListingResource::Companies,
        }
    }
}

impl fmt::Display for ListingResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ListingResource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|resource| resource.name() == wanted)
            .ok_or_else(|| {
                let known = Self::ALL.map(ListingResource::name).join(", ");
                format!("unknown listing '{s}' (expected one of: {known})")
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTone {
    Neutral,
    Info,
    Success,
    Warning,
    Danger,
}

/// Badge color for a user role id as shown in the users table.
pub fn role_badge_tone(role: &str) -> BadgeTone {
    match role {
        "admin" | "super_admin" => BadgeTone::Danger,
        "manager" => BadgeTone::Warning,
        "technician" => BadgeTone::Info,
        _ => BadgeTone::Neutral,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl ReportStatus {
    pub fn badge_tone(self) -> BadgeTone {
        match self {
            ReportStatus::Pending => BadgeTone::Warning,
            ReportStatus::InProgress => BadgeTone::Info,
            ReportStatus::Completed => BadgeTone::Success,
            ReportStatus::Cancelled => BadgeTone::Neutral,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReportStatus::Pending => "Pending",
            ReportStatus::InProgress => "In progress",
            ReportStatus::Completed => "Completed",
            ReportStatus::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanySummary {
    pub id: CompanyId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub stores_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSummary {
    pub id: StoreId,
    pub name: String,
    pub company_name: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItemSummary {
    pub id: ItemId,
    pub sku: String,
    pub name: String,
    pub store_name: String,
    pub quantity: i64,
    #[serde(default)]
    pub reorder_level: i64,
}

impl InventoryItemSummary {
    pub fn stock_tone(&self) -> BadgeTone {
        if self.quantity <= 0 {
            BadgeTone::Danger
        } else if self.quantity <= self.reorder_level {
            BadgeTone::Warning
        } else {
            BadgeTone::Success
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceReportSummary {
    pub id: ReportId,
    pub title: String,
    pub store_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technician_name: Option<String>,
    pub status: ReportStatus,
    pub reported_at: DateTime<Utc>,
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
