use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::de;
use super::property::AgentRef;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementStatus {
    #[default]
    Active,
    Fulfilled,
    Closed,
}

impl RequirementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Fulfilled => "fulfilled",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for RequirementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequirementStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "fulfilled" => Ok(Self::Fulfilled),
            "closed" => Ok(Self::Closed),
            other => Err(format!("unknown requirement status: {other}")),
        }
    }
}

/// A customer's property requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub property_type: Option<String>,
    pub price: Option<f64>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area: Option<f64>,
    pub preferred_locations: Vec<String>,
    pub priority: Priority,
    pub status: RequirementStatus,
    pub assigned_agent_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Requirement {
    pub fn new(
        title: impl Into<String>,
        customer_name: impl Into<String>,
        customer_phone: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            customer_name: customer_name.into(),
            customer_phone: customer_phone.into(),
            customer_email: None,
            property_type: None,
            price: None,
            bedrooms: None,
            bathrooms: None,
            area: None,
            preferred_locations: Vec::new(),
            priority: Priority::default(),
            status: RequirementStatus::default(),
            assigned_agent_id: None,
            notes: None,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementListing {
    #[serde(flatten)]
    pub requirement: Requirement,
    pub assigned_agent: Option<AgentRef>,
    pub creator: Option<AgentRef>,
}

impl RequirementListing {
    pub fn bare(requirement: Requirement) -> Self {
        Self {
            requirement,
            assigned_agent: None,
            creator: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewRequirement {
    pub title: Option<String>,
    pub description: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub property_type: Option<String>,
    #[serde(deserialize_with = "de::opt_f64")]
    pub price: Option<f64>,
    #[serde(deserialize_with = "de::opt_i32")]
    pub bedrooms: Option<i32>,
    #[serde(deserialize_with = "de::opt_i32")]
    pub bathrooms: Option<i32>,
    #[serde(deserialize_with = "de::opt_f64")]
    pub area: Option<f64>,
    pub preferred_locations: Vec<String>,
    pub priority: Option<Priority>,
    pub status: Option<RequirementStatus>,
    pub assigned_agent_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequirementPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub property_type: Option<String>,
    #[serde(deserialize_with = "de::opt_f64")]
    pub price: Option<f64>,
    #[serde(deserialize_with = "de::opt_i32")]
    pub bedrooms: Option<i32>,
    #[serde(deserialize_with = "de::opt_i32")]
    pub bathrooms: Option<i32>,
    #[serde(deserialize_with = "de::opt_f64")]
    pub area: Option<f64>,
    pub preferred_locations: Option<Vec<String>>,
    pub priority: Option<Priority>,
    pub status: Option<RequirementStatus>,
    pub assigned_agent_id: Option<Uuid>,
    pub notes: Option<String>,
}

impl RequirementPatch {
    pub fn apply(self, r: &mut Requirement) {
        use super::non_blank;

        if let Some(v) = self.title {
            r.title = v.trim().to_string();
        }
        if let Some(v) = self.description {
            r.description = non_blank(Some(v));
        }
        if let Some(v) = self.customer_name {
            r.customer_name = v.trim().to_string();
        }
        if let Some(v) = self.customer_phone {
            r.customer_phone = v.trim().to_string();
        }
        if let Some(v) = self.customer_email {
            r.customer_email = non_blank(Some(v));
        }
        if let Some(v) = self.property_type {
            r.property_type = non_blank(Some(v));
        }
        if let Some(v) = self.price {
            r.price = Some(v);
        }
        if let Some(v) = self.bedrooms {
            r.bedrooms = Some(v);
        }
        if let Some(v) = self.bathrooms {
            r.bathrooms = Some(v);
        }
        if let Some(v) = self.area {
            r.area = Some(v);
        }
        if let Some(v) = self.preferred_locations {
            r.preferred_locations = clean_locations(v);
        }
        if let Some(v) = self.priority {
            r.priority = v;
        }
        if let Some(v) = self.status {
            r.status = v;
        }
        if let Some(v) = self.assigned_agent_id {
            r.assigned_agent_id = Some(v);
        }
        if let Some(v) = self.notes {
            r.notes = non_blank(Some(v));
        }
        r.updated_at = Utc::now();
    }
}

pub(crate) fn clean_locations(locations: Vec<String>) -> Vec<String> {
    locations
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}
