use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::de;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    #[default]
    Available,
    Pending,
    Sold,
}

impl PropertyStatus {
    pub const ALL: [PropertyStatus; 3] = [Self::Available, Self::Pending, Self::Sold];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Pending => "pending",
            Self::Sold => "sold",
        }
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(Self::Available),
            "pending" => Ok(Self::Pending),
            "sold" => Ok(Self::Sold),
            other => Err(format!("unknown property status: {other}")),
        }
    }
}

/// Where a listing came from. Rows without a value count as `Others`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceType {
    Inhouse,
    #[default]
    Others,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inhouse => "Inhouse",
            Self::Others => "Others",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inhouse" => Ok(Self::Inhouse),
            "others" => Ok(Self::Others),
            other => Err(format!("unknown source type: {other}")),
        }
    }
}

/// Name/phone pair for the owner or broker of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl ContactDetails {
    pub fn is_empty(&self) -> bool {
        self.name.as_deref().is_none_or(|n| n.trim().is_empty())
            && self.phone.as_deref().is_none_or(|p| p.trim().is_empty())
    }

    /// Drops blank members; returns `None` when nothing is left.
    pub fn normalized(self) -> Option<Self> {
        let details = Self {
            name: super::non_blank(self.name),
            phone: super::non_blank(self.phone),
        };
        if details.is_empty() {
            None
        } else {
            Some(details)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: Uuid,
    pub project_id: Option<Uuid>,
    pub agent_id: Option<Uuid>,
    pub title: String,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area: Option<f64>,
    pub address: Option<String>,
    pub status: PropertyStatus,
    pub images: Vec<String>,
    pub property_code: Option<String>,
    pub property_code_type: Option<String>,
    pub owner_details: Option<ContactDetails>,
    pub broker_details: Option<ContactDetails>,
    pub price_per_sqft: Option<f64>,
    pub location_url: Option<String>,
    pub source_type: Option<SourceType>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            project_id: None,
            agent_id: None,
            title: title.into(),
            property_type: None,
            price: None,
            description: None,
            bedrooms: None,
            bathrooms: None,
            area: None,
            address: None,
            status: PropertyStatus::Available,
            images: Vec::new(),
            property_code: None,
            property_code_type: None,
            owner_details: None,
            broker_details: None,
            price_per_sqft: None,
            location_url: None,
            source_type: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn effective_source_type(&self) -> SourceType {
        self.source_type.unwrap_or_default()
    }

    /// A code type without a code is an intermediate state that must never be stored.
    pub fn has_pending_code(&self) -> bool {
        self.property_code_type
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
            && self
                .property_code
                .as_deref()
                .is_none_or(|c| c.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub name: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRef {
    pub name: String,
    pub email: Option<String>,
}

/// A property joined with the display data of its project and agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyListing {
    #[serde(flatten)]
    pub property: Property,
    pub project: Option<ProjectRef>,
    pub agent: Option<AgentRef>,
}

impl PropertyListing {
    pub fn bare(property: Property) -> Self {
        Self {
            property,
            project: None,
            agent: None,
        }
    }

    pub fn project_name(&self) -> Option<&str> {
        self.project.as_ref().map(|p| p.name.as_str())
    }

    pub fn agent_name(&self) -> Option<&str> {
        self.agent.as_ref().map(|a| a.name.as_str())
    }
}

/// Body of a property creation request: every property field except id and timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewProperty {
    pub project_id: Option<Uuid>,
    pub agent_id: Option<Uuid>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    #[serde(deserialize_with = "de::opt_f64")]
    pub price: Option<f64>,
    pub description: Option<String>,
    #[serde(deserialize_with = "de::opt_i32")]
    pub bedrooms: Option<i32>,
    #[serde(deserialize_with = "de::opt_i32")]
    pub bathrooms: Option<i32>,
    #[serde(deserialize_with = "de::opt_f64")]
    pub area: Option<f64>,
    pub address: Option<String>,
    pub status: Option<PropertyStatus>,
    pub images: Vec<String>,
    pub property_code: Option<String>,
    pub property_code_type: Option<String>,
    pub owner_details: Option<ContactDetails>,
    pub broker_details: Option<ContactDetails>,
    #[serde(deserialize_with = "de::opt_f64")]
    pub price_per_sqft: Option<f64>,
    pub location_url: Option<String>,
    pub source_type: Option<SourceType>,
}

impl NewProperty {
    /// Builds the row to insert. Blank strings become `None`; the caller
    /// decides agent and code.
    pub fn into_property(self, title: String) -> Property {
        use super::non_blank;

        let mut p = Property::new(title);
        p.project_id = self.project_id;
        p.agent_id = self.agent_id;
        p.property_type = non_blank(self.property_type);
        p.price = self.price;
        p.description = non_blank(self.description);
        p.bedrooms = self.bedrooms;
        p.bathrooms = self.bathrooms;
        p.area = self.area;
        p.address = non_blank(self.address);
        p.status = self.status.unwrap_or_default();
        p.images = self
            .images
            .into_iter()
            .filter(|i| !i.trim().is_empty())
            .collect();
        p.property_code = non_blank(self.property_code);
        p.property_code_type = non_blank(self.property_code_type);
        p.owner_details = self.owner_details.and_then(ContactDetails::normalized);
        p.broker_details = self.broker_details.and_then(ContactDetails::normalized);
        p.price_per_sqft = self.price_per_sqft;
        p.location_url = non_blank(self.location_url);
        p.source_type = Some(self.source_type.unwrap_or_default());
        p
    }
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyPatch {
    pub project_id: Option<Uuid>,
    pub agent_id: Option<Uuid>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    #[serde(deserialize_with = "de::opt_f64")]
    pub price: Option<f64>,
    pub description: Option<String>,
    #[serde(deserialize_with = "de::opt_i32")]
    pub bedrooms: Option<i32>,
    #[serde(deserialize_with = "de::opt_i32")]
    pub bathrooms: Option<i32>,
    #[serde(deserialize_with = "de::opt_f64")]
    pub area: Option<f64>,
    pub address: Option<String>,
    pub status: Option<PropertyStatus>,
    pub images: Option<Vec<String>>,
    pub property_code: Option<String>,
    pub property_code_type: Option<String>,
    pub owner_details: Option<ContactDetails>,
    pub broker_details: Option<ContactDetails>,
    #[serde(deserialize_with = "de::opt_f64")]
    pub price_per_sqft: Option<f64>,
    pub location_url: Option<String>,
    pub source_type: Option<SourceType>,
}

impl PropertyPatch {
    pub fn apply(self, p: &mut Property) {
        if let Some(v) = self.project_id {
            p.project_id = Some(v);
        }
        if let Some(v) = self.agent_id {
            p.agent_id = Some(v);
        }
        if let Some(v) = self.title {
            p.title = v.trim().to_string();
        }
        if let Some(v) = self.property_type {
            p.property_type = super::non_blank(Some(v));
        }
        if let Some(v) = self.price {
            p.price = Some(v);
        }
        if let Some(v) = self.description {
            p.description = super::non_blank(Some(v));
        }
        if let Some(v) = self.bedrooms {
            p.bedrooms = Some(v);
        }
        if let Some(v) = self.bathrooms {
            p.bathrooms = Some(v);
        }
        if let Some(v) = self.area {
            p.area = Some(v);
        }
        if let Some(v) = self.address {
            p.address = super::non_blank(Some(v));
        }
        if let Some(v) = self.status {
            p.status = v;
        }
        if let Some(v) = self.images {
            p.images = v;
        }
        if let Some(v) = self.property_code {
            p.property_code = super::non_blank(Some(v));
        }
        if let Some(v) = self.property_code_type {
            p.property_code_type = super::non_blank(Some(v));
        }
        if let Some(v) = self.owner_details {
            p.owner_details = v.normalized();
        }
        if let Some(v) = self.broker_details {
            p.broker_details = v.normalized();
        }
        if let Some(v) = self.price_per_sqft {
            p.price_per_sqft = Some(v);
        }
        if let Some(v) = self.location_url {
            p.location_url = super::non_blank(Some(v));
        }
        if let Some(v) = self.source_type {
            p.source_type = Some(v);
        }
        p.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Sold".parse::<PropertyStatus>(), Ok(PropertyStatus::Sold));
        assert!("gone".parse::<PropertyStatus>().is_err());
    }

    #[test]
    fn new_property_payload_accepts_form_shapes() {
        let body = r#"{
            "title": "3BR Apt",
            "type": "Apartment",
            "price": "500000",
            "bedrooms": "3",
            "area": 1200,
            "address": "",
            "property_code_type": "New Apartment",
            "owner_details": {"name": "", "phone": ""}
        }"#;
        let input: NewProperty = serde_json::from_str(body).unwrap();
        let p = input.into_property("3BR Apt".into());
        assert_eq!(p.price, Some(500000.0));
        assert_eq!(p.bedrooms, Some(3));
        assert_eq!(p.address, None);
        assert_eq!(p.owner_details, None);
        assert_eq!(p.status, PropertyStatus::Available);
        assert_eq!(p.source_type, Some(SourceType::Others));
        assert!(p.has_pending_code());
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let mut p = Property::new("Villa");
        p.price = Some(1.0);
        p.bedrooms = Some(4);
        PropertyPatch {
            price: Some(2.0),
            status: Some(PropertyStatus::Sold),
            ..Default::default()
        }
        .apply(&mut p);
        assert_eq!(p.price, Some(2.0));
        assert_eq!(p.bedrooms, Some(4));
        assert_eq!(p.status, PropertyStatus::Sold);
    }

    #[test]
    fn listing_serializes_flat() {
        let listing = PropertyListing::bare(Property::new("Plot"));
        let v = serde_json::to_value(&listing).unwrap();
        assert_eq!(v["title"], "Plot");
        assert_eq!(v["status"], "available");
        assert!(v["project"].is_null());
    }
}
