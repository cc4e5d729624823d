use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CountFilter, contains_ci, normalize_query, within};
use crate::model::{PropertyListing, PropertyStatus, SourceType};

/// Property filter. Every `None` field means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyCriteria {
    pub status: Option<PropertyStatus>,
    /// Compared with `property_code_type`, not the free-text `type`.
    pub code_type: Option<String>,
    pub source_type: Option<SourceType>,
    pub project_id: Option<Uuid>,
    pub bedrooms: Option<CountFilter>,
    pub bathrooms: Option<CountFilter>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_area: Option<f64>,
    pub max_area: Option<f64>,
    pub min_price_per_sqft: Option<f64>,
    pub max_price_per_sqft: Option<f64>,
    pub search: Option<String>,
}

impl PropertyCriteria {
    /// Conjunction with `other`. Where both set a field, `self` wins.
    #[cfg(test)]
    pub fn and(self, other: Self) -> Self {
        Self {
            status: self.status.or(other.status),
            code_type: self.code_type.or(other.code_type),
            source_type: self.source_type.or(other.source_type),
            project_id: self.project_id.or(other.project_id),
            bedrooms: self.bedrooms.or(other.bedrooms),
            bathrooms: self.bathrooms.or(other.bathrooms),
            min_price: self.min_price.or(other.min_price),
            max_price: self.max_price.or(other.max_price),
            min_area: self.min_area.or(other.min_area),
            max_area: self.max_area.or(other.max_area),
            min_price_per_sqft: self.min_price_per_sqft.or(other.min_price_per_sqft),
            max_price_per_sqft: self.max_price_per_sqft.or(other.max_price_per_sqft),
            search: self.search.or(other.search),
        }
    }

    pub fn matches(&self, listing: &PropertyListing) -> bool {
        let p = &listing.property;
        let code_type = self
            .code_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());

        self.status.is_none_or(|s| p.status == s)
            && code_type.is_none_or(|t| p.property_code_type.as_deref() == Some(t))
            && self
                .source_type
                .is_none_or(|s| p.effective_source_type() == s)
            && self.project_id.is_none_or(|id| p.project_id == Some(id))
            && self.bedrooms.is_none_or(|c| c.matches(p.bedrooms))
            && self.bathrooms.is_none_or(|c| c.matches(p.bathrooms))
            && within(p.price, self.min_price, self.max_price)
            && within(p.area, self.min_area, self.max_area)
            && within(
                p.price_per_sqft,
                self.min_price_per_sqft,
                self.max_price_per_sqft,
            )
            && normalize_query(self.search.as_deref()).is_none_or(|q| matches_text(listing, &q))
    }
}

/// `query` must already be lower-cased and trimmed.
pub fn matches_text(listing: &PropertyListing, query: &str) -> bool {
    let p = &listing.property;
    let owner = p.owner_details.as_ref();
    let broker = p.broker_details.as_ref();
    // phone numbers are matched on the raw digits
    let raw_contains = |v: Option<&str>| v.is_some_and(|v| v.contains(query));

    contains_ci(Some(&p.title), query)
        || contains_ci(p.property_code.as_deref(), query)
        || contains_ci(listing.project_name(), query)
        || contains_ci(p.address.as_deref(), query)
        || contains_ci(listing.agent_name(), query)
        || contains_ci(owner.and_then(|o| o.name.as_deref()), query)
        || raw_contains(owner.and_then(|o| o.phone.as_deref()))
        || contains_ci(broker.and_then(|b| b.name.as_deref()), query)
        || raw_contains(broker.and_then(|b| b.phone.as_deref()))
        || contains_ci(p.description.as_deref(), query)
        || contains_ci(p.property_type.as_deref(), query)
        || contains_ci(p.property_code_type.as_deref(), query)
        || contains_ci(Some(p.effective_source_type().as_str()), query)
}

pub fn filter_properties<'a, I>(records: I, criteria: &PropertyCriteria) -> Vec<&'a PropertyListing>
where
    I: IntoIterator<Item = &'a PropertyListing>,
{
    records
        .into_iter()
        .filter(|listing| criteria.matches(listing))
        .collect()
}
