use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{contains_ci, normalize_query};
use crate::model::{Priority, RequirementListing, RequirementStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequirementCriteria {
    pub status: Option<RequirementStatus>,
    pub priority: Option<Priority>,
    pub property_type: Option<String>,
    pub assigned_agent_id: Option<Uuid>,
    /// Only requirements nobody has picked up yet.
    pub unassigned_only: bool,
    pub search: Option<String>,
}

impl RequirementCriteria {
    pub fn matches(&self, listing: &RequirementListing) -> bool {
        let r = &listing.requirement;
        let property_type = self
            .property_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());

        self.status.is_none_or(|s| r.status == s)
            && self.priority.is_none_or(|p| r.priority == p)
            && property_type.is_none_or(|t| {
                r.property_type
                    .as_deref()
                    .is_some_and(|v| v.eq_ignore_ascii_case(t))
            })
            && self
                .assigned_agent_id
                .is_none_or(|id| r.assigned_agent_id == Some(id))
            && (!self.unassigned_only || r.assigned_agent_id.is_none())
            && normalize_query(self.search.as_deref()).is_none_or(|q| {
                contains_ci(Some(&r.title), &q)
                    || contains_ci(Some(&r.customer_name), &q)
                    || r.customer_phone.contains(q.as_str())
                    || contains_ci(r.customer_email.as_deref(), &q)
            })
    }
}

pub fn filter_requirements<'a, I>(
    records: I,
    criteria: &RequirementCriteria,
) -> Vec<&'a RequirementListing>
where
    I: IntoIterator<Item = &'a RequirementListing>,
{
    records
        .into_iter()
        .filter(|listing| criteria.matches(listing))
        .collect()
}
