use serde::Serialize;

use crate::model::{Profile, Project, PropertyListing, PropertyStatus, Role};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_agents: usize,
    pub total_projects: usize,
    pub total_properties: usize,
    pub available_properties: usize,
    pub pending_properties: usize,
    pub sold_properties: usize,
    pub recent_properties: Vec<PropertyListing>,
}

/// Dashboard counters over a snapshot. `properties` is expected newest first.
pub fn dashboard_stats(
    profiles: &[Profile],
    projects: &[Project],
    properties: &[PropertyListing],
    recent: usize,
) -> DashboardStats {
    let count_status = |status: PropertyStatus| {
        properties
            .iter()
            .filter(|l| l.property.status == status)
            .count()
    };

    DashboardStats {
        total_agents: profiles.iter().filter(|p| p.role == Role::Agent).count(),
        total_projects: projects.len(),
        total_properties: properties.len(),
        available_properties: count_status(PropertyStatus::Available),
        pending_properties: count_status(PropertyStatus::Pending),
        sold_properties: count_status(PropertyStatus::Sold),
        recent_properties: properties.iter().take(recent).cloned().collect(),
    }
}
