//! Conversions between domain records and SeaORM models.
use sea_orm::Set;

use crate::model::{
    ContactDetails, Profile, Project, Property, PropertyStatus, Requirement, SourceType,
};
use crate::store::entities::{profile, project, property, requirement};
use crate::store::error::StoreError;

pub fn property_to_active_model(p: &Property) -> property::ActiveModel {
    let (owner_name, owner_phone) = split_contact(p.owner_details.as_ref());
    let (broker_name, broker_phone) = split_contact(p.broker_details.as_ref());
    // Vec<String> always serializes
    let images = serde_json::to_string(&p.images).unwrap_or_else(|_| "[]".to_string());

    property::ActiveModel {
        id: Set(p.id),
        project_id: Set(p.project_id),
        agent_id: Set(p.agent_id),
        title: Set(p.title.clone()),
        property_type: Set(p.property_type.clone()),
        price: Set(p.price),
        description: Set(p.description.clone()),
        bedrooms: Set(p.bedrooms),
        bathrooms: Set(p.bathrooms),
        area: Set(p.area),
        address: Set(p.address.clone()),
        status: Set(p.status.as_str().to_string()),
        images: Set(images),
        property_code: Set(p.property_code.clone()),
        property_code_type: Set(p.property_code_type.clone()),
        owner_name: Set(owner_name),
        owner_phone: Set(owner_phone),
        broker_name: Set(broker_name),
        broker_phone: Set(broker_phone),
        price_per_sqft: Set(p.price_per_sqft),
        location_url: Set(p.location_url.clone()),
        source_type: Set(p.source_type.map(|s| s.as_str().to_string())),
        created_at: Set(p.created_at),
        updated_at: Set(p.updated_at),
    }
}

pub fn model_to_property(m: property::Model) -> Result<Property, StoreError> {
    let status = m
        .status
        .parse::<PropertyStatus>()
        .map_err(|e| StoreError::corrupt("properties", m.id, e))?;
    let source_type = m
        .source_type
        .as_deref()
        .map(str::parse::<SourceType>)
        .transpose()
        .map_err(|e| StoreError::corrupt("properties", m.id, e))?;
    let images: Vec<String> = serde_json::from_str(&m.images)
        .map_err(|e| StoreError::corrupt("properties", m.id, e))?;

    Ok(Property {
        id: m.id,
        project_id: m.project_id,
        agent_id: m.agent_id,
        title: m.title,
        property_type: m.property_type,
        price: m.price,
        description: m.description,
        bedrooms: m.bedrooms,
        bathrooms: m.bathrooms,
        area: m.area,
        address: m.address,
        status,
        images,
        property_code: m.property_code,
        property_code_type: m.property_code_type,
        owner_details: join_contact(m.owner_name, m.owner_phone),
        broker_details: join_contact(m.broker_name, m.broker_phone),
        price_per_sqft: m.price_per_sqft,
        location_url: m.location_url,
        source_type,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn split_contact(details: Option<&ContactDetails>) -> (Option<String>, Option<String>) {
    match details {
        Some(d) => (d.name.clone(), d.phone.clone()),
        None => (None, None),
    }
}

fn join_contact(name: Option<String>, phone: Option<String>) -> Option<ContactDetails> {
    ContactDetails { name, phone }.normalized()
}

pub fn project_to_active_model(p: &Project) -> project::ActiveModel {
    project::ActiveModel {
        id: Set(p.id),
        name: Set(p.name.clone()),
        location: Set(p.location.clone()),
        description: Set(p.description.clone()),
        created_by: Set(p.created_by),
        created_at: Set(p.created_at),
    }
}

pub fn model_to_project(m: project::Model) -> Project {
    Project {
        id: m.id,
        name: m.name,
        location: m.location,
        description: m.description,
        created_by: m.created_by,
        created_at: m.created_at,
    }
}

pub fn profile_to_active_model(p: &Profile) -> profile::ActiveModel {
    profile::ActiveModel {
        id: Set(p.id),
        name: Set(p.name.clone()),
        email: Set(p.email.clone()),
        role: Set(p.role.as_str().to_string()),
        created_at: Set(p.created_at),
    }
}

pub fn model_to_profile(m: profile::Model) -> Result<Profile, StoreError> {
    let role = m
        .role
        .parse()
        .map_err(|e| StoreError::corrupt("profiles", m.id, e))?;
    Ok(Profile {
        id: m.id,
        name: m.name,
        email: m.email,
        role,
        created_at: m.created_at,
    })
}

pub fn requirement_to_active_model(r: &Requirement) -> requirement::ActiveModel {
    let locations =
        serde_json::to_string(&r.preferred_locations).unwrap_or_else(|_| "[]".to_string());

    requirement::ActiveModel {
        id: Set(r.id),
        title: Set(r.title.clone()),
        description: Set(r.description.clone()),
        customer_name: Set(r.customer_name.clone()),
        customer_phone: Set(r.customer_phone.clone()),
        customer_email: Set(r.customer_email.clone()),
        property_type: Set(r.property_type.clone()),
        price: Set(r.price),
        bedrooms: Set(r.bedrooms),
        bathrooms: Set(r.bathrooms),
        area: Set(r.area),
        preferred_locations: Set(locations),
        priority: Set(r.priority.as_str().to_string()),
        status: Set(r.status.as_str().to_string()),
        assigned_agent_id: Set(r.assigned_agent_id),
        notes: Set(r.notes.clone()),
        created_by: Set(r.created_by),
        created_at: Set(r.created_at),
        updated_at: Set(r.updated_at),
    }
}

pub fn model_to_requirement(m: requirement::Model) -> Result<Requirement, StoreError> {
    let table = "property_requirements";
    let priority = m
        .priority
        .parse()
        .map_err(|e| StoreError::corrupt(table, m.id, e))?;
    let status = m
        .status
        .parse()
        .map_err(|e| StoreError::corrupt(table, m.id, e))?;
    let preferred_locations: Vec<String> = serde_json::from_str(&m.preferred_locations)
        .map_err(|e| StoreError::corrupt(table, m.id, e))?;

    Ok(Requirement {
        id: m.id,
        title: m.title,
        description: m.description,
        customer_name: m.customer_name,
        customer_phone: m.customer_phone,
        customer_email: m.customer_email,
        property_type: m.property_type,
        price: m.price,
        bedrooms: m.bedrooms,
        bathrooms: m.bathrooms,
        area: m.area,
        preferred_locations,
        priority,
        status,
        assigned_agent_id: m.assigned_agent_id,
        notes: m.notes,
        created_by: m.created_by,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;

    #[test]
    fn contact_columns_round_trip() {
        let mut p = Property::new("Row house");
        p.owner_details = Some(ContactDetails {
            name: Some("Ravi".into()),
            phone: None,
        });
        let am = property_to_active_model(&p);
        assert_eq!(am.owner_name, ActiveValue::Set(Some("Ravi".to_string())));
        assert_eq!(am.owner_phone, ActiveValue::Set(None));
        assert_eq!(am.broker_name, ActiveValue::Set(None));
    }

    #[test]
    fn corrupt_status_is_reported() {
        let p = Property::new("Bad row");
        let mut m = property::Model {
            id: p.id,
            project_id: None,
            agent_id: None,
            title: p.title.clone(),
            property_type: None,
            price: None,
            description: None,
            bedrooms: None,
            bathrooms: None,
            area: None,
            address: None,
            status: "listed".into(),
            images: "[]".into(),
            property_code: None,
            property_code_type: None,
            owner_name: None,
            owner_phone: None,
            broker_name: None,
            broker_phone: None,
            price_per_sqft: None,
            location_url: None,
            source_type: None,
            created_at: p.created_at,
            updated_at: p.updated_at,
        };
        assert!(matches!(
            model_to_property(m.clone()),
            Err(StoreError::Corrupt { table: "properties", .. })
        ));
        m.status = "sold".into();
        assert_eq!(model_to_property(m).unwrap().status, PropertyStatus::Sold);
    }
}
