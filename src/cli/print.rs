use crate::filter::DashboardStats;
use crate::model::{Profile, Project, PropertyListing, RequirementListing};
use crate::share::format_inr;
use crate::suggest::Suggestion;

fn or_dash(v: Option<&str>) -> &str {
    v.unwrap_or("-")
}

pub fn properties(listings: &[PropertyListing]) {
    if listings.is_empty() {
        println!("No properties found");
        return;
    }
    for l in listings {
        let p = &l.property;
        println!(
            "{:<10} {:<9} {:>14}  {}  [{}] {}",
            or_dash(p.property_code.as_deref()),
            p.status.as_str(),
            p.price.map(format_inr).unwrap_or_else(|| "-".into()),
            p.title,
            or_dash(l.project_name()),
            p.id
        );
    }
    println!("{} properties", listings.len());
}

pub fn requirements(listings: &[RequirementListing]) {
    if listings.is_empty() {
        println!("No requirements found");
        return;
    }
    for l in listings {
        let r = &l.requirement;
        println!(
            "{:<8} {:<9} {}  ({} {})  agent: {}  {}",
            r.priority.as_str(),
            r.status.as_str(),
            r.title,
            r.customer_name,
            r.customer_phone,
            or_dash(l.assigned_agent.as_ref().map(|a| a.name.as_str())),
            r.id
        );
    }
    println!("{} requirements", listings.len());
}

pub fn suggestions(hints: &[Suggestion]) {
    for s in hints {
        println!("{:<8} {}", s.label(), s.text);
    }
}

pub fn stats(s: &DashboardStats) {
    println!("Agents:     {}", s.total_agents);
    println!("Projects:   {}", s.total_projects);
    println!(
        "Properties: {} ({} available, {} pending, {} sold)",
        s.total_properties, s.available_properties, s.pending_properties, s.sold_properties
    );
    if !s.recent_properties.is_empty() {
        println!("\nRecent:");
        properties(&s.recent_properties);
    }
}

pub fn profiles(profiles: &[Profile]) {
    for p in profiles {
        println!("{}  {:<6} {} <{}>", p.id, p.role.as_str(), p.name, p.email);
    }
}

pub fn projects(projects: &[Project]) {
    for p in projects {
        println!("{}  {}  {}", p.id, p.name, or_dash(p.location.as_deref()));
    }
}
