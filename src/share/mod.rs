//! Share text for listings and requirements.
//!
//! One template renders both outputs. [`ShareFormat::WhatsApp`] wraps labels
//! in `*bold*` and appends the hashtag footer; [`ShareFormat::Clipboard`]
//! emits the same lines without either.
pub mod inr;

use std::fmt::Display;

pub use inr::format_inr;

use crate::config::ShareConfig;
use crate::model::{PropertyListing, RequirementListing, capitalize};

pub const NOT_AVAILABLE: &str = "N/A";
pub const NOT_SPECIFIED: &str = "Not specified";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareFormat {
    WhatsApp,
    Clipboard,
}

impl ShareFormat {
    pub fn decorate(&self) -> bool {
        matches!(self, Self::WhatsApp)
    }
}

struct Template {
    decorate: bool,
    out: String,
}

impl Template {
    fn new(format: ShareFormat) -> Self {
        Self {
            decorate: format.decorate(),
            out: String::new(),
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.decorate {
            format!("*{text}*")
        } else {
            text.to_string()
        }
    }

    fn heading(&mut self, icon: &str, title: &str) {
        let title = self.bold(title);
        self.out.push_str(&format!("{icon} {title}\n"));
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn line(&mut self, icon: &str, label: &str, value: impl Display) {
        let label = self.bold(&format!("{label}:"));
        self.out.push_str(&format!("{icon} {label} {value}\n"));
    }

    /// Label on its own line followed by the body; nothing at all when `body` is empty.
    fn block(&mut self, icon: &str, label: &str, body: Option<&str>) {
        let Some(body) = body.map(str::trim_end).filter(|b| !b.trim().is_empty()) else {
            return;
        };
        let label = self.bold(&format!("{label}:"));
        self.out.push_str(&format!("\n{icon} {label}\n{body}\n"));
    }

    fn footer(mut self, brand: &str, hashtags: &str) -> String {
        self.blank();
        let brand = self.bold(brand);
        self.out.push_str(&format!("🏢 {brand}"));
        if self.decorate && !hashtags.trim().is_empty() {
            self.out.push('\n');
            self.out.push_str(hashtags.trim());
        }
        self.out
    }
}

fn or_na<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}

fn text_or_na(value: Option<&str>) -> String {
    or_na(value.map(str::trim).filter(|v| !v.is_empty()))
}

/// Renders a property listing.
pub fn property_text(listing: &PropertyListing, format: ShareFormat, cfg: &ShareConfig) -> String {
    let p = &listing.property;
    let mut t = Template::new(format);

    t.heading("🏠", &p.title);
    t.blank();
    t.line("🔢", "Property Code", text_or_na(p.property_code.as_deref()));
    t.line("💰", "Price", or_na(p.price.map(format_inr)));
    let location = listing.project.as_ref().map(|proj| match &proj.location {
        Some(loc) if !loc.trim().is_empty() => format!("{}, {}", proj.name, loc.trim()),
        _ => proj.name.clone(),
    });
    t.line("📍", "Location", or_na(location));
    t.line("🏡", "Type", text_or_na(p.property_type.as_deref()));
    t.line("🛏️", "Bedrooms", or_na(p.bedrooms));
    t.line("🚿", "Bathrooms", or_na(p.bathrooms));
    t.line("📐", "Area", or_na(p.area.map(|a| format!("{a} sqft"))));
    t.line("👨‍💼", "Agent", text_or_na(listing.agent_name()));
    t.line(
        "📧",
        "Contact",
        text_or_na(listing.agent.as_ref().and_then(|a| a.email.as_deref())),
    );

    t.block("📝", "Description", p.description.as_deref());
    t.block("📍", "Address", p.address.as_deref());
    t.block("🌐", "Location URL", p.location_url.as_deref());
    for (icon, role, details) in [
        ("👤", "Owner", p.owner_details.as_ref()),
        ("🏢", "Broker", p.broker_details.as_ref()),
    ] {
        if let Some(d) = details.filter(|d| !d.is_empty()) {
            t.blank();
            t.line(icon, role, text_or_na(d.name.as_deref()));
            t.line("📞", &format!("{role} Phone"), text_or_na(d.phone.as_deref()));
        }
    }

    t.blank();
    t.line("💰", "Price per Sq Ft", or_na(p.price_per_sqft.map(format_inr)));
    t.line("📊", "Status", capitalize(p.status.as_str()));

    t.footer(&cfg.brand, &cfg.property_hashtags)
}

/// Renders a customer requirement. Absent wants read "Not specified".
pub fn requirement_text(
    listing: &RequirementListing,
    format: ShareFormat,
    cfg: &ShareConfig,
) -> String {
    let r = &listing.requirement;
    let wanted = |v: Option<String>| v.unwrap_or_else(|| NOT_SPECIFIED.to_string());
    let mut t = Template::new(format);

    t.heading("📋", &r.title);
    t.blank();
    t.line("👤", "Customer", text_or_na(Some(r.customer_name.as_str())));
    t.line("📞", "Phone", text_or_na(Some(r.customer_phone.as_str())));
    if let Some(email) = r.customer_email.as_deref().filter(|e| !e.trim().is_empty()) {
        t.line("📧", "Email", email.trim());
    }

    t.blank();
    t.line("🏡", "Property Type", text_or_na(r.property_type.as_deref()));
    t.line("💰", "Budget", wanted(r.price.map(format_inr)));
    t.line("🛏️", "Bedrooms", wanted(r.bedrooms.map(|b| b.to_string())));
    t.line("🚿", "Bathrooms", wanted(r.bathrooms.map(|b| b.to_string())));
    t.line("📐", "Area", wanted(r.area.map(|a| format!("{a} sqft"))));

    let locations = if r.preferred_locations.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        r.preferred_locations
            .iter()
            .map(|l| format!("  • {l}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    t.block("📍", "Preferred Locations", Some(locations.as_str()));

    t.blank();
    t.line("🚨", "Priority", capitalize(r.priority.as_str()));
    t.line("📊", "Status", capitalize(r.status.as_str()));

    t.block("📝", "Description", r.description.as_deref());
    t.block("📌", "Notes", r.notes.as_deref());
    if let Some(agent) = &listing.assigned_agent {
        t.blank();
        t.line("👨‍💼", "Assigned Agent", &agent.name);
    }

    t.footer(&cfg.brand, &cfg.requirement_hashtags)
}

pub fn format_whatsapp(listing: &PropertyListing, cfg: &ShareConfig) -> String {
    property_text(listing, ShareFormat::WhatsApp, cfg)
}

pub fn format_clipboard(listing: &PropertyListing, cfg: &ShareConfig) -> String {
    property_text(listing, ShareFormat::Clipboard, cfg)
}

/// Click-to-chat link carrying `message`.
pub fn whatsapp_url(message: &str) -> String {
    format!("https://wa.me/?text={}", urlencoding::encode(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AgentRef, ContactDetails, Priority, ProjectRef, Property, PropertyStatus, Requirement,
    };

    fn full_listing() -> PropertyListing {
        let mut p = Property::new("3BR Apt");
        p.property_code = Some("NA007".into());
        p.price = Some(4_500_000.0);
        p.property_type = Some("Apartment".into());
        p.bedrooms = Some(3);
        p.bathrooms = Some(0);
        p.area = Some(1450.0);
        p.description = Some("Corner flat, park facing".into());
        p.address = Some("Flat 1203, Tower B".into());
        p.location_url = Some("https://maps.example/abc".into());
        p.owner_details = Some(ContactDetails {
            name: Some("Sunil".into()),
            phone: None,
        });
        p.price_per_sqft = Some(3103.45);
        p.status = PropertyStatus::Pending;
        PropertyListing {
            property: p,
            project: Some(ProjectRef {
                name: "Skyline".into(),
                location: Some("Wakad".into()),
            }),
            agent: Some(AgentRef {
                name: "Ritu".into(),
                email: Some("ritu@example.com".into()),
            }),
        }
    }

    #[test]
    fn whatsapp_full_listing() {
        let text = format_whatsapp(&full_listing(), &ShareConfig::default());
        let expected = "\
🏠 *3BR Apt*

🔢 *Property Code:* NA007
💰 *Price:* ₹45,00,000
📍 *Location:* Skyline, Wakad
🏡 *Type:* Apartment
🛏️ *Bedrooms:* 3
🚿 *Bathrooms:* 0
📐 *Area:* 1450 sqft
👨‍💼 *Agent:* Ritu
📧 *Contact:* ritu@example.com

📝 *Description:*
Corner flat, park facing

📍 *Address:*
Flat 1203, Tower B

🌐 *Location URL:*
https://maps.example/abc

👤 *Owner:* Sunil
📞 *Owner Phone:* N/A

💰 *Price per Sq Ft:* ₹3,103.45
📊 *Status:* Pending

🏢 *Realty Desk*
#PropertyForSale #RealEstate";
        assert_eq!(text, expected);
    }

    #[test]
    fn clipboard_is_undecorated_copy() {
        let cfg = ShareConfig::default();
        let listing = full_listing();
        let whatsapp = format_whatsapp(&listing, &cfg);
        let clipboard = format_clipboard(&listing, &cfg);

        assert!(!clipboard.contains('*'));
        assert!(!clipboard.contains('#'));
        let stripped = whatsapp.replace('*', "");
        let without_tags = stripped
            .strip_suffix("\n#PropertyForSale #RealEstate")
            .unwrap();
        assert_eq!(without_tags, clipboard);
    }

    #[test]
    fn absent_scalars_render_na_once_each() {
        let listing = PropertyListing::bare(Property::new("Bare plot"));
        let cfg = ShareConfig::default();
        for format in [ShareFormat::WhatsApp, ShareFormat::Clipboard] {
            let text = property_text(&listing, format, &cfg);
            // code, price, location, type, bedrooms, bathrooms, area, agent, contact, price/sqft
            assert_eq!(text.matches(NOT_AVAILABLE).count(), 10, "{text}");
            assert!(!text.contains("Description"));
            assert!(!text.contains("Owner"));
            assert!(!text.contains("Broker"));
            assert!(text.contains("Status:") && text.contains("Available"));
        }
    }

    #[test]
    fn populated_fields_appear_in_both() {
        let listing = full_listing();
        let cfg = ShareConfig::default();
        for text in [
            format_whatsapp(&listing, &cfg),
            format_clipboard(&listing, &cfg),
        ] {
            for needle in [
                "NA007",
                "₹45,00,000",
                "Skyline, Wakad",
                "Apartment",
                "1450 sqft",
                "Ritu",
                "ritu@example.com",
                "Corner flat",
                "Flat 1203",
                "https://maps.example/abc",
                "Sunil",
                "Pending",
            ] {
                assert!(text.contains(needle), "missing {needle}");
            }
        }
    }

    #[test]
    fn requirement_template() {
        let mut r = Requirement::new("2BHK near IT park", "Meera", "9876543210");
        r.priority = Priority::Urgent;
        r.price = Some(6_500_000.0);
        r.preferred_locations = vec!["Baner".into(), "Balewadi".into()];
        let listing = RequirementListing::bare(r);
        let cfg = ShareConfig::default();

        let text = requirement_text(&listing, ShareFormat::WhatsApp, &cfg);
        assert!(text.starts_with("📋 *2BHK near IT park*\n"));
        assert!(text.contains("💰 *Budget:* ₹65,00,000"));
        assert!(text.contains("🛏️ *Bedrooms:* Not specified"));
        assert!(text.contains("📍 *Preferred Locations:*\n  • Baner\n  • Balewadi\n"));
        assert!(text.contains("🚨 *Priority:* Urgent"));
        assert!(!text.contains("Email"));
        assert!(text.ends_with("#PropertyRequirement #RealEstate"));

        let plain = requirement_text(&listing, ShareFormat::Clipboard, &cfg);
        assert!(!plain.contains('*'));
        assert!(plain.ends_with("🏢 Realty Desk"));
    }

    #[test]
    fn whatsapp_url_is_percent_encoded() {
        assert_eq!(
            whatsapp_url("Hi *there*\n#tag"),
            "https://wa.me/?text=Hi%20%2Athere%2A%0A%23tag"
        );
    }
}
