//! Records shared by the store, the listing engines and the HTTP layer.
pub mod de;
pub mod profile;
pub mod project;
pub mod property;
pub mod requirement;

pub use profile::{Profile, Role};
pub use project::{NewProject, Project};
pub use property::{
    AgentRef, ContactDetails, NewProperty, Property, PropertyListing, PropertyPatch,
    PropertyStatus, ProjectRef, SourceType,
};
pub use requirement::{
    NewRequirement, Priority, Requirement, RequirementListing, RequirementPatch,
    RequirementStatus,
};

/// Upper-cases the first character, leaving the rest untouched.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Treats whitespace-only strings as absent.
pub(crate) fn non_blank(s: Option<String>) -> Option<String> {
    s.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_handles_empty_and_ascii() {
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("available"), "Available");
        assert_eq!(capitalize("Sold"), "Sold");
    }

    #[test]
    fn non_blank_trims() {
        assert_eq!(non_blank(Some("  a ".into())), Some("a".into()));
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(None), None);
    }
}
