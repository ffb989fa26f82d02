//! Column-name semantic classification.
//!
//! The synthesizer lowercases each column name and matches it against a fixed
//! substring hint table; a hit selects a persona-appropriate generator for
//! the run's locale. First match wins, so more specific hints (username,
//! company) are listed before the generic ones they contain (name).

/// Semantic role inferred from a column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticKind {
    Email,
    Username,
    Password,
    FirstName,
    LastName,
    FullName,
    Phone,
    Street,
    City,
    State,
    Zip,
    Country,
    Address,
    Company,
    FreeText,
    Url,
}

/// The fixed hint table. Order is significance order.
const HINTS: &[(&[&str], SemanticKind)] = &[
    (&["email", "e_mail"], SemanticKind::Email),
    (&["username", "user_name", "login"], SemanticKind::Username),
    (&["password", "passwd"], SemanticKind::Password),
    (
        &["first_name", "firstname", "given_name", "fname"],
        SemanticKind::FirstName,
    ),
    (
        &["last_name", "lastname", "surname", "family_name", "lname"],
        SemanticKind::LastName,
    ),
    (
        &["company", "organization", "organisation", "employer"],
        SemanticKind::Company,
    ),
    (&["phone", "mobile", "telephone"], SemanticKind::Phone),
    (&["street"], SemanticKind::Street),
    (&["city", "town"], SemanticKind::City),
    (&["state", "province"], SemanticKind::State),
    (&["zip", "postal", "postcode"], SemanticKind::Zip),
    (&["country"], SemanticKind::Country),
    (&["address"], SemanticKind::Address),
    (
        &["description", "comment", "note", "bio"],
        SemanticKind::FreeText,
    ),
    (&["url", "website", "link"], SemanticKind::Url),
    (&["name"], SemanticKind::FullName),
];

/// Classify a column name. Returns `None` when no hint matches; the caller
/// then falls through to the typed generator.
pub fn classify(column_name: &str) -> Option<SemanticKind> {
    let lowered = column_name.to_lowercase();
    HINTS
        .iter()
        .find(|(hints, _)| hints.iter().any(|h| lowered.contains(h)))
        .map(|(_, kind)| *kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_hints() {
        assert_eq!(classify("email"), Some(SemanticKind::Email));
        assert_eq!(classify("contact_email"), Some(SemanticKind::Email));
        assert_eq!(classify("phone_number"), Some(SemanticKind::Phone));
        assert_eq!(classify("billing_city"), Some(SemanticKind::City));
        assert_eq!(classify("zip_code"), Some(SemanticKind::Zip));
        assert_eq!(classify("website_url"), Some(SemanticKind::Url));
    }

    #[test]
    fn test_specific_hints_beat_generic_name() {
        assert_eq!(classify("username"), Some(SemanticKind::Username));
        assert_eq!(classify("first_name"), Some(SemanticKind::FirstName));
        assert_eq!(classify("last_name"), Some(SemanticKind::LastName));
        assert_eq!(classify("company_name"), Some(SemanticKind::Company));
        assert_eq!(classify("display_name"), Some(SemanticKind::FullName));
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("Email"), Some(SemanticKind::Email));
        assert_eq!(classify("FIRST_NAME"), Some(SemanticKind::FirstName));
    }

    #[test]
    fn test_unmatched_returns_none() {
        assert_eq!(classify("quantity"), None);
        assert_eq!(classify("created_at"), None);
        assert_eq!(classify("sku"), None);
    }
}
