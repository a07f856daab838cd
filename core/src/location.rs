//! Pickup and dropoff parties.

use std::collections::BTreeMap;
use std::fmt;

/// Form fields sent to the service. `None` values are left out of the
/// encoded body.
pub type PostFields = BTreeMap<String, Option<String>>;

/// A pickup or dropoff party.
///
/// `name`, `address` and `phone_number` are required by the service but are
/// kept optional here so an incomplete location can be represented;
/// `is_valid` reports whether it may be submitted. Fields are fixed once
/// built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    name: Option<String>,
    address: Option<String>,
    phone_number: Option<String>,
    business_name: Option<String>,
    notes: Option<String>,
}

impl Location {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            address: Some(address.into()),
            phone_number: Some(phone_number.into()),
            business_name: None,
            notes: None,
        }
    }

    /// A location that may lack required fields. `create` refuses to submit
    /// a delivery whose pickup or dropoff is incomplete.
    pub fn partial(
        name: Option<String>,
        address: Option<String>,
        phone_number: Option<String>,
    ) -> Self {
        Self {
            name,
            address,
            phone_number,
            business_name: None,
            notes: None,
        }
    }

    pub fn with_business_name(mut self, business_name: impl Into<String>) -> Self {
        self.business_name = Some(business_name.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref()
    }

    pub fn business_name(&self) -> Option<&str> {
        self.business_name.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn is_valid(&self) -> bool {
        self.name.is_some() && self.address.is_some() && self.phone_number.is_some()
    }

    /// `{prefix}_name`, `{prefix}_address`, `{prefix}_phone_number`,
    /// `{prefix}_business_name` and `{prefix}_notes`, values verbatim.
    pub fn to_post_fields(&self, prefix: &str) -> PostFields {
        let mut fields = PostFields::new();
        fields.insert(format!("{prefix}_name"), self.name.clone());
        fields.insert(format!("{prefix}_address"), self.address.clone());
        fields.insert(format!("{prefix}_phone_number"), self.phone_number.clone());
        fields.insert(format!("{prefix}_business_name"), self.business_name.clone());
        fields.insert(format!("{prefix}_notes"), self.notes.clone());
        fields
    }

    /// Inverse of `to_post_fields`. Missing keys become `None`; keys with
    /// another prefix are ignored.
    pub fn from_post_fields(prefix: &str, fields: &PostFields) -> Self {
        let take = |suffix: &str| fields.get(&format!("{prefix}_{suffix}")).cloned().flatten();
        Self {
            name: take("name"),
            address: take("address"),
            phone_number: take("phone_number"),
            business_name: take("business_name"),
            notes: take("notes"),
        }
    }
}

fn or_none(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("None")
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name (required): {}", or_none(&self.name))?;
        writeln!(f, "Address (required): {}", or_none(&self.address))?;
        writeln!(f, "Phone Number (required): {}", or_none(&self.phone_number))?;
        writeln!(f, "Business Name (optional): {}", or_none(&self.business_name))?;
        write!(f, "Notes (optional): {}", or_none(&self.notes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> Location {
        Location::new("Alice", "20 McAllister St, San Francisco, CA", "415-555-0100")
            .with_business_name("Alice's Bakery")
            .with_notes("Ring twice")
    }

    #[test]
    fn valid_with_required_fields_only() {
        let loc = Location::new("Bob", "101 Market St", "415-555-0101");
        assert!(loc.is_valid());
        assert!(full().is_valid());
    }

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn invalid_when_any_required_field_missing() {
        let loc = Location::partial(None, some("20 McAllister St"), some("415-555-0100"));
        assert!(!loc.is_valid());

        let loc = Location::partial(some("Alice"), None, some("415-555-0100"));
        assert!(!loc.is_valid());

        let loc = Location::partial(some("Alice"), some("20 McAllister St"), None);
        assert!(!loc.is_valid());

        assert!(!Location::default().is_valid());
    }

    #[test]
    fn partial_with_all_required_fields_matches_new() {
        let loc = Location::partial(some("Bob"), some("101 Market St"), some("415-555-0101"));
        assert!(loc.is_valid());
        assert_eq!(loc, Location::new("Bob", "101 Market St", "415-555-0101"));
    }

    #[test]
    fn getters_expose_fields() {
        let loc = full();
        assert_eq!(loc.name(), Some("Alice"));
        assert_eq!(loc.address(), Some("20 McAllister St, San Francisco, CA"));
        assert_eq!(loc.phone_number(), Some("415-555-0100"));
        assert_eq!(loc.business_name(), Some("Alice's Bakery"));
        assert_eq!(loc.notes(), Some("Ring twice"));

        let sparse = Location::partial(None, some("1 Main St"), None);
        assert_eq!(sparse.name(), None);
        assert_eq!(sparse.phone_number(), None);
        assert_eq!(sparse.notes(), None);
    }

    #[test]
    fn post_fields_are_prefixed() {
        let fields = full().to_post_fields("pickup");
        assert_eq!(fields.len(), 5);
        assert_eq!(fields["pickup_name"].as_deref(), Some("Alice"));
        assert_eq!(fields["pickup_phone_number"].as_deref(), Some("415-555-0100"));
        assert_eq!(fields["pickup_notes"].as_deref(), Some("Ring twice"));

        let fields = Location::new("Bob", "101 Market St", "415-555-0101").to_post_fields("dropoff");
        assert_eq!(fields["dropoff_business_name"], None);
        assert_eq!(fields["dropoff_notes"], None);
    }

    #[test]
    fn post_fields_extract_back_to_same_location() {
        let original = full();
        let fields = original.to_post_fields("pickup");
        assert_eq!(Location::from_post_fields("pickup", &fields), original);

        let sparse = Location::partial(some("Carol"), None, None).with_notes("Side door");
        let fields = sparse.to_post_fields("dropoff");
        assert_eq!(Location::from_post_fields("dropoff", &fields), sparse);
    }

    #[test]
    fn extraction_ignores_other_prefix() {
        let mut fields = full().to_post_fields("pickup");
        fields.extend(Location::new("Dan", "1 Main St", "555").to_post_fields("dropoff"));
        assert_eq!(Location::from_post_fields("dropoff", &fields).name(), Some("Dan"));
        assert_eq!(Location::from_post_fields("pickup", &fields), full());
    }

    #[test]
    fn display_marks_missing_fields() {
        let rendered = Location::default().to_string();
        assert!(rendered.contains("Name (required): None"));

        let rendered = Location::partial(some("Alice"), None, some("415-555-0100")).to_string();
        assert!(rendered.contains("Name (required): Alice"));
        assert!(rendered.contains("Address (required): None"));
    }
}
