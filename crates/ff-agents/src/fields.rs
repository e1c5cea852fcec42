//! Auxiliary foundation data attached to a lookup.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use ff_core::Error;

/// The fixed vocabulary of auxiliary fields.
///
/// Declaration order is the order fields appear in a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuxiliaryField {
    FoundationName,
    Ein,
    #[serde(rename = "foundation_contact")]
    Contact,
    #[serde(rename = "foundation_address")]
    Address,
    #[serde(rename = "foundation_city")]
    City,
    #[serde(rename = "foundation_website_text")]
    WebsiteText,
}

impl AuxiliaryField {
    pub const ALL: [AuxiliaryField; 6] = [
        AuxiliaryField::FoundationName,
        AuxiliaryField::Ein,
        AuxiliaryField::Contact,
        AuxiliaryField::Address,
        AuxiliaryField::City,
        AuxiliaryField::WebsiteText,
    ];

    /// Wire key, as accepted by the HTTP layer.
    pub fn key(self) -> &'static str {
        match self {
            AuxiliaryField::FoundationName => "foundation_name",
            AuxiliaryField::Ein => "ein",
            AuxiliaryField::Contact => "foundation_contact",
            AuxiliaryField::Address => "foundation_address",
            AuxiliaryField::City => "foundation_city",
            AuxiliaryField::WebsiteText => "foundation_website_text",
        }
    }

    /// Label used in the prompt block.
    pub fn label(self) -> &'static str {
        match self {
            AuxiliaryField::FoundationName => "Foundation Name",
            AuxiliaryField::Ein => "EIN",
            AuxiliaryField::Contact => "Contact",
            AuxiliaryField::Address => "Address",
            AuxiliaryField::City => "City",
            AuxiliaryField::WebsiteText => "Known Website Info",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl fmt::Display for AuxiliaryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A filtered set of auxiliary fields. Every stored value is trimmed and non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuxiliaryFields {
    values: BTreeMap<AuxiliaryField, String>,
}

impl AuxiliaryFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only entries whose trimmed value is non-empty.
    pub fn filter<I, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (AuxiliaryField, V)>,
        V: AsRef<str>,
    {
        let values = pairs
            .into_iter()
            .filter_map(|(field, value)| {
                let trimmed = value.as_ref().trim();
                (!trimmed.is_empty()).then(|| (field, trimmed.to_string()))
            })
            .collect();
        Self { values }
    }

    /// Build from string keys, as received over the wire. Unknown keys are rejected.
    pub fn from_raw(raw: HashMap<String, Option<String>>) -> Result<Self, Error> {
        let mut pairs = Vec::with_capacity(raw.len());
        for (key, value) in raw {
            let field = AuxiliaryField::from_key(&key)
                .ok_or_else(|| Error::invalid_input(format!("Unknown foundation data field: {key}")))?;
            if let Some(value) = value {
                pairs.push((field, value));
            }
        }
        Ok(Self::filter(pairs))
    }

    pub fn get(&self, field: AuxiliaryField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Present fields and values, in prompt order.
    pub fn iter(&self) -> impl Iterator<Item = (AuxiliaryField, &str)> {
        self.values.iter().map(|(f, v)| (*f, v.as_str()))
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.values.keys().map(|f| f.key()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_trims_and_drops_blank() {
        let fields = AuxiliaryFields::filter([
            (AuxiliaryField::Ein, "  13-1684331 "),
            (AuxiliaryField::Contact, ""),
            (AuxiliaryField::Address, "   \t"),
            (AuxiliaryField::City, "New York, NY"),
        ]);

        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get(AuxiliaryField::Ein), Some("13-1684331"));
        assert_eq!(fields.get(AuxiliaryField::Contact), None);
        assert_eq!(fields.keys(), vec!["ein", "foundation_city"]);
    }

    #[test]
    fn test_filter_empty_input() {
        let fields = AuxiliaryFields::filter(Vec::<(AuxiliaryField, String)>::new());
        assert!(fields.is_empty());
    }

    #[test]
    fn test_iteration_follows_prompt_order() {
        let fields = AuxiliaryFields::filter([
            (AuxiliaryField::WebsiteText, "fordfoundation.org"),
            (AuxiliaryField::FoundationName, "Ford Foundation"),
            (AuxiliaryField::City, "New York"),
        ]);
        let order: Vec<_> = fields.iter().map(|(f, _)| f).collect();
        assert_eq!(
            order,
            vec![
                AuxiliaryField::FoundationName,
                AuxiliaryField::City,
                AuxiliaryField::WebsiteText
            ]
        );
    }

    #[test]
    fn test_from_raw() {
        let raw = HashMap::from([
            ("ein".to_string(), Some("13-1684331".to_string())),
            ("foundation_contact".to_string(), Some(" ".to_string())),
            ("foundation_city".to_string(), None),
        ]);
        let fields = AuxiliaryFields::from_raw(raw).unwrap();
        assert_eq!(fields.keys(), vec!["ein"]);
    }

    #[test]
    fn test_from_raw_unknown_key() {
        let raw = HashMap::from([("phone".to_string(), Some("555".to_string()))]);
        let err = AuxiliaryFields::from_raw(raw).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_serde_keys_match_wire_keys() {
        for field in AuxiliaryField::ALL {
            let json = serde_json::to_value(field).unwrap();
            assert_eq!(json, field.key());
        }
    }
}
