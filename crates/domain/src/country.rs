//! Country reference data.

use common::CountryId;
use persistence::{Entity, UniqueKey};
use serde::{Deserialize, Serialize};

use crate::ValidationError;
use crate::error::required;

/// A country customers live in and carts ship to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,

    /// Upper-case country code, e.g. "UK".
    pub code: String,
    pub name: String,
}

impl Country {
    /// Creates a country, normalizing the code to upper case.
    pub fn create(code: &str, name: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            id: CountryId::new(),
            code: required("code", code)?.to_uppercase(),
            name: required("name", name)?,
        })
    }
}

impl Entity for Country {
    type Id = CountryId;

    fn entity_type() -> &'static str {
        "Country"
    }

    fn id(&self) -> &CountryId {
        &self.id
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new("country_code", self.code.clone())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_normalizes_code() {
        let country = Country::create(" uk ", "United Kingdom").unwrap();
        assert_eq!(country.code, "UK");
        assert_eq!(country.name, "United Kingdom");
    }

    #[test]
    fn test_create_rejects_blank_code() {
        let result = Country::create("  ", "Nowhere");
        assert_eq!(result, Err(ValidationError::EmptyField { field: "code" }));
    }
}
