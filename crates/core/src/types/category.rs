//! Product categories.

use serde::{Deserialize, Serialize};

/// The catalog's product categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductCategory {
    Perfume,
    Deodorant,
    BodySpray,
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Perfume => write!(f, "perfume"),
            Self::Deodorant => write!(f, "deodorant"),
            Self::BodySpray => write!(f, "body-spray"),
        }
    }
}

impl std::str::FromStr for ProductCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "perfume" => Ok(Self::Perfume),
            "deodorant" => Ok(Self::Deodorant),
            "body-spray" => Ok(Self::BodySpray),
            _ => Err(format!("invalid product category: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_kebab_case() {
        assert_eq!(
            serde_json::to_string(&ProductCategory::BodySpray).unwrap(),
            "\"body-spray\""
        );
        let parsed: ProductCategory = serde_json::from_str("\"body-spray\"").unwrap();
        assert_eq!(parsed, ProductCategory::BodySpray);
    }

    #[test]
    fn test_from_str_matches_display() {
        for category in [
            ProductCategory::Perfume,
            ProductCategory::Deodorant,
            ProductCategory::BodySpray,
        ] {
            assert_eq!(
                category.to_string().parse::<ProductCategory>().unwrap(),
                category
            );
        }
    }
}
