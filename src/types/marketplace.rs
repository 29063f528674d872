use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Marketplaces a credential can be scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Marketplace {
    AmazonAe,
    NoonAe,
}

impl Marketplace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Marketplace::AmazonAe => "AMAZON_AE",
            Marketplace::NoonAe => "NOON_AE",
        }
    }

    /// Prefix used when generating client ids, e.g. `amazon_ae_<random>`.
    pub fn client_id_prefix(&self) -> &'static str {
        match self {
            Marketplace::AmazonAe => "amazon_ae",
            Marketplace::NoonAe => "noon_ae",
        }
    }
}

impl fmt::Display for Marketplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Marketplace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AMAZON_AE" => Ok(Marketplace::AmazonAe),
            "NOON_AE" => Ok(Marketplace::NoonAe),
            other => Err(format!("unknown marketplace `{other}`")),
        }
    }
}

/// Entity kind carried by the `data_type` field of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Products,
    Orders,
    Inventory,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Products => "products",
            DataType::Orders => "orders",
            DataType::Inventory => "inventory",
        }
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "products" => Ok(DataType::Products),
            "orders" => Ok(DataType::Orders),
            "inventory" => Ok(DataType::Inventory),
            other => Err(format!("unknown data type `{other}`")),
        }
    }
}
