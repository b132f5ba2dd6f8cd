use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Builds a coordinate from nullable columns, rejecting missing or non-finite values.
    pub fn from_parts(lat: Option<f64>, lon: Option<f64>) -> Option<Self> {
        match (lat, lon) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some(Self { lat, lon }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prospect {
    pub id: i64,
    pub full_name: String,
    pub address: String,
    pub coordinate: Option<Coordinate>,
    pub knock_count: u32,
    pub is_unqualified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub full_name: String,
    pub address: String,
    pub coordinate: Option<Coordinate>,
    pub knock_count: u32,
}

/// A contact as read from the CRM store. Prospects and customers share
/// the fields the aggregator needs; use the accessors rather than matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContactRecord {
    Prospect(Prospect),
    Customer(Customer),
}

impl ContactRecord {
    pub fn id(&self) -> i64 {
        match self {
            ContactRecord::Prospect(p) => p.id,
            ContactRecord::Customer(c) => c.id,
        }
    }

    pub fn full_name(&self) -> &str {
        match self {
            ContactRecord::Prospect(p) => &p.full_name,
            ContactRecord::Customer(c) => &c.full_name,
        }
    }

    pub fn address(&self) -> &str {
        match self {
            ContactRecord::Prospect(p) => &p.address,
            ContactRecord::Customer(c) => &c.address,
        }
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            ContactRecord::Prospect(p) => p.coordinate,
            ContactRecord::Customer(c) => c.coordinate,
        }
    }

    pub fn knock_count(&self) -> u32 {
        match self {
            ContactRecord::Prospect(p) => p.knock_count,
            ContactRecord::Customer(c) => c.knock_count,
        }
    }

    pub fn is_customer(&self) -> bool {
        matches!(self, ContactRecord::Customer(_))
    }

    // Customers are never unqualified.
    pub fn is_unqualified(&self) -> bool {
        match self {
            ContactRecord::Prospect(p) => p.is_unqualified,
            ContactRecord::Customer(_) => false,
        }
    }
}

impl From<Prospect> for ContactRecord {
    fn from(prospect: Prospect) -> Self {
        ContactRecord::Prospect(prospect)
    }
}

impl From<Customer> for ContactRecord {
    fn from(customer: Customer) -> Self {
        ContactRecord::Customer(customer)
    }
}
