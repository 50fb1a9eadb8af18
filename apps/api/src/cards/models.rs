use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Contact fields read off a business card.
///
/// Every field is always a string; absent values are empty, never null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactRecord {
    pub name: String,
    pub company: String,
    pub department: String,
    pub position: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    /// Public reference to the uploaded card image.
    pub image_url: String,
    /// The LLM reply the fields were extracted from.
    pub raw_text: String,
}

/// The seven contact fields in display/export order.
pub const CONTACT_FIELDS: [&str; 7] = [
    "name",
    "company",
    "department",
    "position",
    "phone",
    "email",
    "address",
];

impl ContactRecord {
    /// Mutable slot for one of [`CONTACT_FIELDS`].
    pub fn field_mut(&mut self, field: &str) -> Option<&mut String> {
        match field {
            "name" => Some(&mut self.name),
            "company" => Some(&mut self.company),
            "department" => Some(&mut self.department),
            "position" => Some(&mut self.position),
            "phone" => Some(&mut self.phone),
            "email" => Some(&mut self.email),
            "address" => Some(&mut self.address),
            _ => None,
        }
    }

    /// Contact field values in [`CONTACT_FIELDS`] order.
    pub fn contact_values(&self) -> [&str; 7] {
        [
            self.name.as_str(),
            self.company.as_str(),
            self.department.as_str(),
            self.position.as_str(),
            self.phone.as_str(),
            self.email.as_str(),
            self.address.as_str(),
        ]
    }

    /// True when no contact field carries a value.
    pub fn is_blank(&self) -> bool {
        self.contact_values().iter().all(|v| v.trim().is_empty())
    }
}

/// A saved record. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRecord {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: ContactRecord,
}
