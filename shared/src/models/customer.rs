//! Customer directory models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_not_blank;

/// A customer the shop sells to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A customer as submitted for registration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct NewCustomer {
    #[validate(
        length(max = 200, message = "Name must be at most 200 characters"),
        custom = "validate_not_blank"
    )]
    pub name: String,

    #[validate(
        email(message = "Email address is not valid"),
        length(max = 254, message = "Email must be at most 254 characters")
    )]
    pub email: Option<String>,

    #[validate(length(max = 30, message = "Phone must be at most 30 characters"))]
    pub phone: Option<String>,
}

impl NewCustomer {
    pub fn into_customer(self, id: Uuid, now: DateTime<Utc>) -> Customer {
        Customer {
            id,
            name: self.name,
            email: self.email.filter(|e| !e.trim().is_empty()),
            phone: self.phone.filter(|p| !p.trim().is_empty()),
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_contact_fields_are_dropped() {
        let input = NewCustomer {
            name: "Café Norte".to_string(),
            email: Some(String::new()),
            phone: Some("  ".to_string()),
        };
        let now = Utc::now();
        let customer = input.into_customer(Uuid::nil(), now);
        assert_eq!(customer.email, None);
        assert_eq!(customer.phone, None);
        assert_eq!(customer.created_at, now);
    }
}
