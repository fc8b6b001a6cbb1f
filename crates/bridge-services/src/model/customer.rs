use serde::{Deserialize, Serialize};

/// A row of the `customers` table.
///
/// Every column but the key is optional and omitted from JSON when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Customer {
    pub fn new(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            ..Self::default()
        }
    }

    pub fn with_contact_name(mut self, contact_name: impl Into<String>) -> Self {
        self.contact_name = Some(contact_name.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Writes `value` into the named column. Returns `false` for an unknown
    /// or read-only column.
    pub fn set_column(&mut self, column: &str, value: &str) -> bool {
        let slot = match column {
            "contact_name" => &mut self.contact_name,
            "city" => &mut self.city,
            "country" => &mut self.country,
            _ => return false,
        };
        *slot = Some(value.to_string());
        true
    }
}

/// Partial customer payload. `None` means "leave this column alone".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl CustomerUpdate {
    /// The partial view laid over `customer_id`. Absent fields stay `None`.
    pub fn onto(self, customer_id: impl Into<String>) -> Customer {
        Customer {
            customer_id: customer_id.into(),
            contact_name: self.contact_name,
            city: self.city,
            country: self.country,
        }
    }
}

/// Payload of `customers.updateCustomer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCustomerRequest {
    #[serde(default)]
    pub customer: CustomerUpdate,
    pub id: String,
}

/// Addresses one customer: either a bare id string or `{"customer_id": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomerKey {
    Bare(String),
    Keyed { customer_id: String },
}

impl CustomerKey {
    pub fn into_id(self) -> String {
        match self {
            CustomerKey::Bare(id) | CustomerKey::Keyed { customer_id: id } => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_fields_are_omitted_from_json() {
        let customer = Customer::new("ALFK").with_city("Berlin");
        assert_eq!(
            serde_json::to_value(&customer).unwrap(),
            json!({"customer_id": "ALFK", "city": "Berlin"})
        );
    }

    #[test]
    fn test_update_keeps_absent_fields_absent() {
        let update: CustomerUpdate = serde_json::from_value(json!({"city": "X"})).unwrap();
        assert_eq!(
            update,
            CustomerUpdate {
                city: Some("X".into()),
                ..CustomerUpdate::default()
            }
        );
        assert_eq!(
            serde_json::to_value(update.onto("ALFK")).unwrap(),
            json!({"customer_id": "ALFK", "city": "X"})
        );
    }

    #[test]
    fn test_key_accepts_both_shapes() {
        let bare: CustomerKey = serde_json::from_value(json!("ALFK")).unwrap();
        let keyed: CustomerKey = serde_json::from_value(json!({"customer_id": "ALFK"})).unwrap();
        assert_eq!(bare.into_id(), "ALFK");
        assert_eq!(keyed.into_id(), "ALFK");
    }

    #[test]
    fn test_set_column_rejects_key_and_unknown_columns() {
        let mut customer = Customer::new("ALFK");
        assert!(customer.set_column("country", "DE"));
        assert!(!customer.set_column("customer_id", "HACK"));
        assert!(!customer.set_column("nope", "x"));
        assert_eq!(customer, Customer::new("ALFK").with_country("DE"));
    }
}
