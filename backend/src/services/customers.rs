//! Customer directory service

use shared::{validate_customer, Customer, NewCustomer};

use crate::error::{AppError, AppResult};
use crate::store::DynStore;

/// Registers customers and lists them
#[derive(Clone)]
pub struct CustomerService {
    store: DynStore,
}

impl CustomerService {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    /// Register a customer
    pub async fn create(&self, input: NewCustomer) -> AppResult<Customer> {
        let errors = validate_customer(&input);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let customer = self.store.insert_customer(input).await?;
        tracing::info!(customer_id = %customer.id, "Customer registered");

        Ok(customer)
    }

    pub async fn list(&self) -> AppResult<Vec<Customer>> {
        self.store.list_customers().await
    }
}
