use super::{CreateCustomer, Customer};

/// Persists validated customers. Implementations trust their input and do not validate it again.
#[async_trait::async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn create_customer(&self, customer: CreateCustomer) -> Result<Customer, crm_db::Error>;
}

#[async_trait::async_trait]
impl CustomerRepository for crm_db::Store {
    async fn create_customer(&self, customer: CreateCustomer) -> Result<Customer, crm_db::Error> {
        self.insert_customer(customer.into()).await.map(Into::into)
    }
}
