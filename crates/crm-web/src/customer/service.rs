use super::{repository::CustomerRepository, CreateCustomer, Customer};

/// Stores a validated customer. Failures from the repository are returned unchanged.
#[tracing::instrument(skip_all)]
pub async fn create_customer(
    repository: &dyn CustomerRepository,
    customer: CreateCustomer,
) -> Result<Customer, crm_db::Error> {
    repository.create_customer(customer).await
}
