pub mod api;
pub mod form;
pub mod repository;
pub mod service;
pub mod validation;

/// A customer payload that passed validation, ready to be stored.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub notes: Option<String>,
    pub active: bool,
}

/// A stored customer as returned to API callers.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: jiff::Timestamp,
}

impl From<CreateCustomer> for crm_db::models::NewCustomer {
    fn from(
        CreateCustomer {
            first_name,
            last_name,
            email,
            phone,
            address1,
            address2,
            city,
            state,
            zip,
            notes,
            active,
        }: CreateCustomer,
    ) -> Self {
        Self {
            first_name,
            last_name,
            email,
            phone,
            address1,
            address2,
            city,
            state,
            zip,
            notes,
            active,
        }
    }
}

impl From<crm_db::models::Customer> for Customer {
    fn from(row: crm_db::models::Customer) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            address1: row.address1,
            address2: row.address2,
            city: row.city,
            state: row.state,
            zip: row.zip,
            notes: row.notes,
            active: row.active,
            created_at: row.created_at.to_jiff(),
        }
    }
}
