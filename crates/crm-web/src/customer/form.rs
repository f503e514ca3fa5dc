use super::{
    service,
    validation::{self, ValidationErrors, PHONE_MIN_CHARS, ZIP_MIN_CHARS},
};
use crate::{error::ApiError, AppState};
use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde_json::{Map, Value};

pub const FAILED_NOTICE: &str = "Failed to create customer";

struct FieldSpec {
    name: &'static str,
    label: &'static str,
    placeholder: &'static str,
    input_type: &'static str,
    min_length: Option<usize>,
    multiline: bool,
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "firstName",
        label: "First Name",
        placeholder: "Enter your first name",
        input_type: "text",
        min_length: Some(1),
        multiline: false,
    },
    FieldSpec {
        name: "lastName",
        label: "Last Name",
        placeholder: "Enter your last name",
        input_type: "text",
        min_length: Some(1),
        multiline: false,
    },
    FieldSpec {
        name: "email",
        label: "Email",
        placeholder: "Enter your email",
        input_type: "email",
        min_length: Some(1),
        multiline: false,
    },
    FieldSpec {
        name: "phone",
        label: "Phone",
        placeholder: "Enter your phone",
        input_type: "tel",
        min_length: Some(PHONE_MIN_CHARS),
        multiline: false,
    },
    FieldSpec {
        name: "address1",
        label: "Address 1",
        placeholder: "Enter address 1",
        input_type: "text",
        min_length: Some(1),
        multiline: false,
    },
    FieldSpec {
        name: "address2",
        label: "Address 2",
        placeholder: "Enter address 2",
        input_type: "text",
        min_length: None,
        multiline: false,
    },
    FieldSpec {
        name: "city",
        label: "City",
        placeholder: "Enter your city",
        input_type: "text",
        min_length: Some(1),
        multiline: false,
    },
    FieldSpec {
        name: "state",
        label: "State",
        placeholder: "Enter your state",
        input_type: "text",
        min_length: Some(1),
        multiline: false,
    },
    FieldSpec {
        name: "zip",
        label: "Zip",
        placeholder: "Enter your ZIP code",
        input_type: "text",
        min_length: Some(ZIP_MIN_CHARS),
        multiline: false,
    },
    FieldSpec {
        name: "notes",
        label: "Notes",
        placeholder: "Enter any notes",
        input_type: "text",
        min_length: None,
        multiline: true,
    },
];

#[derive(Debug, Default, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerForm {
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    address1: String,
    address2: String,
    city: String,
    state: String,
    zip: String,
    notes: String,
    active: Option<String>,
    next: Option<String>,
}

impl CustomerForm {
    fn value_of(&self, name: &str) -> &str {
        match name {
            "firstName" => &self.first_name,
            "lastName" => &self.last_name,
            "email" => &self.email,
            "phone" => &self.phone,
            "address1" => &self.address1,
            "address2" => &self.address2,
            "city" => &self.city,
            "state" => &self.state,
            "zip" => &self.zip,
            "notes" => &self.notes,
            _ => "",
        }
    }

    /// The submission as the JSON object the API would receive. Blank optional fields are left out.
    fn to_input(&self) -> Value {
        let mut object = Map::new();
        for field in FIELDS {
            let value = self.value_of(field.name);
            if field.min_length.is_none() && value.trim().is_empty() {
                continue;
            }
            object.insert(field.name.to_owned(), Value::String(value.to_owned()));
        }
        object.insert("active".to_owned(), Value::Bool(self.active.is_some()));
        Value::Object(object)
    }
}

struct FieldView {
    name: &'static str,
    label: &'static str,
    placeholder: &'static str,
    input_type: &'static str,
    required: bool,
    min_length: usize,
    multiline: bool,
    value: String,
    errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "customer-new.html")]
pub struct NewCustomerTemplate {
    fields: Vec<FieldView>,
    form_errors: Vec<String>,
    active: bool,
    next: Option<String>,
    created: Option<i32>,
    failure: Option<&'static str>,
}

impl NewCustomerTemplate {
    fn blank(created: Option<i32>, next: Option<String>) -> Self {
        Self::from_submission(&CustomerForm::default(), &ValidationErrors::default(), next, created)
            .with_active(true)
    }

    fn from_submission(
        form: &CustomerForm,
        errors: &ValidationErrors,
        next: Option<String>,
        created: Option<i32>,
    ) -> Self {
        let fields = FIELDS
            .iter()
            .map(|field| FieldView {
                name: field.name,
                label: field.label,
                placeholder: field.placeholder,
                input_type: field.input_type,
                required: field.min_length.is_some(),
                min_length: field.min_length.unwrap_or_default(),
                multiline: field.multiline,
                value: form.value_of(field.name).to_owned(),
                errors: errors.messages_for(field.name).to_vec(),
            })
            .collect();
        Self {
            fields,
            form_errors: errors.form_errors.clone(),
            active: form.active.is_some(),
            next,
            created,
            failure: None,
        }
    }

    fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    fn with_failure(mut self) -> Self {
        self.failure = Some(FAILED_NOTICE);
        self
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct NewCustomerQuery {
    created: Option<i32>,
    next: Option<String>,
}

/// `GET /customers/new`
pub async fn get(
    Query(NewCustomerQuery { created, next }): Query<NewCustomerQuery>,
) -> Response {
    render(
        StatusCode::OK,
        NewCustomerTemplate::blank(created, next.filter(|next| is_local_path(next))),
    )
}

/// `POST /customers/new`
#[tracing::instrument(skip_all)]
pub async fn post(State(app_state): State<AppState>, Form(form): Form<CustomerForm>) -> Response {
    let next = form.next.clone().filter(|next| is_local_path(next));
    let customer = match validation::validate(&form.to_input()) {
        Ok(customer) => customer,
        Err(errors) => {
            tracing::debug!(%errors, "customer form rejected");
            return render(
                StatusCode::BAD_REQUEST,
                NewCustomerTemplate::from_submission(&form, &errors, next, None),
            );
        }
    };
    match service::create_customer(app_state.customers.as_ref(), customer).await {
        Ok(created) => {
            tracing::info!(customer_id = created.id, "customer created from form");
            let target = next.unwrap_or_else(|| format!("/customers/new?created={}", created.id));
            Redirect::to(&target).into_response()
        }
        Err(err) => {
            tracing::error!("Create customer failed: {err}");
            render(
                StatusCode::INTERNAL_SERVER_ERROR,
                NewCustomerTemplate::from_submission(&form, &ValidationErrors::default(), next, None)
                    .with_failure(),
            )
        }
    }
}

fn render(status: StatusCode, template: impl Template) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(err) => ApiError::internal(format!("rendering template: {err}")).into_response(),
    }
}

/// Only same-site absolute paths are accepted as a redirect target.
///
/// Browsers drop tabs and newlines while parsing a `Location`, so every byte must be
/// visible ASCII; that also keeps the target a valid header value.
fn is_local_path(target: &str) -> bool {
    target.starts_with('/')
        && !target.starts_with("//")
        && !target.contains('\\')
        && target.bytes().all(|b| b.is_ascii_graphic())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{customer::repository::testing::InMemoryRepository, routes};
    use axum::{
        body::{to_bytes, Body},
        http::{
            header::{CONTENT_TYPE, LOCATION},
            Request,
        },
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    const VALID_FORM: &str = "firstName=A&lastName=B&email=a%40b.com&phone=1234567&address1=X&address2=&city=Y&state=Z&zip=1000&notes=&active=true";

    async fn submit(repository: &Arc<InMemoryRepository>, body: String) -> Response {
        routes::setup(AppState::new(repository.clone()))
            .oneshot(
                Request::post("/customers/new")
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body))
                    .expect("should build request"),
            )
            .await
            .expect("router is infallible")
    }

    async fn text_of(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("should read body");
        String::from_utf8(bytes.to_vec()).expect("body should be utf8")
    }

    #[test]
    fn it_converts_a_submission_to_the_api_shape() {
        let form = CustomerForm {
            first_name: "A".to_owned(),
            address2: "  ".to_owned(),
            notes: "vip".to_owned(),
            ..CustomerForm::default()
        };
        let input = form.to_input();
        assert_eq!(input["firstName"], "A");
        assert_eq!(input["email"], "");
        assert_eq!(input["notes"], "vip");
        assert!(input.get("address2").is_none(), "blank optional field should be left out");
        assert_eq!(input["active"], false);
    }

    #[test]
    fn it_only_accepts_local_redirect_targets() {
        assert!(is_local_path("/dashboard"));
        assert!(!is_local_path("//evil.example"));
        assert!(!is_local_path("https://evil.example"));
        assert!(!is_local_path("/\\evil.example"));
        assert!(!is_local_path("/\t/evil.example"));
        assert!(!is_local_path("/\n"));
        assert!(!is_local_path("/caf\u{e9}"));
        assert!(is_local_path("/customers/new?created=1&x=%20"));
    }

    #[tokio::test]
    async fn it_renders_a_blank_form_with_active_checked() {
        let repository = Arc::new(InMemoryRepository::default());
        let response = routes::setup(AppState::new(repository))
            .oneshot(
                Request::get("/customers/new")
                    .body(Body::empty())
                    .expect("should build request"),
            )
            .await
            .expect("router is infallible");
        assert_eq!(response.status(), StatusCode::OK);
        let html = text_of(response).await;
        assert!(html.contains(r#"name="firstName""#));
        assert!(html.contains(r#"minlength="7""#));
        assert!(html.contains("checked"));
    }

    #[tokio::test]
    async fn it_redirects_to_a_fresh_form_after_creating() {
        let repository = Arc::new(InMemoryRepository::default());
        let response = submit(&repository, VALID_FORM.to_owned()).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(LOCATION).expect("location header"),
            "/customers/new?created=1"
        );
        let rows = repository.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].address2, None);
        assert!(rows[0].active);
    }

    #[tokio::test]
    async fn it_redirects_to_next_when_given() {
        let repository = Arc::new(InMemoryRepository::default());
        let response = submit(&repository, format!("{VALID_FORM}&next=%2F")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).expect("location header"), "/");
    }

    #[tokio::test]
    async fn it_falls_back_to_a_fresh_form_for_unusable_next_targets() {
        let repository = Arc::new(InMemoryRepository::default());
        for (id, next) in [(1, "%2F%09%2Fevil.example"), (2, "%2F%0A"), (3, "%2F%2Fevil.example")] {
            let response = submit(&repository, format!("{VALID_FORM}&next={next}")).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{next}");
            assert_eq!(
                response.headers().get(LOCATION).expect("location header"),
                format!("/customers/new?created={id}").as_str(),
                "{next}"
            );
        }
        assert_eq!(repository.rows().len(), 3);
    }

    #[tokio::test]
    async fn it_drops_an_unusable_next_from_the_blank_form() {
        let repository = Arc::new(InMemoryRepository::default());
        let response = routes::setup(AppState::new(repository))
            .oneshot(
                Request::get("/customers/new?next=%2F%09%2Fevil.example")
                    .body(Body::empty())
                    .expect("should build request"),
            )
            .await
            .expect("router is infallible");
        assert_eq!(response.status(), StatusCode::OK);
        let html = text_of(response).await;
        assert!(!html.contains("evil.example"));
    }

    #[tokio::test]
    async fn it_stores_an_unchecked_box_as_inactive() {
        let repository = Arc::new(InMemoryRepository::default());
        let body = VALID_FORM.replace("&active=true", "");
        let response = submit(&repository, body).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(!repository.rows()[0].active);
    }

    #[tokio::test]
    async fn it_redisplays_the_form_with_field_errors() {
        let repository = Arc::new(InMemoryRepository::default());
        let body = VALID_FORM
            .replace("email=a%40b.com", "email=nope")
            .replace("zip=1000", "zip=10");
        let response = submit(&repository, body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = text_of(response).await;
        assert!(html.contains("Invalid email"));
        assert!(html.contains("String must contain at least 4 character(s)"));
        assert!(html.contains(r#"value="nope""#), "submitted values should be kept");
        assert_eq!(repository.calls(), 0);
    }

    #[tokio::test]
    async fn it_shows_a_generic_notice_when_storing_fails() {
        let repository = Arc::new(InMemoryRepository::failing());
        let response = submit(&repository, VALID_FORM.to_owned()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let html = text_of(response).await;
        assert!(html.contains(FAILED_NOTICE));
        assert!(!html.contains("duplicate key"));
    }
}
