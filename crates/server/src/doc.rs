use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::extractors::{USER_ID_HEADER, USER_ROLE_HEADER};

struct IdentityHeaders;

impl Modify for IdentityHeaders {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "user_id",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(USER_ID_HEADER))),
        );
        components.add_security_scheme(
            "user_role",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(USER_ROLE_HEADER))),
        );
    }
}

/// API Documentation
#[derive(OpenApi)]
#[openapi(
    modifiers(&IdentityHeaders),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Authentication", description = "Identity checks"),
        (name = "Students", description = "Student dashboards and history"),
        (name = "Activities", description = "Enrollment, withdrawal and exam delay requests"),
        (name = "Semesters", description = "Semester scheduling"),
        (name = "Courses", description = "Course catalog and prerequisites"),
        (name = "Users", description = "Students, professors and staff accounts"),
        (name = "Organizations", description = "Education centers and departments"),
        (name = "Programs", description = "Degree programs and specializations"),
        (name = "Teaching", description = "Teaching assignments and professor dashboards"),
    ),
    info(
        title = "University Portal API",
        version = "1.0.0",
        description = "Student requests and their staff review",
        license(
            name = "MIT OR Apache-2.0",
        )
    )
)]
pub struct ApiDoc;
