use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub struct CookieAuthModifier;

impl Modify for CookieAuthModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
                "cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "SID",
                    "JWT token for current user",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::routes::user::user_signup_handler,
        crate::web::routes::user::user_signin_handler,
        crate::web::routes::courses::catalog_handler,
        crate::web::routes::courses::course_detail_handler,
        crate::web::routes::courses::course_manage_list_handler,
        crate::web::routes::courses::course_create_handler,
        crate::web::routes::courses::course_update_handler,
        crate::web::routes::courses::course_delete_handler,
        crate::web::routes::courses::course_enroll_handler,
        crate::web::routes::courses::course_modules_handler,
        crate::web::routes::courses::course_modules_update_handler,
        crate::web::routes::modules::module_contents_handler,
        crate::web::routes::modules::content_create_handler,
        crate::web::routes::modules::modules_reorder_handler,
        crate::web::routes::contents::content_get_handler,
        crate::web::routes::contents::content_update_handler,
        crate::web::routes::contents::content_delete_handler,
        crate::web::routes::contents::contents_reorder_handler,
        crate::web::routes::chat::chat_room_handler,
    ),
    modifiers(&CookieAuthModifier),
)]
pub struct ApiDoc;
