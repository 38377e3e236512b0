//! OpenAPI documentation configuration.

use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};

use crate::config::{ADMIN_KEY_HEADER, API_KEY_HEADER};
use crate::{api, error, models, pagination};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Novelhub Server",
        version = "0.1.0",
        description = "API server for publishing web novels: users, roles, novels, chapters, media and their classification"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health
        api::health::health,
        api::health::ready,
        // Users
        api::users::create_user,
        api::users::list_users,
        api::users::get_user,
        api::users::update_user,
        api::users::delete_user,
        api::users::assign_role,
        api::users::remove_role,
        // Roles
        api::roles::create_role,
        api::roles::list_roles,
        api::roles::get_role,
        api::roles::delete_role,
        api::roles::grant_permission,
        api::roles::revoke_permission,
        // API keys
        api::api_keys::create_api_key,
        api::api_keys::list_api_keys,
        api::api_keys::revoke_api_key,
        // Genres and tags
        api::taxonomy::create_genre,
        api::taxonomy::list_genres,
        api::taxonomy::get_genre,
        api::taxonomy::delete_genre,
        api::taxonomy::create_tag,
        api::taxonomy::list_tags,
        api::taxonomy::get_tag,
        api::taxonomy::delete_tag,
        // Novels
        api::novels::create_novel,
        api::novels::list_novels,
        api::novels::get_novel,
        api::novels::update_novel,
        api::novels::delete_novel,
        api::novels::set_genres,
        api::novels::set_tags,
        // Chapters
        api::chapters::create_chapter,
        api::chapters::list_chapters,
        api::chapters::get_chapter,
        api::chapters::update_chapter,
        api::chapters::delete_chapter,
        api::chapters::publish_chapter,
        // Media
        api::media::register_media,
        api::media::list_media,
        api::media::get_media,
        api::media::delete_media,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            pagination::PageInfo,
            pagination::PageMetadata,
            pagination::SortOrder,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Users and roles
            models::User,
            models::UserDetail,
            models::CreateUserRequest,
            models::UpdateUserRequest,
            models::Role,
            models::RoleDetail,
            models::Permission,
            models::CreateRoleRequest,
            models::GrantPermissionRequest,
            // API keys
            models::ApiKeyCreateResponse,
            models::ApiKeyListItem,
            models::CreateApiKeyRequest,
            api::api_keys::ListApiKeysResponse,
            // Catalog
            models::Genre,
            models::Tag,
            models::CreateGenreRequest,
            models::CreateTagRequest,
            models::NovelStatus,
            models::Novel,
            models::NovelDetail,
            models::CreateNovelRequest,
            models::UpdateNovelRequest,
            models::SetIdsRequest,
            models::Chapter,
            models::ChapterSummary,
            models::CreateChapterRequest,
            models::UpdateChapterRequest,
            models::Media,
            models::RegisterMediaRequest,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Users", description = "User accounts and role assignment"),
        (name = "Roles", description = "Roles and their permissions"),
        (name = "API Keys", description = "Per-user API keys"),
        (name = "Genres", description = "Genre catalog"),
        (name = "Tags", description = "Tag catalog"),
        (name = "Novels", description = "Novels and their classification"),
        (name = "Chapters", description = "Chapters of a novel"),
        (name = "Media", description = "Uploaded media metadata")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add the API key and admin key security schemes.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(API_KEY_HEADER))),
            );
            components.add_security_scheme(
                "admin_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(ADMIN_KEY_HEADER))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_every_route_group() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/api/v1/health",
            "/api/v1/users/{id}",
            "/api/v1/roles/{id}/permissions",
            "/api/v1/users/{id}/api-keys",
            "/api/v1/genres",
            "/api/v1/tags/{id}",
            "/api/v1/novels/{id}/genres",
            "/api/v1/novels/{novel_id}/chapters/{id}/publish",
            "/api/v1/media",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing path {}",
                expected
            );
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_key"));
        assert!(components.security_schemes.contains_key("admin_key"));
    }
}
