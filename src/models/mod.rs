//! Domain models and request/response DTOs.

pub mod api_key;
pub mod chapter;
pub mod media;
pub mod novel;
pub mod role;
pub mod taxonomy;
pub mod user;

// Re-export commonly used types
pub use api_key::{
    ApiKey, ApiKeyCreateResponse, ApiKeyListItem, AuthenticatedCaller, CreateApiKeyRequest,
};
pub use chapter::{Chapter, ChapterSummary, CreateChapterRequest, UpdateChapterRequest};
pub use media::{Media, MediaFilter, RegisterMediaRequest};
pub use novel::{
    CreateNovelRequest, Novel, NovelDetail, NovelFilter, NovelStatus, SetIdsRequest,
    UpdateNovelRequest,
};
pub use role::{CreateRoleRequest, GrantPermissionRequest, Permission, Role, RoleDetail};
pub use taxonomy::{CreateGenreRequest, CreateTagRequest, Genre, Tag};
pub use user::{CreateUserRequest, UpdateUserRequest, User, UserDetail};
