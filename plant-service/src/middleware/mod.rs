pub mod auth_user;
pub mod id_path;
pub mod validated_json;

pub use auth_user::{AuthUser, AUTHENTICATED_KEY, USER_ID_KEY};
pub use id_path::IdPath;
pub use validated_json::ValidatedJson;
