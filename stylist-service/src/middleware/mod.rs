pub mod auth;
pub mod quota;

pub use auth::{attach_rate_limit_key, AuthUser, USER_ID_HEADER};
pub use quota::{generation_quota_middleware, QuotaStatus};
