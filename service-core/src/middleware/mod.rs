pub mod window_limit;

pub use window_limit::{
    RateLimitKey, WindowCheck, WindowLimit, WindowedQuotaStore, window_limit_middleware,
};
