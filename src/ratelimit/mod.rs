//! Rate limiting logic and state management.

mod clock;
mod key;
mod limiter;
mod window;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::RateLimitKey;
pub use limiter::RateLimiter;
pub use window::{Limit, RateWindowEntry, WINDOW_SIZE_MS};
