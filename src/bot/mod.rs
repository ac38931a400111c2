//! Chat-side glue: events, permissions and dispatch.

mod dispatcher;
mod event;
mod permission;

pub use dispatcher::Dispatcher;
pub use event::{ChatEvent, Reply, ReplyBody, ReplyTarget};
pub use permission::{check_permission, Permission};
