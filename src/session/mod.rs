//! Session management
//!
//! - `Session` - events of one conversation, keyed by app/user/session ID
//! - `Event` - one unit of conversation output
//! - `SessionService` / `InMemorySessionService` - session creation and lookup

pub mod event;
pub mod service;
pub mod session;

pub use event::{Event, USER_AUTHOR};
pub use service::{InMemorySessionService, SessionService};
pub use session::{Session, SessionKey};
