//! Domain services: registry, accounts, sessions and the authorization layer
//! that ties them together.

pub mod access;
pub mod registry;
pub mod session;
pub mod user_store;

pub use access::AccessController;
pub use registry::{CodeGenerator, UrlRegistry};
pub use session::{
    PlainCookieTransport, SessionIdentity, SessionTransport, SignedCookieTransport,
};
pub use user_store::UserStore;
