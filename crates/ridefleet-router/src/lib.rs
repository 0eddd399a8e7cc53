//! The query router: scatter-gather reads across region participants and
//! the global replica, per the three scopes in spec section 4.F.

mod config;
mod result;
mod router;
mod scope;

pub use config::RouterConfig;
pub use result::SearchResult;
pub use router::Router;
pub use scope::Scope;
