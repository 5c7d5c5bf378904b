//! WeKnora Console Routing
//!
//! - Route table with per-route metadata and static redirects
//! - Navigation guard over two independent realms:
//!   1. `/admin/*` → admin session
//!   2. everything else → end-user session
//! - Optional backend token revalidation, off by default

mod error;
mod guard;
mod meta;
mod router;
mod table;

pub use error::RouterError;
pub use guard::{GuardDecision, RouteGuard, TokenValidator};
pub use meta::RouteMeta;
pub use router::{Navigation, Router};
pub use table::{RouteDef, RouteLocation, RouteTable};

pub type Result<T> = std::result::Result<T, RouterError>;
