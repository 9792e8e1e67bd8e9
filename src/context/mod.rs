//! Context Routing
//!
//! Declared external services (DEXes, marketplaces, oracles, ...) that agents
//! can discover by capability or type and be routed to. Authorization and
//! transport are injectable seams so real access control and network calls
//! attach without touching routing logic.

pub mod capability;
pub mod definition;
pub mod loader;
pub mod policy;
pub mod router;
pub mod transport;

pub use capability::CapabilitySet;
pub use definition::{ContextDefinition, ContextType};
pub use loader::{context_files, parse_context_file, ContextFileFormat};
pub use policy::{AllowAllPolicy, AuthorizationPolicy, GrantPolicy};
pub use router::{ContextRouter, RouteResponse, DEFAULT_ROUTE_TIMEOUT};
pub use transport::{HttpTransport, SimulatedTransport, TransportClient};
