pub mod business_rules;
pub mod canonical_url;
pub mod dedup;
pub mod merge;
pub mod normalize;
pub mod route;
pub mod routing;

pub use business_rules::{apply_business_rules, FilterSettings};
pub use canonical_url::canonicalize;
pub use dedup::{deduplicate, DedupReport, DedupSettings};
pub use merge::{apply_tracked_urls, assign_market, merge, set_route_type, AiUpdate};
pub use normalize::normalize;
pub use route::{classify_route_type, derive_route_type};
pub use routing::{route, view_exportable, view_ready_for_ai, RouteFilter};
