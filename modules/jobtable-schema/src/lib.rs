pub mod ids;
pub mod row;
pub mod store;

pub use ids::compute_job_id;
pub use row::{
    AgentFields, AiFields, ClassificationSource, IdFields, JobRow, MatchLevel, MetaFields,
    NormFields, QaFields, RouteFields, RouteType, RulesFields, SearchFields, SourceFields,
    SysFields,
};
pub use store::{prepare_for_store, sanctify, StoreRow};

/// Builds an empty frame. Rows only ever enter a frame as `JobRow`s, so
/// every declared column is present with its typed default by construction.
pub fn empty_frame() -> Vec<JobRow> {
    Vec::new()
}

/// Identity on the column set: a `JobRow` cannot be missing a declared
/// column, and no caller can introduce one outside the declared namespaces.
/// Kept as the single documented place where schema presence is guaranteed,
/// so callers about to export or store a frame have one function to call.
pub fn ensure_schema(frame: Vec<JobRow>) -> Vec<JobRow> {
    frame
}
