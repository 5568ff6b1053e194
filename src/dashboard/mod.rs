//! Lead dashboard core: scoping, paging, caching, mutations and the pipeline board.

pub mod cache;
pub mod coordinator;
pub mod notice;
pub mod pagination;
pub mod pipeline;
pub mod registry;
pub mod scope;
pub mod session;
pub mod stats;

pub use coordinator::{MutationKind, MutationOutcome};
pub use notice::{Notice, NoticeKind};
pub use pagination::{PageWindow, PaginationMode, PaginationStrategy};
pub use pipeline::{DragState, Lane, PipelineBoard, LANE_CAPACITY};
pub use registry::SessionRegistry;
pub use scope::BranchEmployees;
pub use session::{Dialog, FetchOutcome, LeadSession, LeadView, Navigation, SessionSettings, SessionUser};
pub use stats::{CountSource, StatusCounts};
