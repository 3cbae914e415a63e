//! Kernel module - infrastructure seams and their implementations.

pub mod deadline_stream;
pub mod deps;
pub mod grpc;
pub mod test_dependencies;
pub mod traits;

pub use deadline_stream::{DeadlineStream, StreamEnd};
pub use deps::{create_allocator, DirectorDeps};
pub use grpc::{log_status, GrpcBackendClient, GrpcFrontendClient, GrpcQueryClient};
pub use test_dependencies::{MockAllocator, MockBackend, MockFrontend, MockQueryService};
pub use traits::*;
