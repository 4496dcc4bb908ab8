mod backend;
mod backends;
mod registry;

pub use backend::{DetectedFrame, DetectorBackend};
pub use backends::StubBackend;
pub use registry::BackendRegistry;
