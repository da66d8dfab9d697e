//! Obstruction detection.
//!
//! Detection is delegated to an external vision worker; this module only
//! defines the provider seam and the object shape the geometry engine
//! consumes. Providers are infallible by contract: any internal failure
//! (network, bad response shape) degrades to an empty detection list, which
//! downstream code treats as "no obstructions found".

mod provider;
mod remote;
mod result;
mod stub;

pub use provider::DetectionProvider;
pub use remote::RemoteDetector;
pub use result::DetectedObject;
pub use stub::StubDetector;
