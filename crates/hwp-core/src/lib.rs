pub mod dashboard;
pub mod decode;
pub mod error;
pub mod kind;
pub mod model;
pub mod quantity;
pub mod resource;
pub mod time;
pub mod wellknown;
pub mod workload;

pub use dashboard::DashboardConfig;
pub use error::{CoreError, ErrorCategory, Result};
pub use kind::Kind;
pub use model::{
    AcceleratorProfileSpec, HardwareIdentifier, HardwareProfile, HardwareProfileSpec,
    HardwareResourceType, IntOrString, LegacyAcceleratorProfile, NodeScheduling, ProfileType,
    ResourcePair, SchedulingSpec, SchedulingType, SizedPreset, Toleration,
};
pub use quantity::Quantity;
pub use resource::{DynamicObject, ObjectKey, ObjectMeta};
pub use time::now_rfc3339;
pub use workload::{InferenceServiceRefs, ModelResources, NotebookRefs};
