pub mod file;
pub mod limits;
pub mod loaders;
pub mod plan;
pub mod settings;

pub use file::{FileDescriptor, FileRef};
pub use limits::{bytes_to_mb, format_mb, mb_to_bytes, LimitsProfile, Tier, BYTES_PER_MB};
pub use loaders::{load_settings, save_settings, scan_inputs};
pub use plan::{Batch, Plan, SkipRecord};
pub use settings::Settings;
