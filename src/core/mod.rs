mod platform;
mod report;
mod section;

pub use platform::{OsFamily, OsMarkers, Platform};
pub use report::ReportConfig;
pub use section::{SectionId, Toggle};
