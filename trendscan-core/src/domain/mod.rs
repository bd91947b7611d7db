//! Domain types for trendscan

pub mod bar;
pub mod candidate;
pub mod ids;
pub mod panel;

pub use bar::Bar;
pub use candidate::{round1, Bucket, Candidate, SetupKind};
pub use ids::{ConfigHash, DatasetHash};
pub use panel::{Panel, PanelError};

/// Symbol type alias
pub type Symbol = String;
