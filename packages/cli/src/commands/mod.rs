mod export;
mod inspect;
mod preview;

pub use export::{export, ExportArgs};
pub use inspect::{inspect, InspectArgs};
pub use preview::{preview, PreviewArgs};
