pub mod coordinator;
pub mod delay;
pub mod launcher;
pub mod store;

pub use coordinator::{ExportCoordinator, ExportError, ExportReceipt, HandoffOutcome};
pub use delay::{Delay, RecordingDelay, TokioDelay};
pub use launcher::{ChannelLauncher, LaunchError, RecordingLauncher};
pub use store::{
    export_filename, DocumentStore, FsDocumentStore, InMemoryDocumentStore, StoreError,
    StoredDocument,
};
