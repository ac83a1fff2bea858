//! # voxmod-client
//!
//! Client library for managing speech-to-text customization models on a
//! remote recognition service: model creation, corpus upload, training,
//! transcription, account inventory, and (bulk) deletion.
//!
//! The service owns all model state and only exposes transitions through
//! polling, so the training and deletion operations are wait loops over the
//! status endpoint; see [`poll`] for how those loops are bounded.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use voxmod_client::{Credentials, ModelHandle, TrainingOutcome};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let creds = Credentials::new("https://api.example.com", "my-api-key");
//!     let mut model = ModelHandle::new(&creds)?;
//!     model.create("news model", "broadcast vocabulary", None)?;
//!     model.add_corpus("vocab.txt".as_ref())?;
//!     if let TrainingOutcome::Completed(ack) = model.train()? {
//!         println!("trained: {ack}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod account;
pub mod bulk;
pub mod error;
pub mod model;
pub mod poll;
pub mod transport;
pub mod types;

pub use account::AccountClient;
pub use bulk::{
    BulkDeleter, BulkOutcome, ConfirmSource, DeleteSelection, NullReporter, ProgressReporter,
};
pub use error::{ClientError, ClientResult};
pub use model::{ModelHandle, DEFAULT_BASE_MODEL};
pub use poll::{CancelToken, PollConfig, DELETE_PROBE_INTERVAL, TRAIN_POLL_INTERVAL};
pub use transport::{ApiRequest, ApiResponse, Credentials, HttpTransport, SharedTransport, Transport};
pub use types::{
    ModelRecord, ModelStatus, Transcription, TranscriptionAlternative, TranscriptionResult,
    TrainingOutcome,
};
