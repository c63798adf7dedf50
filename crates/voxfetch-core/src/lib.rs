pub mod config;
pub mod logging;

pub mod control;
pub mod error;
pub mod fetch;
pub mod installer;
pub mod pipeline;
pub mod request;
pub mod storage;
pub mod verify;
pub mod voice_db;

pub use error::{ErrorKind, InstallFailure};
pub use pipeline::{AssetPipeline, InstallEvent, InstallHandle, Stage};
pub use request::{FetchSpec, InstallKey, InstallRequest, Source};
pub use voice_db::{VoiceDb, VoiceKey, VoiceRecord};
