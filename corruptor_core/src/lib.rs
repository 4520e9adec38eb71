pub mod config;
pub mod error;
pub mod job;
pub mod method;
pub mod preflight;
pub mod range;
pub mod report;
pub mod sampler;
pub mod settings;
pub mod stream;

pub use config::CorruptorConfig;
pub use error::{CorruptorError, ErrorClass, PreflightError};
pub use job::{corrupt_file, rng_for};
pub use method::{Method, MethodKind};
pub use range::{CorruptionRange, CorruptionRequest};
pub use report::{ChangeReport, ReportWriter};
pub use sampler::{AddressSampler, AddressSet, RandomSampler};
pub use settings::{RawSettings, Settings, parse_number};
pub use stream::{ChangeRecord, MAX_CHUNK_SIZE, RunSummary, StreamCorruptor, StreamStage};
