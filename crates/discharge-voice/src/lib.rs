//! Voice caller: outbound call orchestration against the provider API,
//! plus transcript parsing (§4.4, §4.5).

pub mod caller;
pub mod error;
pub mod transcript;

pub use caller::{CallOutcome, VoiceCaller};
pub use error::VoiceError;
pub use transcript::{parse, ParsedTranscript};
