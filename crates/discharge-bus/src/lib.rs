//! Typed agent dispatch: a process-wide name→address table plus one
//! request/reply primitive (`call`) and one fire-and-forget primitive
//! (`notify`), built at startup by `Engine::build` in `discharge-workflow`.

pub mod cancel;
pub mod error;
pub mod message;
pub mod registry;

pub use cancel::CancelToken;
pub use error::BusError;
pub use message::*;
pub use registry::{AgentBus, AgentBusBuilder, AgentHandler, NotificationSink};
