//! Gateway: the relay's HTTP surface.
//!
//! `/push_message` forwards push requests to LINE; `/callback` receives signed webhook
//! deliveries and answers the `check` command.

mod callback;
mod protocol;
mod push;
mod server;

pub use callback::{check_ids_reply, handle_events, CHECK_COMMAND};
pub use protocol::{MessageType, Ping, PushRequest};
pub use push::{dispatch_push, PushError, PushOutcome};
pub use server::{router, run_gateway, RelayState};
