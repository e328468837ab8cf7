//! Route handlers.

mod diagnostics;
mod relay;

pub use diagnostics::{ping, ping_preflight, test, test_preflight};
pub use relay::{
    MISSING_KEY_MESSAGE, PLACEHOLDER_REPLY, RelayError, api_preflight, chat, image,
};
