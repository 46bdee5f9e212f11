//! Adapters for external services: HTTP transport and time.

mod reqwest_executor;
mod system_clock;

pub use reqwest_executor::ReqwestExecutor;
pub use system_clock::SystemClock;
