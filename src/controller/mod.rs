//! # Controller
//!
//! Reconciliation core for Kinesis Analytics v2 resources.
//!
//! - `backoff`: Fibonacci backoff shared by polling and retries
//! - `identifier`: snapshot resource id and import id parsing
//! - `finder`: remote lookups with a typed not-found signal
//! - `status`: finder adapters for the wait engine
//! - `wait`: generic state-change poller and the concrete waits
//! - `retry`: IAM propagation retry
//! - `reconciler`: application, maintenance window and snapshot lifecycles

pub mod backoff;
pub mod finder;
pub mod identifier;
pub mod reconciler;
pub mod retry;
pub mod status;
pub mod wait;
