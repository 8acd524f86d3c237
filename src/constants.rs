//! # Constants
//!
//! Shared constants used throughout the controller.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Default budget for creating an application, including the optional start (seconds)
pub const DEFAULT_APPLICATION_CREATE_TIMEOUT_SECS: u64 = 600;

/// Default budget for one update cycle wait (seconds)
pub const DEFAULT_APPLICATION_UPDATE_TIMEOUT_SECS: u64 = 600;

/// Default budget for deleting an application (seconds)
pub const DEFAULT_APPLICATION_DELETE_TIMEOUT_SECS: u64 = 600;

/// Default budget for a snapshot to become READY (seconds)
pub const DEFAULT_SNAPSHOT_CREATE_TIMEOUT_SECS: u64 = 600;

/// Default budget for a snapshot to disappear after delete (seconds)
pub const DEFAULT_SNAPSHOT_DELETE_TIMEOUT_SECS: u64 = 600;

/// How long IAM propagation failures are retried before the final attempt (seconds)
/// IAM changes can lag behind the Kinesis Analytics control plane by tens of seconds
pub const DEFAULT_IAM_PROPAGATION_TIMEOUT_SECS: u64 = 120;

/// Shortest interval between two status polls (milliseconds)
pub const DEFAULT_POLL_MIN_INTERVAL_MS: u64 = 1_000;

/// Floor for the interval between two status polls (milliseconds)
pub const MIN_POLL_INTERVAL_MS: u64 = 10;

/// Longest interval between two status polls (milliseconds)
pub const DEFAULT_POLL_MAX_INTERVAL_MS: u64 = 10_000;

/// Delay before the first status poll (milliseconds)
pub const DEFAULT_POLL_INITIAL_DELAY_MS: u64 = 0;

/// Separator between application name and snapshot name in a snapshot identifier
pub const SNAPSHOT_ID_SEPARATOR: &str = "/";

/// Resource path prefix of an application ARN (`arn:...:application/<name>`)
pub const APPLICATION_ARN_RESOURCE_PREFIX: &str = "application";

/// Default tracing filter when neither `RUST_LOG` nor `LOG_LEVEL` is set
pub const DEFAULT_LOG_FILTER: &str = "kinesis_analytics_controller=info";

/// Remote error message fragments that indicate IAM changes have not propagated yet.
/// All of them arrive as `InvalidArgumentException`.
pub const IAM_PROPAGATION_MESSAGES: &[&str] = &[
    // Kinesis stream inputs/outputs
    "Kinesis Analytics service doesn't have sufficient privileges",
    // Kinesis Firehose inputs/outputs
    "Kinesis Analytics doesn't have sufficient privileges",
    // Lambda preprocessors and outputs
    "does not provide Invoke permissions on the Lambda resource",
    // S3 code and reference data
    "Please check the role provided or validity of S3 location you provided",
];

/// Message variant returned by snapshot delete when the snapshot is already gone
pub const SNAPSHOT_DOES_NOT_EXIST_MESSAGE: &str = "does not exist";
