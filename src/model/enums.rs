//! # Enumerations
//!
//! Closed sets of remote string values. Each enum serializes to the exact
//! string the control plane uses, so declared state documents read the same
//! as the API reference.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A string that does not name any variant of a remote enum
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! remote_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $value)] $variant, )+
        }

        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire value
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $value, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $value => Ok($name::$variant), )+
                    other => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

remote_enum! {
    /// Runtime the application executes on
    RuntimeEnvironment {
        Sql10 => "SQL-1_0",
        Flink16 => "FLINK-1_6",
        Flink18 => "FLINK-1_8",
        Flink111 => "FLINK-1_11",
        Flink113 => "FLINK-1_13",
        Flink115 => "FLINK-1_15",
        Flink118 => "FLINK-1_18",
        Flink119 => "FLINK-1_19",
        Flink120 => "FLINK-1_20",
        ZeppelinFlink10 => "ZEPPELIN-FLINK-1_0",
        ZeppelinFlink20 => "ZEPPELIN-FLINK-2_0",
        ZeppelinFlink30 => "ZEPPELIN-FLINK-3_0",
    }
}

impl RuntimeEnvironment {
    #[must_use]
    pub fn is_sql(self) -> bool {
        matches!(self, Self::Sql10)
    }

    #[must_use]
    pub fn is_flink(self) -> bool {
        !self.is_sql()
    }
}

remote_enum! {
    /// Observed lifecycle status of an application
    ApplicationStatus {
        Deleting => "DELETING",
        Starting => "STARTING",
        Stopping => "STOPPING",
        Ready => "READY",
        Running => "RUNNING",
        Updating => "UPDATING",
        Autoscaling => "AUTOSCALING",
        ForceStopping => "FORCE_STOPPING",
        Maintenance => "MAINTENANCE",
        RollingBack => "ROLLING_BACK",
        RolledBack => "ROLLED_BACK",
    }
}

impl ApplicationStatus {
    /// Stable statuses in which configuration calls are accepted
    #[must_use]
    pub fn is_stable(self) -> bool {
        matches!(self, Self::Ready | Self::Running)
    }
}

remote_enum! {
    /// Observed status of an application snapshot
    SnapshotStatus {
        Creating => "CREATING",
        Ready => "READY",
        Deleting => "DELETING",
        Failed => "FAILED",
    }
}

remote_enum! {
    /// Status of an asynchronous application operation
    OperationStatus {
        InProgress => "IN_PROGRESS",
        Cancelled => "CANCELLED",
        Successful => "SUCCESSFUL",
        Failed => "FAILED",
    }
}

remote_enum! {
    /// Streaming job or Studio notebook
    ApplicationMode {
        Streaming => "STREAMING",
        Interactive => "INTERACTIVE",
    }
}

remote_enum! {
    /// Discriminator on Flink checkpoint/monitoring/parallelism groups
    ConfigurationType {
        Default => "DEFAULT",
        Custom => "CUSTOM",
    }
}

remote_enum! {
    CodeContentType {
        Plaintext => "PLAINTEXT",
        Zipfile => "ZIPFILE",
    }
}

remote_enum! {
    LogLevel {
        Debug => "DEBUG",
        Info => "INFO",
        Warn => "WARN",
        Error => "ERROR",
    }
}

remote_enum! {
    MetricsLevel {
        Application => "APPLICATION",
        Operator => "OPERATOR",
        Parallelism => "PARALLELISM",
        Task => "TASK",
    }
}

remote_enum! {
    RecordFormatType {
        Csv => "CSV",
        Json => "JSON",
    }
}

remote_enum! {
    /// Where a SQL input starts reading its source stream
    InputStartingPosition {
        Now => "NOW",
        TrimHorizon => "TRIM_HORIZON",
        LastStoppedPoint => "LAST_STOPPED_POINT",
    }
}

remote_enum! {
    /// Snapshot restore behaviour when a Flink application starts
    ApplicationRestoreType {
        SkipRestoreFromSnapshot => "SKIP_RESTORE_FROM_SNAPSHOT",
        RestoreFromLatestSnapshot => "RESTORE_FROM_LATEST_SNAPSHOT",
        RestoreFromCustomSnapshot => "RESTORE_FROM_CUSTOM_SNAPSHOT",
    }
}
