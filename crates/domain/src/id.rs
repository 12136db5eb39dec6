//! Typed identifier newtypes backed by catalog-supplied strings.
//!
//! Identifiers come from the external configuration documents and are opaque
//! to the process; wrapping them keeps device uids, group uids, schedule uids,
//! and vendor device URLs from being mixed up at compile time.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_uid {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Access the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the identifier is the empty string.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

define_uid!(
    /// Stable identifier for a [`Device`](crate::device::Device).
    DeviceUid
);

define_uid!(
    /// Stable identifier for a [`DeviceGroup`](crate::device::DeviceGroup).
    GroupUid
);

define_uid!(
    /// Stable identifier for a [`Schedule`](crate::schedule::Schedule).
    ScheduleUid
);

define_uid!(
    /// Vendor-specific device address (e.g. `io://1234-5678-9012/3456789`).
    DeviceUrl
);
