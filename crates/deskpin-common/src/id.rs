use serde::{Deserialize, Serialize};
use std::fmt;

/// Generate a fresh random marker (a v4 uuid) for the window claim handshake.
pub fn new_marker() -> String {
    uuid::Uuid::new_v4().to_string()
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(
    /// Virtual desktop identifier owned by the desktop environment.
    DesktopId
);
string_id!(
    /// Activity identifier owned by the desktop environment.
    ActivityId
);
string_id!(
    /// Stable identity the desktop environment assigns to a claimed window.
    WindowUuid
);

impl WindowUuid {
    /// `true` for the all-zero uuid the native process answers with when it
    /// could not find (or could not disambiguate) the window being claimed.
    pub fn is_unclaimed(&self) -> bool {
        uuid::Uuid::parse_str(&self.0)
            .map(|uuid| uuid.is_nil())
            .unwrap_or(false)
    }
}

/// Window id assigned by the windowing host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostWindowId(pub i64);

impl fmt::Display for HostWindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tab id assigned by the windowing host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_is_valid_uuid() {
        let marker = new_marker();
        let parsed = uuid::Uuid::parse_str(&marker);
        assert!(parsed.is_ok());
        assert_eq!(parsed.unwrap().get_version_num(), 4);
    }

    #[test]
    fn markers_are_unique() {
        assert_ne!(new_marker(), new_marker());
    }

    #[test]
    fn nil_uuid_is_unclaimed() {
        let uuid = WindowUuid::from("00000000-0000-0000-0000-000000000000");
        assert!(uuid.is_unclaimed());

        let braced = WindowUuid::from("{00000000-0000-0000-0000-000000000000}");
        assert!(braced.is_unclaimed());
    }

    #[test]
    fn real_uuid_is_claimed() {
        let uuid = WindowUuid::from("{4f1c2a9e-7d3b-4c1e-9b0a-2f6e8d5c3a71}");
        assert!(!uuid.is_unclaimed());

        // Opaque ids that are not uuids at all are still accepted as claims.
        assert!(!WindowUuid::from("U-123").is_unclaimed());
    }

    #[test]
    fn string_ids_serialize_transparently() {
        let desktop = DesktopId::new("d1");
        assert_eq!(serde_json::to_string(&desktop).unwrap(), "\"d1\"");
        let back: DesktopId = serde_json::from_str("\"d1\"").unwrap();
        assert_eq!(back, desktop);
        assert_eq!(desktop.to_string(), "d1");
    }

    #[test]
    fn host_ids_serialize_as_integers() {
        assert_eq!(serde_json::to_string(&HostWindowId(7)).unwrap(), "7");
        let tab: TabId = serde_json::from_str("12").unwrap();
        assert_eq!(tab, TabId(12));
    }
}
