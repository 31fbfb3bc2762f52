//! Newtype IDs for type-safe entity references.
//!
//! Identifiers are issued by the backend and are opaque to this application,
//! so they wrap a `String` rather than a number. Use the `define_id!` macro to
//! create wrappers that prevent accidentally mixing IDs from different entity
//! types.

/// Error returned when an identifier is empty or only whitespace.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} cannot be empty")]
pub struct EmptyIdError {
    /// Name of the ID type that was being constructed.
    pub kind: &'static str,
}

/// Macro to define a type-safe opaque ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize` with `#[serde(transparent)]`
/// - `Deserialize` that rejects empty values
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `parse()`, `as_str()`, `into_inner()`
///
/// # Example
///
/// ```rust
/// # use detailer_core::define_id;
/// define_id!(BookingId);
/// define_id!(ServiceId);
///
/// let booking = BookingId::parse("bk_1").unwrap();
/// assert_eq!(booking.as_str(), "bk_1");
/// assert!(ServiceId::parse("  ").is_err());
///
/// // These are different types, so this won't compile:
/// // let _: BookingId = ServiceId::parse("x").unwrap();
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an ID from a non-blank string.
            ///
            /// # Errors
            ///
            /// Returns an error if the value is empty or only whitespace.
            pub fn parse(id: impl Into<String>) -> Result<Self, $crate::EmptyIdError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err($crate::EmptyIdError {
                        kind: stringify!($name),
                    });
                }
                Ok(Self(id))
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the underlying string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::EmptyIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::parse(raw).map_err(::serde::de::Error::custom)
            }
        }
    };
}

define_id!(TenantId);
define_id!(UserId);
