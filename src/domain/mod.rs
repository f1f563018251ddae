//! Domain aggregates exposed by the CRM service layer.

/// Declares a closed, string-coded enum with `as_str`, `Display` and `FromStr`.
macro_rules! coded_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $code:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
        )]
        pub enum $name {
            $(
                #[serde(rename = $code)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $code,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::domain::types::TypeConstraintError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let code = s.trim().to_ascii_uppercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|value| value.as_str() == code)
                    .ok_or_else(|| {
                        $crate::domain::types::TypeConstraintError::InvalidValue(format!(
                            "unknown {} `{}`",
                            stringify!($name),
                            s
                        ))
                    })
            }
        }
    };
}

pub mod analytics;
pub mod client;
pub mod lead;
pub mod task;
pub mod types;
pub mod user;
