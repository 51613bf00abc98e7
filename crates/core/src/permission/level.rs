//! Level enums and their wire codes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A code that is not a level of the domain it was given for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{code}' is not a valid {domain} permission")]
pub struct UnknownLevel {
    /// Offending code.
    pub code: String,
    /// Domain name.
    pub domain: &'static str,
}

/// Behaviour shared by all per-domain levels.
pub trait AccessLevel: Copy {
    /// Wire code (`SR`, `SRW`, `AR`, `ARW`).
    fn code(self) -> &'static str;

    /// True for `AR` and `ARW`.
    fn reads_all(self) -> bool;

    /// True for `ARW`.
    fn writes_all(self) -> bool;

    /// True when the level may write the holder's own rows.
    fn writes_own(self) -> bool;

    /// True when reads are limited to the holder's own rows.
    fn is_self_scoped(self) -> bool {
        !self.reads_all()
    }
}

macro_rules! access_level {
    (
        $(#[$meta:meta])*
        $name:ident, $domain:literal,
        reads_all: [$($all:ident),*],
        writes_own: [$($own:ident),*],
        { $($variant:ident => $code:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[doc = concat!("`", $code, "`")]
                #[serde(rename = $code)]
                $variant,
            )+
        }

        impl AccessLevel for $name {
            fn code(self) -> &'static str {
                match self {
                    $(Self::$variant => $code,)+
                }
            }

            fn reads_all(self) -> bool {
                matches!(self, $(Self::$all)|*)
            }

            fn writes_all(self) -> bool {
                matches!(self, Self::Arw)
            }

            fn writes_own(self) -> bool {
                matches!(self, $(Self::$own)|*)
            }
        }

        impl FromStr for $name {
            type Err = UnknownLevel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($code => Ok(Self::$variant),)+
                    other => Err(UnknownLevel {
                        code: other.to_string(),
                        domain: $domain,
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.code())
            }
        }
    };
}

access_level!(
    /// Access to users and roles.
    UserAccess, "user", reads_all: [Ar, Arw], writes_own: [Arw], {
        Sr => "SR",
        Ar => "AR",
        Arw => "ARW",
    }
);

access_level!(
    /// Access to transactions and insurance companies.
    TransactionAccess, "transaction", reads_all: [Ar, Arw], writes_own: [Srw, Arw], {
        Srw => "SRW",
        Ar => "AR",
        Arw => "ARW",
    }
);

access_level!(
    /// Access to invoices and invoice extras.
    InvoiceAccess, "invoice", reads_all: [Ar, Arw], writes_own: [Arw], {
        Sr => "SR",
        Ar => "AR",
        Arw => "ARW",
    }
);
