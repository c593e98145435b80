/// Declares a closed enum whose variants map 1:1 onto SpreadsheetML attribute tokens.
///
/// The first token is canonical: it is what `as_ooxml`, `Display` and serde emit. Any extra
/// `| "alias"` tokens are accepted by `from_ooxml` / `FromStr` (case-insensitively) so callers
/// can pass friendlier spellings such as `"single_accounting"`.
macro_rules! ooxml_token_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $token:literal $(| $alias:literal)*
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $token)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The SpreadsheetML token for this value.
            #[must_use]
            pub fn as_ooxml(self) -> &'static str {
                match self {
                    $($name::$variant => $token,)+
                }
            }

            /// Parse a SpreadsheetML token (or a documented alias), ignoring ASCII case.
            #[must_use]
            pub fn from_ooxml(s: &str) -> Option<Self> {
                let s = s.trim();
                $(
                    if s.eq_ignore_ascii_case($token) $(|| s.eq_ignore_ascii_case($alias))* {
                        return Some($name::$variant);
                    }
                )+
                None
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_ooxml())
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::FormatError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::from_ooxml(s).ok_or_else(|| {
                    $crate::FormatError::InvalidParameters(format!(
                        "unknown {} {:?}",
                        stringify!($name),
                        s
                    ))
                })
            }
        }
    };
}
