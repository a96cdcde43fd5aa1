//! Macros for declaring machine states.

/// Declare a state enum and implement `State` for it.
///
/// Besides the trait, the macro derives what the engine needs (serde so a
/// call argument can be recognised as a target state), implements
/// `Display` with the state name, and adds an `ALL` constant listing the
/// variants in declaration order.
///
/// # Example
///
/// ```
/// use fireflow::state_enum;
/// use fireflow::core::State;
///
/// state_enum! {
///     pub enum Review {
///         Pending,
///         Approved,
///         Rejected,
///     }
///     final: [Approved, Rejected]
///     error: [Rejected]
/// }
///
/// assert_eq!(Review::ALL.len(), 3);
/// assert_eq!(Review::Rejected.to_string(), "Rejected");
/// assert!(Review::Rejected.is_error());
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }

        $(final: [$($final:ident),* $(,)?])?
        $(error: [$($error:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $name {
            /// Every variant, in declaration order.
            #[allow(dead_code)]
            pub const ALL: &'static [$name] = &[$($name::$variant),*];
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            fn is_final(&self) -> bool {
                match self {
                    $($(Self::$final => true,)*)?
                    _ => false,
                }
            }

            fn is_error(&self) -> bool {
                match self {
                    $($(Self::$error => true,)*)?
                    _ => false,
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::core::State::name(self))
            }
        }
    };
}
