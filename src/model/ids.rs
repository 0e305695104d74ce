//! Typed arena identifiers.
//!
//! Records in the [`ServiceModel`](super::ServiceModel) refer to each other by
//! index into the model's ordered vectors. The wrappers keep a method id from
//! being used where a type id is expected.

use std::fmt;

macro_rules! arena_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) usize);

        impl $name {
            /// Position of the record in declaration order.
            #[inline]
            #[must_use]
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

arena_id!(
    /// Identifies a service inside a model.
    ServiceId,
    "service"
);
arena_id!(
    /// Identifies a method inside a model. Methods are numbered across all
    /// services, in service then method declaration order.
    MethodId,
    "method"
);
arena_id!(
    /// Identifies a declared user type.
    TypeId,
    "type"
);
