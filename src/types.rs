//! Typed indices into the record arrays of a [`BnNetwork`](crate::network::BnNetwork).
//!
//! Each id is a dense, 0-based position that stays valid for the lifetime of
//! the network (records are never removed, only cleared all at once).

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        pub struct $name(usize);

        impl $name {
            pub const fn new(index: usize) -> Self {
                $name(index)
            }

            /// Returns the raw index.
            pub const fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl From<$name> for usize {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(
    /// Id of a node (input, output or logic).
    NodeId,
    "n"
);
define_id!(
    /// Id of a port.
    PortId,
    "p"
);
define_id!(
    /// Id of a D flip-flop bundle.
    DffId,
    "d"
);
define_id!(
    /// Id of a latch bundle.
    LatchId,
    "l"
);

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_node_id() {
        let id = NodeId::new(7);
        assert_eq!(id.index(), 7);
        assert_eq!(usize::from(id), 7);
        assert_eq!(id.to_string(), "n7");
        assert!(NodeId::new(3) < id);
    }

    #[test]
    fn test_display_prefixes() {
        assert_eq!(PortId::new(0).to_string(), "p0");
        assert_eq!(DffId::new(1).to_string(), "d1");
        assert_eq!(LatchId::new(2).to_string(), "l2");
    }
}
