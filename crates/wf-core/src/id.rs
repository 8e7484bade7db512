use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for workflow object ids: fast comparisons, low memory.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Separator between a connection id and a bendpoint index (`conn__2`).
pub const BENDPOINT_SEPARATOR: &str = "__";

macro_rules! interned_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Spur);

        impl $name {
            /// Intern a string as an id, or return the existing one.
            pub fn intern(s: &str) -> Self {
                Self(INTERNER.get_or_intern(s))
            }

            /// Resolve back to a string slice.
            pub fn as_str(&self) -> &str {
                INTERNER.resolve(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok(Self::intern(&s))
            }
        }
    };
}

interned_id!(
    /// Identifies a node (native node, metanode or component) in a workflow.
    NodeId,
    "node:"
);
interned_id!(
    /// Identifies a connection between two ports.
    ConnectionId,
    "connection:"
);
interned_id!(
    /// Identifies a workflow annotation.
    AnnotationId,
    "annotation:"
);
interned_id!(
    /// Identifies a component placeholder shown while a component is being loaded.
    PlaceholderId,
    "placeholder:"
);
interned_id!(
    /// Identifies a port type (`table`, `flowVariable`, ...).
    PortTypeId,
    "port:"
);
interned_id!(
    /// Identifies a workflow (the root workflow or the inside of a metanode/component).
    WorkflowId,
    "workflow:"
);

/// A bendpoint is addressed by its connection and its index along the path.
/// The string form is `connectionId + "__" + index`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BendpointId {
    pub connection: ConnectionId,
    pub index: usize,
}

impl BendpointId {
    pub fn new(connection: ConnectionId, index: usize) -> Self {
        Self { connection, index }
    }

    /// Parse `conn__3`. The connection id itself may contain `__`, so the
    /// last separator wins.
    pub fn parse(s: &str) -> Option<Self> {
        let (conn, idx) = s.rsplit_once(BENDPOINT_SEPARATOR)?;
        if conn.is_empty() {
            return None;
        }
        let index = idx.parse().ok()?;
        Some(Self::new(ConnectionId::intern(conn), index))
    }
}

impl fmt::Debug for BendpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bendpoint:{self}")
    }
}

impl fmt::Display for BendpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.connection.as_str(),
            BENDPOINT_SEPARATOR,
            self.index
        )
    }
}

impl Serialize for BendpointId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BendpointId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid bendpoint id `{s}`")))
    }
}
