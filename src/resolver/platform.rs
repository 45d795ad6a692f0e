//! Built-in platform types.
//!
//! The JDK is not indexed. Resolution falls back to this table for the
//! `java.*` types configuration holders commonly use, so collection and map
//! shapes are recognized without a JDK on the dependency list.

/// How a platform type is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformKind {
    /// A leaf value type such as `java.lang.String` or `java.time.Duration`.
    Scalar,
    /// A collection of its first type argument.
    Collection,
    /// A map from its first type argument to its second.
    Map,
    /// `java.util.Properties`: a map of strings to strings.
    StringMap,
}

const SCALARS: &[&str] = &[
    "java.lang.Boolean",
    "java.lang.Byte",
    "java.lang.CharSequence",
    "java.lang.Character",
    "java.lang.Class",
    "java.lang.Double",
    "java.lang.Enum",
    "java.lang.Float",
    "java.lang.Integer",
    "java.lang.Long",
    "java.lang.Number",
    "java.lang.Object",
    "java.lang.Record",
    "java.lang.Short",
    "java.lang.String",
    "java.lang.Void",
    "java.io.File",
    "java.io.Serializable",
    "java.math.BigDecimal",
    "java.math.BigInteger",
    "java.net.InetAddress",
    "java.net.URI",
    "java.net.URL",
    "java.nio.charset.Charset",
    "java.nio.file.Path",
    "java.time.DayOfWeek",
    "java.time.Duration",
    "java.time.Instant",
    "java.time.LocalDate",
    "java.time.LocalDateTime",
    "java.time.LocalTime",
    "java.time.OffsetDateTime",
    "java.time.Period",
    "java.time.ZoneId",
    "java.time.ZonedDateTime",
    "java.time.temporal.ChronoUnit",
    "java.util.Currency",
    "java.util.Locale",
    "java.util.Optional",
    "java.util.TimeZone",
    "java.util.UUID",
    "java.util.regex.Pattern",
];

const COLLECTIONS: &[&str] = &[
    "java.lang.Iterable",
    "java.util.ArrayDeque",
    "java.util.ArrayList",
    "java.util.Collection",
    "java.util.Deque",
    "java.util.EnumSet",
    "java.util.HashSet",
    "java.util.LinkedHashSet",
    "java.util.LinkedList",
    "java.util.List",
    "java.util.NavigableSet",
    "java.util.Queue",
    "java.util.Set",
    "java.util.SortedSet",
    "java.util.TreeSet",
    "java.util.Vector",
    "java.util.concurrent.CopyOnWriteArrayList",
];

const MAPS: &[&str] = &[
    "java.util.EnumMap",
    "java.util.HashMap",
    "java.util.Hashtable",
    "java.util.LinkedHashMap",
    "java.util.Map",
    "java.util.NavigableMap",
    "java.util.SortedMap",
    "java.util.TreeMap",
    "java.util.concurrent.ConcurrentHashMap",
    "java.util.concurrent.ConcurrentMap",
];

/// Look up a fully-qualified platform type.
pub fn lookup(qualified_name: &str) -> Option<PlatformKind> {
    if qualified_name == "java.util.Properties" {
        Some(PlatformKind::StringMap)
    } else if COLLECTIONS.contains(&qualified_name) {
        Some(PlatformKind::Collection)
    } else if MAPS.contains(&qualified_name) {
        Some(PlatformKind::Map)
    } else if SCALARS.contains(&qualified_name) {
        Some(PlatformKind::Scalar)
    } else {
        None
    }
}
