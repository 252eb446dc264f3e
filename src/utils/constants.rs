// src/utils/constants.rs

/// Sentinel name for points that arrive without one.
pub const UNNAMED_POI_LABEL: &str = "Unnamed POI";

/// Category for subgroups none of whose members carry one.
pub const UNKNOWN_CATEGORY_LABEL: &str = "unknown";

/// UTM zone 32N, covering most of Italy.
pub const DEFAULT_METRIC_CRS: &str = "EPSG:32632";

pub const DEFAULT_DISTANCE_THRESHOLD_M: f64 = 50.0;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

/// Tag keys that carry a transport sub-category, in priority order.
pub const TRANSPORT_CATEGORY_KEYS: [&str; 4] = ["station", "railway", "highway", "public_transport"];

/// Tag keys that carry a point-of-interest sub-category, tried after the transport ones.
pub const POI_CATEGORY_KEYS: [&str; 4] = ["amenity", "shop", "tourism", "leisure"];
