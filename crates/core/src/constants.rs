/// Constants used throughout the treecache codebase
// Name formatting
pub const FQN_SEPARATOR: &str = "/";

// Container defaults
pub const DEFAULT_CACHE_NAME: &str = "default";
pub const DEFAULT_CLUSTER_NAME: &str = "treecache-cluster";

// Configuration file lookup
pub const CONFIG_DIR_NAME: &str = "treecache";
pub const CONFIG_FILE_NAME: &str = "cache.json";

// Environment variable names
pub const CACHE_MODE_VAR: &str = "TREECACHE_CACHE_MODE";
pub const CLUSTER_NAME_VAR: &str = "TREECACHE_CLUSTER_NAME";
pub const NODE_NAME_VAR: &str = "TREECACHE_NODE_NAME";
