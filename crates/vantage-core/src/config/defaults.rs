//! Compiled defaults for every config section.

pub const DEFAULT_CONFIDENCE_LEVEL: u8 = 95;
pub const DEFAULT_MIN_VISITS_PER_VARIANT: u64 = 100;
pub const DEFAULT_MAX_VISITOR_ID_LEN: usize = 128;
pub const DEFAULT_READ_POOL_SIZE: usize = 4;
pub const MAX_READ_POOL_SIZE: usize = 8;
pub const DEFAULT_DB_FILE: &str = "vantage.db";
pub const DEFAULT_MATCHER_CACHE_CAPACITY: u64 = 256;
