// Service exports
pub mod cache;
pub mod postgres;
pub mod supabase;

pub use cache::{CacheError, CacheKey, CacheManager, CacheTtl, RecordKind};
pub use postgres::{ApplicationStatus, PostgresClient, PostgresError};
pub use supabase::{RestQuery, SupabaseClient, SupabaseError, SupabaseTables, DEFAULT_PAGE_SIZE};
