/// Invitation code length
pub const INVITATION_CODE_LENGTH: usize = 8;

/// Characters an invitation code may contain.
/// Uppercase letters and digits, minus the visually ambiguous 0/O/1/I.
pub const INVITATION_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Maximum attempts to generate a non-colliding invitation code
pub const MAX_CODE_GENERATION_ATTEMPTS: u32 = 10;

/// Default lifetime of a single-use invitation code (hours)
pub const DEFAULT_INVITE_EXPIRES_HOURS: i64 = 24;

/// Default lifetime of a group invitation code (days)
pub const DEFAULT_GROUP_INVITE_EXPIRES_DAYS: i64 = 30;

/// Default guardian capacity of a group invitation code
pub const DEFAULT_MAX_GUARDIANS: i32 = 10;

/// Default page size for list endpoints
pub const DEFAULT_PAGE_LIMIT: i64 = 100;

/// Hard cap on page size for list endpoints
pub const MAX_PAGE_LIMIT: i64 = 500;

/// Maximum retries for transient database connectivity errors
pub const MAX_DB_RETRIES: u32 = 3;

/// Fixed backoff between database retries (milliseconds)
pub const DB_RETRY_BACKOFF_MS: u64 = 200;

// =============================================================================
// Error Messages
// =============================================================================

/// Error message when a non-senior tries to create an invitation code
pub const ERR_ONLY_SENIORS_INVITE: &str = "Only senior users can create invitation codes";

/// Error message when a non-guardian tries to accept an invitation code
pub const ERR_ONLY_GUARDIANS_ACCEPT: &str = "Only guardian users can accept invitation codes";

/// Error message for a code that has already been consumed or deactivated
pub const ERR_CODE_ALREADY_USED: &str = "Invitation code has already been used";

/// Error message for a code past its expiry
pub const ERR_CODE_EXPIRED: &str = "Invitation code has expired";

/// Error message for an already-linked senior/guardian pair
pub const ERR_ALREADY_CONNECTED: &str = "Senior and guardian are already connected";
