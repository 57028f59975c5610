//! Constants used throughout the portal core crate.
//!
//! Defaults for configuration and the fixed limits of the public forms live here so the web
//! layer, the CLI, and the tests agree on them.

/// Default base URL of the remote REST API when no explicit value is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// Default public origin of the site, used to build deep links.
pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";

/// Default origin for relative image paths returned by the API.
pub const DEFAULT_STORAGE_URL: &str = "http://localhost:8000/storage";

/// Default request timeout for the API client, in seconds.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 10;

/// Upper bound accepted for `PORTAL_API_TIMEOUT_SECS`.
pub const MAX_API_TIMEOUT_SECS: u64 = 120;

/// Prefix of the navigation fragment that deep-links a structure unit (`#unit-<id>`).
pub const UNIT_FRAGMENT_PREFIX: &str = "unit-";

/// Complaint form: maximum length of the optional name.
pub const COMPLAINT_NAME_MAX_CHARS: usize = 120;

/// Complaint form: minimum message length after trimming.
pub const COMPLAINT_MESSAGE_MIN_CHARS: usize = 10;

/// Complaint form: maximum message length after trimming.
pub const COMPLAINT_MESSAGE_MAX_CHARS: usize = 500;

/// Page-number radius used by the posts pagination.
pub const POSTS_PAGINATION_RADIUS: u32 = 1;

/// Cookie holding the persistent visitor id used for view tracking.
pub const VISITOR_COOKIE_NAME: &str = "portal_uid";
