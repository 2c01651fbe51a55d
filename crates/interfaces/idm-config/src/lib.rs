//! Central configuration constants for the domain registry console.

use std::time::Duration;

/// Path of the idmsvc REST API, relative to the console origin.
pub const API_BASE_PATH: &str = "/api/idmsvc/v1";

/// Path of the RBAC access API, relative to the console origin.
pub const RBAC_BASE_PATH: &str = "/api/rbac/v1";

/// Application name used for permission lookups (`idmsvc:<resource>:<verb>`).
pub const RBAC_APPLICATION: &str = "idmsvc";

/// Delay between two verification probes.
pub const VERIFY_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Hard ceiling on a single verification run. 15 minutes.
pub const VERIFY_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Page size used when the user has not picked one.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Page sizes offered by the list view.
pub const PER_PAGE_OPTIONS: [u32; 4] = [10, 20, 50, 100];

/// Placeholder name given to the provisional record when a token is issued.
pub const PROVISIONAL_DOMAIN_NAME: &str = "My domain";

/// Timeout applied to every individual HTTP request.
pub const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum redirects followed before a request fails.
pub const HTTP_MAX_REDIRECTS: usize = 10;

/// Convenience function to snap a page size onto the offered choices.
pub fn clamp_per_page(v: u32) -> u32 {
    PER_PAGE_OPTIONS
        .iter()
        .copied()
        .find(|&opt| v <= opt)
        .unwrap_or(PER_PAGE_OPTIONS[PER_PAGE_OPTIONS.len() - 1])
}
