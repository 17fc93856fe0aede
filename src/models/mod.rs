pub mod location;
pub mod user;
pub mod weather;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Server-assigned creation timestamp, RFC 3339 in UTC.
pub fn now_rfc3339() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&Rfc3339).unwrap_or_else(|_| now.to_string())
}
