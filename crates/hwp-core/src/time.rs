use crate::error::Result;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Current UTC time formatted as RFC 3339 with whole seconds.
pub fn now_rfc3339() -> Result<String> {
    let now = OffsetDateTime::now_utc();
    let now = now.replace_nanosecond(0).unwrap_or(now);
    Ok(now.format(&Rfc3339)?)
}
