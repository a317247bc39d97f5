use super::OptNumber;

/// Uri-Host
pub const URI_HOST: OptNumber = OptNumber(3);
/// ETag
pub const ETAG: OptNumber = OptNumber(4);
/// Observe ([RFC7641](https://www.rfc-editor.org/rfc/rfc7641))
pub const OBSERVE: OptNumber = OptNumber(6);
/// Uri-Port
pub const URI_PORT: OptNumber = OptNumber(7);
/// Location-Path
pub const LOCATION_PATH: OptNumber = OptNumber(8);
/// Uri-Path, repeated once per path segment
pub const URI_PATH: OptNumber = OptNumber(11);
/// Content-Format, see [`ContentFormat`](super::ContentFormat)
pub const CONTENT_FORMAT: OptNumber = OptNumber(12);
/// Max-Age
pub const MAX_AGE: OptNumber = OptNumber(14);
/// Uri-Query, repeated once per query parameter
pub const URI_QUERY: OptNumber = OptNumber(15);
/// Accept
pub const ACCEPT: OptNumber = OptNumber(17);
/// Size1
pub const SIZE1: OptNumber = OptNumber(60);
