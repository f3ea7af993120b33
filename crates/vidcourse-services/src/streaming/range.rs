//! `Range: bytes=<start>-[<end>]` resolution against an object's size.
//!
//! Parsing is lenient: each bound is read as its leading integer, an
//! unreadable start means 0, and an unreadable or oversized end is clamped to
//! the last byte. Only a window that still falls outside the object after
//! clamping is rejected.

use vidcourse_storage::ByteRange;

use crate::error::{ServiceError, ServiceResult};

/// Serving window of a partial response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeWindow {
    pub start: u64,
    pub end: u64,
    pub total_size: u64,
}

impl RangeWindow {
    pub fn content_length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value, e.g. `bytes 100-199/1000`
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total_size)
    }

    pub fn byte_range(&self) -> ByteRange {
        ByteRange::new(self.start, self.end)
    }
}

/// Leading integer of `value`, ignoring surrounding whitespace and any
/// trailing garbage. Saturates instead of overflowing.
fn leading_int(value: &str) -> Option<i128> {
    let value = value.trim_start();
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };

    let digit_count = digits.bytes().take_while(u8::is_ascii_digit).count();
    if digit_count == 0 {
        return None;
    }

    let magnitude = digits[..digit_count]
        .bytes()
        .fold(0i128, |acc, d| acc.saturating_mul(10).saturating_add(i128::from(d - b'0')));

    Some(if negative { -magnitude } else { magnitude })
}

/// Resolve a `Range` header value into the window to serve.
pub fn resolve_range(header: &str, total_size: u64) -> ServiceResult<RangeWindow> {
    let spec = header.trim();
    let spec = spec.strip_prefix("bytes=").unwrap_or(spec);
    let (start_part, end_part) = match spec.split_once('-') {
        Some((start, end)) => (start, Some(end)),
        None => (spec, None),
    };

    let last_byte = i128::from(total_size) - 1;
    let start = leading_int(start_part).unwrap_or(0);
    let end = end_part
        .and_then(leading_int)
        .unwrap_or(last_byte)
        .min(last_byte);

    if start < 0 || start > last_byte || start > end {
        return Err(ServiceError::RangeNotSatisfiable { total_size });
    }

    // 0 <= start <= end <= total_size - 1, so both fit in u64
    Ok(RangeWindow {
        start: start as u64,
        end: end as u64,
        total_size,
    })
}
