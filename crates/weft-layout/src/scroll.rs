#![forbid(unsafe_code)]

//! Scroll viewport offset arithmetic.

/// Largest valid offset for `content` shown through `viewport`.
#[inline]
#[must_use]
pub fn max_offset(content: f64, viewport: f64) -> f64 {
    (content - viewport).max(0.0)
}

/// Clamp `offset` into `[0, content - viewport]`.
#[inline]
#[must_use]
pub fn clamp_offset(offset: f64, content: f64, viewport: f64) -> f64 {
    offset.clamp(0.0, max_offset(content, viewport))
}

/// Smallest change to `offset` that brings `[item_start, item_end)` into a
/// viewport of length `viewport`.
///
/// Items larger than the viewport are aligned to their start.
#[must_use]
pub fn scroll_into_view(offset: f64, viewport: f64, item_start: f64, item_end: f64) -> f64 {
    if item_start < offset || item_end - item_start > viewport {
        item_start
    } else if item_end > offset + viewport {
        item_end - viewport
    } else {
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_to_content() {
        assert_eq!(clamp_offset(-5.0, 100.0, 40.0), 0.0);
        assert_eq!(clamp_offset(90.0, 100.0, 40.0), 60.0);
        assert_eq!(clamp_offset(30.0, 100.0, 40.0), 30.0);
        assert_eq!(clamp_offset(30.0, 20.0, 40.0), 0.0);
    }

    #[test]
    fn into_view_moves_minimally() {
        assert_eq!(scroll_into_view(0.0, 50.0, 10.0, 20.0), 0.0);
        assert_eq!(scroll_into_view(0.0, 50.0, 60.0, 70.0), 20.0);
        assert_eq!(scroll_into_view(40.0, 50.0, 10.0, 20.0), 10.0);
        assert_eq!(scroll_into_view(0.0, 50.0, 100.0, 200.0), 100.0);
    }
}
