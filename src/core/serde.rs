/*!
 * Serde Helpers
 * Skip-serializing predicates for compact snapshot JSON
 */

// ============================================================================
// Skip Serializing Predicates (for #[serde(skip_serializing_if = "...")])
// ============================================================================

/// Skip serializing if Option is None
#[inline]
pub const fn is_none<T>(value: &Option<T>) -> bool {
    value.is_none()
}

/// Skip serializing if value is zero
#[inline]
pub const fn is_zero_u64(value: &u64) -> bool {
    *value == 0
}

/// Skip serializing if value is exactly zero
#[inline]
pub fn is_zero_f64(value: &f64) -> bool {
    *value == 0.0
}

/// Skip serializing if Vec is empty
#[inline]
pub fn is_empty_vec<T>(value: &Vec<T>) -> bool {
    value.is_empty()
}
