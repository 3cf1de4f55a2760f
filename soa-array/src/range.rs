use std::ops::{Bound, Range, RangeBounds};

use soa_error::{SoaResult, soa_bail, soa_err};

/// Resolve `range` against `len` rows, failing if it does not lie within `[0, len]`.
pub(crate) fn checked_range(range: impl RangeBounds<usize>, len: usize) -> SoaResult<Range<usize>> {
    let start = match range.start_bound() {
        Bound::Included(&start) => start,
        Bound::Excluded(&start) => start
            .checked_add(1)
            .ok_or_else(|| soa_err!(OutOfBounds: start, 0, len))?,
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&end) => end
            .checked_add(1)
            .ok_or_else(|| soa_err!(OutOfBounds: end, 0, len))?,
        Bound::Excluded(&end) => end,
        Bound::Unbounded => len,
    };

    if end > len {
        soa_bail!(OutOfBounds: end, 0, len);
    }
    if start > end {
        soa_bail!(OutOfBounds: start, 0, end);
    }
    Ok(start..end)
}

/// Fail unless `index` addresses one of `len` rows.
#[inline]
pub(crate) fn check_index(index: usize, len: usize) -> SoaResult<()> {
    if index >= len {
        soa_bail!(OutOfBounds: index, 0, len);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use rstest::rstest;
    use soa_error::SoaError;

    use super::*;

    #[rstest]
    #[case(Bound::Unbounded, Bound::Unbounded, 0..10)]
    #[case(Bound::Included(2), Bound::Excluded(5), 2..5)]
    #[case(Bound::Excluded(2), Bound::Included(5), 3..6)]
    #[case(Bound::Unbounded, Bound::Included(9), 0..10)]
    #[case(Bound::Included(10), Bound::Unbounded, 10..10)]
    fn resolves_ranges(
        #[case] start: Bound<usize>,
        #[case] end: Bound<usize>,
        #[case] expected: Range<usize>,
    ) {
        assert_eq!(checked_range((start, end), 10).unwrap(), expected);
    }

    #[test]
    fn rejects_out_of_bounds() {
        assert!(matches!(
            checked_range(0..11, 10).unwrap_err(),
            SoaError::OutOfBounds(11, 0, 10, _)
        ));
        assert!(matches!(
            checked_range(..=usize::MAX, 10).unwrap_err(),
            SoaError::OutOfBounds(..)
        ));
        #[allow(clippy::reversed_empty_ranges)]
        let reversed = 5..2;
        assert!(checked_range(reversed, 10).is_err());
    }

    #[test]
    fn index_check() {
        assert!(check_index(9, 10).is_ok());
        assert!(check_index(10, 10).is_err());
        assert!(check_index(0, 0).is_err());
    }
}
