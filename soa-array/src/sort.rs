use crate::{Columns, ColumnsMut};

impl<C: Columns> ColumnsMut<'_, C> {
    /// In-place heapsort driven only by row comparisons and row swaps, so that every column of the
    /// view moves together.
    pub(crate) fn heapsort<F>(&mut self, mut is_less: F)
    where
        F: FnMut(C::Refs<'_>, C::Refs<'_>) -> bool,
    {
        let len = self.len();
        for node in (0..len / 2).rev() {
            self.sift_down(node, len, &mut is_less);
        }
        for end in (1..len).rev() {
            // SAFETY: `0 < end < len`.
            unsafe { self.swap_unchecked(0, end) };
            self.sift_down(0, end, &mut is_less);
        }
    }

    fn sift_down<F>(&mut self, mut node: usize, end: usize, is_less: &mut F)
    where
        F: FnMut(C::Refs<'_>, C::Refs<'_>) -> bool,
    {
        loop {
            let mut child = 2 * node + 1;
            if child >= end {
                break;
            }

            // SAFETY: every index below is less than `end <= len`.
            unsafe {
                if child + 1 < end
                    && is_less(self.refs_unchecked(child), self.refs_unchecked(child + 1))
                {
                    child += 1;
                }
                if !is_less(self.refs_unchecked(node), self.refs_unchecked(child)) {
                    break;
                }
                self.swap_unchecked(node, child);
            }
            node = child;
        }
    }
}

#[cfg(test)]
mod test {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rstest::rstest;

    use crate::OwnedColumns;

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    #[case(17)]
    #[case(1000)]
    fn sorts_like_std(#[case] len: usize) {
        let mut rng = StdRng::seed_from_u64(0);
        let rows = (0..len)
            .map(|_| (rng.random_range(0u8..4), rng.random::<u32>()))
            .collect::<Vec<_>>();

        let mut owned = OwnedColumns::<(u8, u32)>::try_from_rows(&rows).unwrap();
        owned.columns_mut().sort_rows();

        let mut expected = rows;
        expected.sort();
        let actual = owned.columns().iter().map(|(a, b)| (*a, *b)).collect::<Vec<_>>();
        assert_eq!(actual, expected);
    }

    #[test]
    fn sorts_descending_by_second_column() {
        let rows = [(1u16, 5i64), (2, -3), (3, 9), (4, 0)];
        let mut owned = OwnedColumns::<(u16, i64)>::try_from_rows(&rows).unwrap();
        owned
            .columns_mut()
            .sort_rows_by(|(_, a): (&u16, &i64), (_, b): (&u16, &i64)| b.cmp(a));
        assert_eq!(
            owned.columns().iter().map(|(a, _)| *a).collect::<Vec<_>>(),
            vec![3, 1, 4, 2]
        );
    }
}
