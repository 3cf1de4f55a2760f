use std::fmt::{Debug, Formatter};

/// Debug-formats a slice, listing at most [`TruncatedDebug::LIMIT`] elements followed by the
/// number of elements left out.
pub struct TruncatedDebug<'a, T>(pub &'a [T]);

impl<T> TruncatedDebug<'_, T> {
    /// The number of elements printed before truncating.
    pub const LIMIT: usize = 16;
}

impl<T: Debug> Debug for TruncatedDebug<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_list();
        list.entries(self.0.iter().take(Self::LIMIT));
        match self.0.len().checked_sub(Self::LIMIT) {
            Some(rest) if rest > 0 => list.entry(&format_args!("... {rest} more")).finish(),
            _ => list.finish(),
        }
    }
}
