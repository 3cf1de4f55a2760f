use std::fmt::{Debug, Formatter};
use std::ops::{Deref, DerefMut};

use bytes::{Buf, Bytes, BytesMut};
use soa_error::{SoaResult, soa_err};

use crate::{Alignment, TruncatedDebug};

/// An exclusively owned, zero-initialized byte allocation whose start address is aligned to a
/// requested [`Alignment`].
///
/// Unlike `BytesMut::zeroed`, construction reports allocation failure as an error instead of
/// aborting the process.
pub struct AlignedBytes {
    bytes: BytesMut,
    alignment: Alignment,
}

impl AlignedBytes {
    /// Allocate `len` zeroed bytes starting at an address that is a multiple of `alignment`.
    ///
    /// Even an empty allocation reserves `alignment` bytes so that its start address is a valid,
    /// aligned, non-null pointer.
    pub fn try_zeroed(len: usize, alignment: Alignment) -> SoaResult<Self> {
        let padded = len
            .checked_add(*alignment)
            .filter(|padded| *padded <= isize::MAX as usize)
            .ok_or_else(|| {
                soa_err!(Allocation: "{len} bytes with {alignment} bytes of padding exceeds isize::MAX")
            })?;

        let mut vec = Vec::<u8>::new();
        vec.try_reserve_exact(padded)
            .map_err(|e| soa_err!(Allocation: "{padded} bytes: {e}"))?;
        vec.resize(padded, 0);

        let mut bytes = Bytes::from(vec)
            .try_into_mut()
            .map_err(|_| soa_err!(Allocation: "freshly allocated bytes must be unique"))?;

        let padding = bytes.as_ptr().align_offset(*alignment);
        if padding > *alignment {
            return Err(soa_err!(Allocation: "cannot align {padded} bytes to {alignment}"));
        }
        bytes.advance(padding);
        bytes.truncate(len);

        #[cfg(feature = "warn-alloc")]
        log::trace!("Allocated {len} bytes aligned to {alignment} ({padding} bytes of padding)");

        Ok(Self { bytes, alignment })
    }

    /// Allocate a new buffer holding a copy of `values`, aligned to `alignment`.
    pub fn try_copy_from(values: &[u8], alignment: Alignment) -> SoaResult<Self> {
        let mut buffer = Self::try_zeroed(values.len(), alignment)?;
        buffer.copy_from_slice(values);
        Ok(buffer)
    }

    /// Length of the allocation in bytes.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the allocation holds zero bytes.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The alignment of the allocation's start address.
    #[inline(always)]
    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// Overwrite every byte of the allocation with zero.
    pub fn zero(&mut self) {
        self.bytes.fill(0);
    }

    /// Returns the allocation as a byte slice.
    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the allocation as a mutable byte slice.
    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

impl Deref for AlignedBytes {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl DerefMut for AlignedBytes {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl AsRef<[u8]> for AlignedBytes {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl Debug for AlignedBytes {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedBytes")
            .field("length", &self.len())
            .field("alignment", &self.alignment)
            .field("bytes", &TruncatedDebug(self.as_slice()))
            .finish()
    }
}

#[cfg(test)]
mod test {
    use rstest::rstest;

    use crate::{AlignedBytes, Alignment};

    #[rstest]
    #[case(0, 1)]
    #[case(0, 64)]
    #[case(3, 8)]
    #[case(100, 64)]
    #[case(4096, 4096)]
    fn zeroed_and_aligned(#[case] len: usize, #[case] align: usize) {
        let alignment = Alignment::new(align);
        let buf = AlignedBytes::try_zeroed(len, alignment).unwrap();
        assert_eq!(buf.len(), len);
        assert_eq!(buf.alignment(), alignment);
        assert_eq!(buf.as_ptr().align_offset(align), 0);
        assert!(buf.iter().all(|b| *b == 0));
    }

    #[test]
    fn zero_resets_contents() {
        let mut buf = AlignedBytes::try_copy_from(&[1, 2, 3, 4], Alignment::new(4)).unwrap();
        assert_eq!(buf.as_slice(), &[1, 2, 3, 4]);
        buf.zero();
        assert_eq!(buf.as_slice(), &[0, 0, 0, 0]);
    }

    #[test]
    fn oversized_allocation_fails() {
        let err = AlignedBytes::try_zeroed(usize::MAX - 8, Alignment::new(64)).unwrap_err();
        assert!(err.to_string().starts_with("allocation failed"));
    }

    #[test]
    fn independent_allocations() {
        let mut a = AlignedBytes::try_zeroed(16, Alignment::new(16)).unwrap();
        let b = AlignedBytes::try_zeroed(16, Alignment::new(16)).unwrap();
        a[0] = 7;
        assert_eq!(a[0], 7);
        assert_eq!(b[0], 0);
        assert_ne!(a.as_ptr(), b.as_ptr());
    }
}
