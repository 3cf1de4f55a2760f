use std::any::{TypeId, type_name};
use std::fmt::{Display, Formatter};

use soa_buffer::Alignment;

use crate::ColumnElement;

/// Describes one column of a schema: its element type, and that type's size and alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnDescriptor {
    type_id: TypeId,
    type_name: &'static str,
    size: usize,
    alignment: Alignment,
}

impl ColumnDescriptor {
    /// The descriptor of a column holding values of type `T`.
    ///
    /// Fails to compile if `T` is aligned to more than 32 KiB.
    pub fn of<T: ColumnElement>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            size: size_of::<T>(),
            alignment: const { Alignment::of::<T>() },
        }
    }

    /// The size in bytes of one element.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// The alignment of one element.
    #[inline]
    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// The [`TypeId`] of the element type.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The name of the element type, as reported by [`std::any::type_name`].
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the column holds values of type `T`.
    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl Display for ColumnDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (size {}, align {})",
            self.type_name, self.size, self.alignment
        )
    }
}

#[cfg(test)]
mod test {
    use soa_buffer::Alignment;

    use crate::{ColumnDescriptor, PackedUInt};

    #[test]
    fn primitive_descriptor() {
        let desc = ColumnDescriptor::of::<u32>();
        assert_eq!(desc.size(), 4);
        assert_eq!(desc.alignment(), Alignment::new(4));
        assert!(desc.is::<u32>());
        assert!(!desc.is::<i32>());
        assert_eq!(desc.to_string(), "u32 (size 4, align 4)");
    }

    #[test]
    fn packed_descriptor() {
        let desc = ColumnDescriptor::of::<PackedUInt<6>>();
        assert_eq!(desc.size(), 6);
        assert_eq!(desc.alignment(), Alignment::new(1));
    }

    #[test]
    fn largest_supported_alignment() {
        #[derive(Clone, Copy, Debug)]
        #[repr(C, align(32768))]
        struct Page(u8);

        // SAFETY: a zeroed `u8` field is valid.
        unsafe impl crate::ColumnElement for Page {}

        let desc = ColumnDescriptor::of::<Page>();
        assert_eq!(desc.alignment(), Alignment::new(32768));
        assert_eq!(desc.size(), 32768);
    }
}
