use crate::{ErrString, SoaResult};

mod private {
    use crate::SoaResult;

    pub trait Sealed {}

    impl<T> Sealed for SoaResult<T> {}
}

/// Annotation of a [`SoaResult`]'s error.
pub trait ContextExt<T>: private::Sealed {
    /// Wrap the error, if any, in [`SoaError::Context`](crate::SoaError::Context) with a message
    /// that is only built on failure.
    fn with_context<M, F>(self, msg: F) -> SoaResult<T>
    where
        M: Into<ErrString>,
        F: FnOnce() -> M;
}

impl<T> ContextExt<T> for SoaResult<T> {
    #[inline]
    fn with_context<M, F>(self, msg: F) -> SoaResult<T>
    where
        M: Into<ErrString>,
        F: FnOnce() -> M,
    {
        self.map_err(|e| e.with_context(msg()))
    }
}
