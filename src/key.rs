//! Key contract
//!
//! Maps application-supplied keys to the file names that persist them.

/// A key that can identify a record on disk.
///
/// The rendering must be *deterministic* (the same key always produces the
/// same name) and *collision-free* (distinct keys produce distinct names),
/// and it must be a valid single-component file name: no path separators,
/// no `..`, nothing the filesystem would reject. The store joins the
/// rendering directly onto its root directory.
///
/// Names ending in `.tmp` are reserved for the store's transient write
/// siblings; the store rejects such a rendering with
/// [`StoreError::InvalidKey`](crate::StoreError::InvalidKey) instead of
/// letting it shadow a temp file or be swept as debris at load.
///
/// Implementations are provided for the integer primitives (decimal
/// rendering, always safe) and for `String` (identity rendering; the
/// caller guarantees the string itself is a valid file name and avoids
/// the reserved suffix).
pub trait StoreKey {
    /// Render this key as the file name of its record.
    fn file_name(&self) -> String;
}

macro_rules! impl_store_key_for_int {
    ($($t:ty),*) => {
        $(
            impl StoreKey for $t {
                fn file_name(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_store_key_for_int!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

impl StoreKey for String {
    fn file_name(&self) -> String {
        self.clone()
    }
}
