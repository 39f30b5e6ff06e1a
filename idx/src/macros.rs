#[macro_export]
/// Declare a newtype key over an unsigned integer and implement [`IndexRef`]
/// for it, along with conversions from the backing type and from `usize`.
///
/// ```ignore
/// define_index! {
///     /// Where a port lives in its arena
///     pub struct PortIdx(u32);
/// }
/// ```
///
/// [`IndexRef`]: crate::IndexRef
macro_rules! define_index {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($backing:ty);) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis struct $name($backing);

        impl $crate::IndexRef for $name {
            fn index(&self) -> usize {
                self.0 as usize
            }

            fn new(input: usize) -> Self {
                debug_assert!(
                    input <= <$backing>::MAX as usize,
                    "index {input} overflows {}",
                    stringify!($backing)
                );
                Self(input as $backing)
            }
        }

        impl From<$backing> for $name {
            fn from(input: $backing) -> Self {
                Self(input)
            }
        }

        impl From<usize> for $name {
            fn from(input: usize) -> Self {
                $crate::IndexRef::new(input)
            }
        }
    };
}
