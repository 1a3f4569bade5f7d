#[macro_export]
macro_rules! record_accessors {
    (impl $Enum:ident {
        $(
            $Variant:ident ( $Ty:ty ) => ( $as:ident, $as_mut:ident );
        )*
    }) => {
        impl $Enum {
            $(
                #[inline]
                pub fn $as(&self) -> Option<&$Ty> {
                    if let Self::$Variant(x) = self { Some(x) } else { None }
                }

                #[inline]
                pub fn $as_mut(&mut self) -> Option<&mut $Ty> {
                    if let Self::$Variant(x) = self { Some(x) } else { None }
                }
            )*
        }
    };
}
