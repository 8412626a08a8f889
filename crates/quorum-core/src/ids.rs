macro_rules! define_id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Get the inner u32 value.
            pub fn inner(self) -> u32 {
                self.0
            }

            /// Create an ID from a u32 value.
            pub fn new(value: u32) -> Self {
                Self(value)
            }

            /// Create an ID from a position, `None` past `u32::MAX`.
            pub fn from_index(index: usize) -> Option<Self> {
                u32::try_from(index).ok().map(Self)
            }

            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

// Index of a constraint's referenced-detail set inside a program.
define_id_type!(DetailSetId);

#[cfg(test)]
mod tests {
    use super::DetailSetId;

    #[test]
    fn detail_set_id_roundtrip() {
        let id = DetailSetId::new(7);
        assert_eq!(id.inner(), 7);
        assert_eq!(id.index(), 7);
        assert_eq!(DetailSetId::from_index(7), Some(id));
    }

    #[test]
    fn detail_set_id_rejects_wide_positions() {
        assert_eq!(
            DetailSetId::from_index(u32::MAX as usize),
            Some(DetailSetId::new(u32::MAX))
        );
        #[cfg(target_pointer_width = "64")]
        assert_eq!(DetailSetId::from_index(u32::MAX as usize + 1), None);
    }
}
