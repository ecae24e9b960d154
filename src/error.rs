use core::fmt;

/// The error returned by [`LlrbMap::try_at`](crate::LlrbMap::try_at) when the map holds no
/// entry for the requested key.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct KeyNotFound;

impl fmt::Display for KeyNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("no entry found for key")
    }
}

impl core::error::Error for KeyNotFound {}
