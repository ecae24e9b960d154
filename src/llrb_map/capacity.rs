use super::LlrbMap;
use crate::raw::RawLlrbMap;

impl<K, V> LlrbMap<K, V> {
    /// Creates an empty map whose node arena has room for at least `capacity` entries.
    ///
    /// Removed entries free their slot for reuse, so a map that never holds more than
    /// `capacity` entries at once never reallocates.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_map::LlrbMap;
    ///
    /// let map: LlrbMap<i32, i32> = LlrbMap::with_capacity(32);
    /// assert!(map.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        LlrbMap {
            raw: RawLlrbMap::with_capacity(capacity),
        }
    }

    /// Returns the number of entries the map can hold without reallocating.
    ///
    /// # Examples
    ///
    /// ```
    /// use llrb_map::LlrbMap;
    ///
    /// let mut map: LlrbMap<i32, i32> = LlrbMap::with_capacity(32);
    /// assert_eq!(map.capacity(), 32);
    ///
    /// map.extend((0..32).map(|k| (k, k)));
    /// map.retain(|k, _| k % 2 == 0);
    /// map.extend((100..116).map(|k| (k, k)));
    /// assert_eq!(map.capacity(), 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}
