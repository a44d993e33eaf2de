/// Monotonic lookup table over sorted `f64` keys.
///
/// The value range `[min, max]` is cut into `table_size` equal buckets.
/// Each bucket remembers the largest key index whose bucket is not above
/// it, so a lookup starts next to its answer and only walks a few keys for
/// evenly spread data.
#[derive(Debug, Clone)]
pub struct HashFunction {
    keys: Vec<f64>,
    min: f64,
    max: f64,
    scale: f64,
    table: Vec<usize>,
}

impl HashFunction {
    /// Build the table. `keys` must be sorted ascending.
    ///
    /// A zero table size is treated as one bucket; a zero or non-finite
    /// `max - min` puts every value in range into the first bucket.
    pub fn new(keys: Vec<f64>, min: f64, max: f64, table_size: usize) -> Self {
        let size = table_size.max(1);
        let span = max - min;
        let scale = if span > 0.0 && span.is_finite() {
            size as f64 / span
        } else {
            0.0
        };

        let mut function = Self {
            keys,
            min,
            max,
            scale,
            table: vec![0; size],
        };
        function.fill_table();
        function
    }

    fn fill_table(&mut self) {
        let mut index = 0;
        for bucket in 0..self.table.len() {
            while index + 1 < self.keys.len() && self.bucket(self.keys[index + 1]) <= bucket {
                index += 1;
            }
            self.table[bucket] = index;
        }
    }

    #[inline]
    fn bucket(&self, value: f64) -> usize {
        let last = self.table.len() - 1;
        if value.is_nan() || value < self.min {
            return 0;
        }
        if value >= self.max {
            return last;
        }
        (((value - self.min) * self.scale) as usize).min(last)
    }

    /// Index of the first key `>= value`, or the last index when every key
    /// is smaller. Returns 0 for an empty key set.
    pub fn lookup(&self, value: f64) -> usize {
        let Some(last) = self.keys.len().checked_sub(1) else {
            return 0;
        };

        let mut index = self.table[self.bucket(value)].min(last);
        while index < last && self.keys[index] < value {
            index += 1;
        }
        while index > 0 && self.keys[index - 1] >= value {
            index -= 1;
        }
        index
    }

    pub fn keys(&self) -> &[f64] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn table_size(&self) -> usize {
        self.table.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn expected_lower_bound(keys: &[f64], value: f64) -> usize {
        keys.iter()
            .position(|&key| key >= value)
            .unwrap_or(keys.len().saturating_sub(1))
    }

    #[test]
    fn test_lookup_exact_keys() {
        let keys = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let function = HashFunction::new(keys.clone(), 0.0, 4.0, 5);

        for (i, key) in keys.iter().enumerate() {
            assert_eq!(function.lookup(*key), i);
        }
        assert_eq!(function.lookup(1.5), 2);
        assert_eq!(function.lookup(-10.0), 0);
        assert_eq!(function.lookup(10.0), 4);
    }

    #[test]
    fn test_lookup_with_duplicates() {
        let keys = vec![1.0, 2.0, 2.0, 2.0, 5.0];
        let function = HashFunction::new(keys, 1.0, 5.0, 2);

        assert_eq!(function.lookup(2.0), 1);
        assert_eq!(function.lookup(1.5), 1);
        assert_eq!(function.lookup(2.5), 4);
    }

    #[test]
    fn test_lookup_is_lower_bound_for_skewed_keys() {
        let mut rng = StdRng::seed_from_u64(3);
        for size in [1, 2, 7, 64] {
            let mut keys: Vec<f64> = (0..200)
                .map(|_| rng.random_range(0.0f64..1.0).powi(4) * 100.0)
                .collect();
            keys.sort_by(f64::total_cmp);
            let (min, max) = (keys[0], keys[keys.len() - 1]);
            let function = HashFunction::new(keys.clone(), min, max, size);

            for _ in 0..500 {
                let value = rng.random_range(-5.0..105.0);
                assert_eq!(
                    function.lookup(value),
                    expected_lower_bound(&keys, value),
                    "value {} table size {}",
                    value,
                    size
                );
            }
        }
    }

    #[test]
    fn test_degenerate_ranges() {
        let same = HashFunction::new(vec![3.0, 3.0, 3.0], 3.0, 3.0, 4);
        assert_eq!(same.lookup(3.0), 0);
        assert_eq!(same.lookup(2.0), 0);
        assert_eq!(same.lookup(4.0), 2);

        let zero_table = HashFunction::new(vec![1.0, 2.0], 1.0, 2.0, 0);
        assert_eq!(zero_table.table_size(), 1);
        assert_eq!(zero_table.lookup(1.5), 1);

        let empty = HashFunction::new(Vec::new(), 0.0, 0.0, 3);
        assert!(empty.is_empty());
        assert_eq!(empty.lookup(1.0), 0);
    }
}
