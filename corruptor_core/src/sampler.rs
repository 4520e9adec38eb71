use crate::error::CorruptorError;
use crate::range::CorruptionRange;
use rand::Rng;
use rand::seq::index;

/// A strictly ascending list of distinct byte addresses.
///
/// Built once per run by an [`AddressSampler`] and consumed by the stream corruptor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddressSet {
    addresses: Vec<u64>,
}

impl AddressSet {
    /// Sorts `addresses` and wraps them. Fails if any address repeats.
    pub fn from_unsorted(mut addresses: Vec<u64>) -> Result<Self, CorruptorError> {
        addresses.sort_unstable();
        Self::from_sorted(addresses)
    }

    /// Wraps addresses that must already be strictly ascending.
    pub fn from_sorted(addresses: Vec<u64>) -> Result<Self, CorruptorError> {
        if let Some(pair) = addresses.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(CorruptorError::InvalidAddresses(format!(
                "{:#x} is followed by {:#x}",
                pair[0], pair[1]
            )));
        }
        Ok(Self { addresses })
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.addresses
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.addresses.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn first(&self) -> Option<u64> {
        self.addresses.first().copied()
    }

    pub fn last(&self) -> Option<u64> {
        self.addresses.last().copied()
    }
}

/// Picks the addresses a run will corrupt.
///
/// Implementations must return exactly `count` distinct addresses from `range`, ascending.
/// The random source is injected so tests can run with a fixed seed.
pub trait AddressSampler<R: Rng + ?Sized> {
    fn sample(
        &mut self,
        range: CorruptionRange,
        count: u64,
        rng: &mut R,
    ) -> Result<AddressSet, CorruptorError>;
}

/// Uniform sampling without replacement over the range.
///
/// Delegates to [`rand::seq::index::sample`], which switches between Floyd's
/// algorithm, rejection sampling and a partial shuffle depending on how `count`
/// compares to the range length. Floyd and rejection sampling keep memory at
/// O(`count`). The partial shuffle allocates the whole index space but is only
/// chosen for ranges below a few hundred thousand addresses, or when `count` is
/// already a large fraction of the range.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSampler;

impl RandomSampler {
    pub fn new() -> Self {
        RandomSampler
    }
}

impl<R: Rng + ?Sized> AddressSampler<R> for RandomSampler {
    fn sample(
        &mut self,
        range: CorruptionRange,
        count: u64,
        rng: &mut R,
    ) -> Result<AddressSet, CorruptorError> {
        let invalid = || CorruptorError::InvalidRange {
            start: range.start(),
            length: range.length(),
            count,
        };
        if count == 0 || count > range.length() {
            return Err(invalid());
        }
        let length = usize::try_from(range.length()).map_err(|_| invalid())?;
        let amount = usize::try_from(count).map_err(|_| invalid())?;

        let offsets = index::sample(rng, length, amount).into_vec();
        log::debug!(
            "Sampled {} addresses from {:#x}..{:#x}",
            offsets.len(),
            range.start(),
            range.end()
        );
        AddressSet::from_unsorted(
            offsets
                .into_iter()
                .map(|offset| range.start() + offset as u64)
                .collect(),
        )
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;
    use rand_core::SeedableRng;
    use std::collections::HashSet;

    fn assert_valid_sample(set: &AddressSet, range: CorruptionRange, count: u64) {
        assert_eq!(set.len() as u64, count, "wrong number of addresses");
        assert!(
            set.as_slice().windows(2).all(|pair| pair[0] < pair[1]),
            "addresses must be strictly ascending: {:?}",
            set.as_slice()
        );
        for address in set.iter() {
            assert!(
                range.contains(address),
                "address {address:#x} outside {:#x}..{:#x}",
                range.start(),
                range.end()
            );
        }
    }

    #[test]
    fn random_sampler_returns_count_distinct_sorted_addresses() {
        let mut sampler = RandomSampler::new();
        let mut rng = ChaCha8Rng::from_seed([5u8; 32]);
        let range = CorruptionRange::new(0x100, 0x400, 0x1000).unwrap();

        for count in [1, 2, 17, 0x200, 0x400] {
            let set = sampler.sample(range, count, &mut rng).unwrap();
            assert_valid_sample(&set, range, count);
        }
    }

    #[test]
    fn random_sampler_full_range_selects_every_address() {
        let mut sampler = RandomSampler::new();
        let mut rng = ChaCha8Rng::from_seed([6u8; 32]);
        let range = CorruptionRange::new(4, 4, 16).unwrap();

        let set = sampler.sample(range, 4, &mut rng).unwrap();
        assert_eq!(set.as_slice(), &[4, 5, 6, 7]);
    }

    #[test]
    fn random_sampler_single_address_range() {
        let mut sampler = RandomSampler::new();
        let mut rng = ChaCha8Rng::from_seed([7u8; 32]);
        let range = CorruptionRange::new(9, 1, 10).unwrap();

        let set = sampler.sample(range, 1, &mut rng).unwrap();
        assert_eq!(set.as_slice(), &[9]);
    }

    #[test]
    fn random_sampler_reaches_every_address_eventually() {
        let mut sampler = RandomSampler::new();
        let mut rng = ChaCha8Rng::from_seed([8u8; 32]);
        let range = CorruptionRange::new(10, 8, 32).unwrap();

        let mut seen = HashSet::new();
        for _ in 0..200 {
            let set = sampler.sample(range, 2, &mut rng).unwrap();
            assert_valid_sample(&set, range, 2);
            seen.extend(set.iter());
        }
        assert_eq!(seen.len(), 8, "every eligible address should be picked: {seen:?}");
    }

    #[test]
    fn random_sampler_handles_huge_range_with_small_count() {
        let mut sampler = RandomSampler::new();
        let mut rng = ChaCha8Rng::from_seed([9u8; 32]);
        let range = CorruptionRange::new(1 << 20, 1 << 40, (1 << 40) + (1 << 20)).unwrap();

        let set = sampler.sample(range, 64, &mut rng).unwrap();
        assert_valid_sample(&set, range, 64);
    }

    #[test]
    fn random_sampler_rejects_invalid_counts() {
        let mut sampler = RandomSampler::new();
        let mut rng = ChaCha8Rng::from_seed([0u8; 32]);
        let range = CorruptionRange::new(0, 4, 4).unwrap();

        match sampler.sample(range, 0, &mut rng) {
            Err(CorruptorError::InvalidRange { count: 0, .. }) => {}
            other => panic!("expected InvalidRange for count 0, got {other:?}"),
        }
        match sampler.sample(range, 5, &mut rng) {
            Err(CorruptorError::InvalidRange { count: 5, .. }) => {}
            other => panic!("expected InvalidRange for count 5, got {other:?}"),
        }
    }

    #[test]
    fn address_set_rejects_duplicates_and_disorder() {
        assert!(AddressSet::from_sorted(vec![1, 1]).is_err());
        assert!(AddressSet::from_sorted(vec![2, 1]).is_err());
        assert!(AddressSet::from_unsorted(vec![3, 3]).is_err());

        let set = AddressSet::from_unsorted(vec![7, 2, 5]).unwrap();
        assert_eq!(set.as_slice(), &[2, 5, 7]);
        assert_eq!(set.first(), Some(2));
        assert_eq!(set.last(), Some(7));
    }
}
