use crate::error::CorruptorError;
use crate::preflight;
use crate::sampler::AddressSampler;
use crate::settings::Settings;
use crate::stream::{ChangeRecord, RunSummary, StreamCorruptor};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;
use std::io::{BufReader, BufWriter};

/// The generator a run uses: seeded from `seed` when given, otherwise from the thread RNG.
pub fn rng_for(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_rng(&mut rand::rng()),
    }
}

/// Copies `settings.source()` to `settings.destination()`, corrupting the requested bytes.
///
/// Addresses are sampled before either file is opened. The source is opened read-only
/// and the destination is created fresh; both are buffered and closed when this
/// returns. On an I/O error mid-run the partially written destination is left in place.
pub fn corrupt_file<S, R, F>(
    settings: &Settings,
    sampler: &mut S,
    rng: &mut R,
    on_change: F,
) -> Result<RunSummary, CorruptorError>
where
    S: AddressSampler<R>,
    R: Rng,
    F: FnMut(ChangeRecord),
{
    let request = settings.request();
    let addresses = sampler.sample(request.range(), request.count(), rng)?;

    let source = BufReader::new(preflight::open_source(settings.source())?);
    let destination = BufWriter::new(preflight::create_destination(settings.destination())?);
    log::info!(
        "Corrupting {} of {} bytes in {:?} with method {}, writing {:?}",
        addresses.len(),
        settings.file_size(),
        settings.source(),
        request.method().kind(),
        settings.destination()
    );

    let method = request.method();
    let mut corruptor = StreamCorruptor::new(source, destination, settings.file_size())
        .with_chunk_size(settings.chunk_size());
    let summary = corruptor.run(&addresses, |byte| method.apply(byte, &mut *rng), on_change)?;

    log::info!(
        "Wrote {:?}: {} bytes corrupted, {} copied unchanged",
        settings.destination(),
        summary.bytes_corrupted,
        summary.bytes_copied
    );
    Ok(summary)
}
