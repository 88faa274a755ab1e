mod cache;
mod clock;
mod decode;
mod error;
mod fetcher;
#[cfg(test)]
pub(crate) mod testing;
mod types;
mod upstream;

pub use cache::{PositionCache, DEFAULT_MIN_INTERVAL};
pub use clock::{Clock, ManualClock, SystemClock};
pub use decode::{classify, satellite_id, to_sample, Decoded, PositionRecord};
pub use error::{FetchError, UpstreamError};
pub use fetcher::{FetchOutcome, PositionFetcher};
pub use types::{Observer, PositionBatch, PositionSample, Positions, PositionsResponse};
pub use upstream::{N2yoClient, PositionSource, RawBody, UpstreamReply, DEFAULT_BASE_URL};
