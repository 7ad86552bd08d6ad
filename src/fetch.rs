use std::fmt;
use std::thread;
use std::time::Duration;

use serde::de::{Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::value::RawValue;
use tracing::{info, warn};

use crate::cinemeta::MetaClient;
use crate::domain::{FetchOutcome, FetchedMeta, ImdbId, SkipReason};

/// Pause between two remote lookups.
pub trait Throttle {
    fn pause(&self, delay: Duration);
}

impl<T: Throttle + ?Sized> Throttle for &T {
    fn pause(&self, delay: Duration) {
        (**self).pause(delay);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl Throttle for ThreadSleep {
    fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
}

/// Top-level response object. Only the first `meta` member counts; repeated
/// keys are ignored rather than rejected.
struct MetaEnvelope<'a> {
    meta: Option<&'a RawValue>,
}

impl<'de> Deserialize<'de> for MetaEnvelope<'de> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(EnvelopeVisitor)
    }
}

struct EnvelopeVisitor;

impl<'de> Visitor<'de> for EnvelopeVisitor {
    type Value = MetaEnvelope<'de>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut meta: Option<Option<&'de RawValue>> = None;
        while let Some(key) = map.next_key::<String>()? {
            if key == "meta" && meta.is_none() {
                meta = Some(map.next_value()?);
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(MetaEnvelope {
            meta: meta.flatten(),
        })
    }
}

/// Pulls the `meta` sub-document out of a response body as raw JSON text.
pub fn extract_meta(body: &str) -> Result<String, SkipReason> {
    let document = body.trim();
    if document.is_empty() {
        return Err(SkipReason::MissingMeta);
    }
    let document: &RawValue =
        serde_json::from_str(document).map_err(|err| SkipReason::InvalidJson(err.to_string()))?;
    // Only objects can carry a `meta` member.
    if !document.get().starts_with('{') {
        return Err(SkipReason::MissingMeta);
    }
    let envelope: MetaEnvelope<'_> = serde_json::from_str(document.get())
        .map_err(|err| SkipReason::InvalidJson(err.to_string()))?;
    match envelope.meta {
        Some(raw) if !raw.get().trim().is_empty() => Ok(raw.get().to_string()),
        _ => Err(SkipReason::MissingMeta),
    }
}

pub struct Fetcher<C: MetaClient, T: Throttle> {
    client: C,
    throttle: T,
    delay: Duration,
}

impl<C: MetaClient, T: Throttle> Fetcher<C, T> {
    pub fn new(client: C, throttle: T, delay: Duration) -> Self {
        Self {
            client,
            throttle,
            delay,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn fetch_one(&self, id: &ImdbId) -> FetchOutcome {
        info!("Fetching meta for {id}");
        let result = self
            .client
            .fetch_body(id)
            .and_then(|body| extract_meta(&body));
        match result {
            Ok(raw) => FetchOutcome::Fetched(FetchedMeta {
                id: id.clone(),
                raw,
            }),
            Err(reason) => {
                warn!("Skipping {id}: {reason}");
                FetchOutcome::Skipped {
                    id: id.clone(),
                    reason,
                }
            }
        }
    }

    /// Looks up each identifier in order, pausing after every attempt.
    pub fn fetch_all(&self, ids: &[ImdbId]) -> Vec<FetchOutcome> {
        ids.iter()
            .map(|id| {
                let outcome = self.fetch_one(id);
                self.throttle.pause(self.delay);
                outcome
            })
            .collect()
    }

    /// Like [`Fetcher::fetch_all`], keeping only the successful payloads.
    pub fn fetch_metas(&self, ids: &[ImdbId]) -> Vec<FetchedMeta> {
        self.fetch_all(ids)
            .into_iter()
            .filter_map(FetchOutcome::into_fetched)
            .collect()
    }
}
