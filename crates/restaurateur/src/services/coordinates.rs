//! Address coordinate cache.
//!
//! Two tiers sit in front of the geocoder: an in-process `moka` memo of
//! located addresses, and the `addresses` table. Read paths
//! ([`CoordinateCache::lookup_many`]) only ever touch those two tiers;
//! [`CoordinateCache::locate`] is the only call that reaches the network.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};

use star_burger_core::{Coordinate, Restaurant};

use crate::db::{self, RepositoryError};
use crate::geocoder::GeocoderClient;

/// Coordinate lookups backed by the `addresses` table and the geocoder.
#[derive(Clone)]
pub struct CoordinateCache {
    inner: Arc<CoordinateCacheInner>,
}

struct CoordinateCacheInner {
    pool: PgPool,
    geocoder: Option<GeocoderClient>,
    /// Located addresses only; misses are always re-read from the table.
    memo: Cache<String, Coordinate>,
}

/// What one geocoder round trip produced.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Lookup {
    /// No geocoder is configured; nothing was asked.
    Disabled,
    Located(Coordinate),
    /// The geocoder was asked and had no answer, or failed.
    NotLocated,
}

impl Lookup {
    const fn coordinate(self) -> Option<Coordinate> {
        match self {
            Self::Located(coordinate) => Some(coordinate),
            Self::Disabled | Self::NotLocated => None,
        }
    }
}

impl std::fmt::Debug for CoordinateCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinateCache")
            .field("geocoder", &self.inner.geocoder)
            .field("memo_entries", &self.inner.memo.entry_count())
            .finish_non_exhaustive()
    }
}

impl CoordinateCache {
    /// Create a cache. Without a geocoder, [`Self::locate`] only reads.
    #[must_use]
    pub fn new(pool: PgPool, geocoder: Option<GeocoderClient>, capacity: u64) -> Self {
        let memo = Cache::builder().max_capacity(capacity).build();

        Self {
            inner: Arc::new(CoordinateCacheInner {
                pool,
                geocoder,
                memo,
            }),
        }
    }

    /// The pool the cache reads and writes through.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Whether a geocoder is configured.
    #[must_use]
    pub fn geocoding_enabled(&self) -> bool {
        self.inner.geocoder.is_some()
    }

    /// Known coordinates for the given addresses.
    ///
    /// Addresses that were never located are absent from the result. Never
    /// calls the geocoder.
    ///
    /// # Errors
    ///
    /// Returns an error if the `addresses` table cannot be read.
    #[instrument(skip(self, addresses))]
    pub async fn lookup_many<I, S>(
        &self,
        addresses: I,
    ) -> Result<HashMap<String, Coordinate>, RepositoryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut found = HashMap::new();
        let mut seen = HashSet::new();
        let mut misses = Vec::new();

        for address in addresses {
            let address = address.as_ref();
            if !seen.insert(address.to_owned()) {
                continue;
            }
            match self.inner.memo.get(address).await {
                Some(coordinate) => {
                    found.insert(address.to_owned(), coordinate);
                }
                None => misses.push(address.to_owned()),
            }
        }

        debug!(hits = found.len(), misses = misses.len(), "Coordinate memo lookup");

        for entry in db::addresses::find_many(&self.inner.pool, &misses).await? {
            if let Some(coordinate) = entry.coordinate {
                self.inner
                    .memo
                    .insert(entry.address.clone(), coordinate)
                    .await;
                found.insert(entry.address, coordinate);
            }
        }

        Ok(found)
    }

    /// Coordinate of `address`, geocoding it if it has none yet.
    ///
    /// The cache row is created on first sight. A geocoder failure is logged
    /// and recorded as "not located"; it never fails the call. Without a
    /// geocoder the row is left unlocated and untouched, so a later run with
    /// a key still picks it up.
    ///
    /// # Errors
    ///
    /// Returns an error only for database failures.
    #[instrument(skip(self))]
    pub async fn locate(&self, address: &str) -> Result<Option<Coordinate>, RepositoryError> {
        if let Some(coordinate) = self.inner.memo.get(address).await {
            return Ok(Some(coordinate));
        }

        let (entry, _created) = db::addresses::get_or_create(&self.inner.pool, address).await?;
        if let Some(coordinate) = entry.coordinate {
            self.inner.memo.insert(entry.address, coordinate).await;
            return Ok(Some(coordinate));
        }

        match self.fetch(address).await {
            Lookup::Disabled => Ok(None),
            Lookup::NotLocated => {
                db::addresses::set_coordinate(&self.inner.pool, address, None).await?;
                Ok(None)
            }
            Lookup::Located(coordinate) => {
                db::addresses::set_coordinate(&self.inner.pool, address, Some(coordinate))
                    .await?;
                self.inner.memo.insert(address.to_owned(), coordinate).await;
                Ok(Some(coordinate))
            }
        }
    }

    /// Geocode a restaurant's address and store the result on its row.
    ///
    /// A failed lookup clears the stored location. Without a geocoder the
    /// row is left untouched and `None` is returned.
    ///
    /// # Errors
    ///
    /// Returns an error only for database failures.
    #[instrument(skip(self, restaurant), fields(restaurant_id = %restaurant.id))]
    pub async fn geocode_restaurant(
        &self,
        restaurant: &Restaurant,
    ) -> Result<Option<Coordinate>, RepositoryError> {
        let lookup = self.fetch(&restaurant.address).await;
        if lookup == Lookup::Disabled {
            debug!("Geocoder not configured, skipping restaurant");
            return Ok(None);
        }

        let coordinate = lookup.coordinate();
        db::restaurants::set_coordinate(&self.inner.pool, restaurant.id, coordinate).await?;
        Ok(coordinate)
    }

    /// Ask the geocoder, folding every failure into [`Lookup::NotLocated`].
    async fn fetch(&self, address: &str) -> Lookup {
        let Some(geocoder) = self.inner.geocoder.as_ref() else {
            return Lookup::Disabled;
        };
        if address.trim().is_empty() {
            return Lookup::NotLocated;
        }

        match geocoder.fetch_coordinates(address).await {
            Ok(Some(coordinate)) => Lookup::Located(coordinate),
            Ok(None) => {
                debug!(address, "Geocoder found nothing");
                Lookup::NotLocated
            }
            Err(e) => {
                warn!(address, error = %e, "Geocoder lookup failed");
                Lookup::NotLocated
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use url::Url;

    use crate::config::GeocoderConfig;

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://localhost/star_burger_test")
            .unwrap()
    }

    #[tokio::test]
    async fn test_lookup_many_serves_memo_without_database() {
        let cache = CoordinateCache::new(lazy_pool(), None, 16);
        let arbat = Coordinate::new(55.7522, 37.5929).unwrap();
        cache.inner.memo.insert("Arbat 1".to_owned(), arbat).await;

        // Every address is memoized, so the lazy pool is never used.
        let found = cache.lookup_many(["Arbat 1", "Arbat 1"]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found.get("Arbat 1"), Some(&arbat));
    }

    #[tokio::test]
    async fn test_lookup_many_folds_repeated_addresses() {
        let cache = CoordinateCache::new(lazy_pool(), None, 16);
        let arbat = Coordinate::new(55.7522, 37.5929).unwrap();
        let tverskaya = Coordinate::new(55.7649, 37.6056).unwrap();
        cache.inner.memo.insert("Arbat 1".to_owned(), arbat).await;
        cache
            .inner
            .memo
            .insert("Tverskaya 7".to_owned(), tverskaya)
            .await;

        let addresses: Vec<String> = std::iter::repeat(["Arbat 1", "Tverskaya 7"])
            .take(500)
            .flatten()
            .map(str::to_owned)
            .collect();
        let found = cache.lookup_many(&addresses).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found.get("Tverskaya 7"), Some(&tverskaya));
    }

    #[tokio::test]
    async fn test_locate_prefers_memo() {
        let cache = CoordinateCache::new(lazy_pool(), None, 16);
        let tverskaya = Coordinate::new(55.7649, 37.6056).unwrap();
        cache
            .inner
            .memo
            .insert("Tverskaya 7".to_owned(), tverskaya)
            .await;

        assert_eq!(cache.locate("Tverskaya 7").await.unwrap(), Some(tverskaya));
    }

    #[tokio::test]
    async fn test_fetch_without_geocoder_is_disabled() {
        let cache = CoordinateCache::new(lazy_pool(), None, 16);
        assert!(!cache.geocoding_enabled());
        assert_eq!(cache.fetch("Arbat 1").await, Lookup::Disabled);
        assert_eq!(cache.fetch("Arbat 1").await.coordinate(), None);
    }

    #[tokio::test]
    async fn test_fetch_with_unreachable_geocoder_is_not_located() {
        let config = GeocoderConfig {
            api_key: SecretString::from("3f5c2b1a-9d8e-4f7a-b6c5-0e1d2c3b4a59".to_owned()),
            base_url: Url::parse("http://127.0.0.1:1/1.x/").unwrap(),
            timeout: std::time::Duration::from_secs(1),
        };
        let geocoder = GeocoderClient::new(&config).unwrap();
        let cache = CoordinateCache::new(lazy_pool(), Some(geocoder), 16);

        assert!(cache.geocoding_enabled());
        assert_eq!(cache.fetch("Arbat 1").await, Lookup::NotLocated);
        assert_eq!(cache.fetch("   ").await, Lookup::NotLocated);
    }

    #[tokio::test]
    async fn test_geocode_restaurant_without_geocoder_leaves_row() {
        let cache = CoordinateCache::new(lazy_pool(), None, 16);
        let restaurant = Restaurant {
            id: star_burger_core::RestaurantId::new(1),
            name: "Star Burger Arbat".to_owned(),
            address: "Arbat 1".to_owned(),
            contact_phone: String::new(),
            coordinate: None,
        };

        assert_eq!(cache.geocode_restaurant(&restaurant).await.unwrap(), None);
    }
}
