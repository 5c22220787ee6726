use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::error::FlyoverResult;

/// Properties carried by the bundled country boundary dataset. Field names
/// match the upstream Natural Earth attributes verbatim; the highlight layer
/// filters on `ISO_A2`.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CountryProperties {
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "ISO_A2")]
    pub iso_a2: String,
    #[serde(rename = "ISO_A3")]
    pub iso_a3: String,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CountryFeature {
    #[serde(rename = "type")]
    pub feature_type: String,
    pub properties: CountryProperties,
    /// Polygon or MultiPolygon geometry, passed through to the renderer
    /// untouched.
    pub geometry: serde_json::Value,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CountryCollection {
    #[serde(rename = "type")]
    pub collection_type: String,
    pub features: Vec<CountryFeature>,
}

/// Provider of the country boundary GeoJSON (bundled asset, network fetch).
#[async_trait]
pub trait CountrySource: Send + Sync {
    async fn fetch(&self) -> FlyoverResult<CountryCollection>;
}

/// Lazily-loaded, shared country boundary data. The first caller triggers
/// the fetch and concurrent first callers share that one in-flight load; a
/// failed load leaves the cell empty so a later export can retry.
pub struct CountryStore {
    source: Arc<dyn CountrySource>,
    cell: OnceCell<Arc<CountryCollection>>,
}

impl CountryStore {
    pub fn new(source: Arc<dyn CountrySource>) -> Self {
        Self {
            source,
            cell: OnceCell::new(),
        }
    }

    pub async fn get(&self) -> FlyoverResult<Arc<CountryCollection>> {
        let collection = self
            .cell
            .get_or_try_init(|| async {
                let collection = self.source.fetch().await?;
                tracing::debug!(features = collection.features.len(), "country data loaded");
                Ok::<_, crate::error::FlyoverError>(Arc::new(collection))
            })
            .await?;
        Ok(Arc::clone(collection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlyoverError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn one_country() -> CountryCollection {
        serde_json::from_value(serde_json::json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "NAME": "France", "ISO_A2": "FR", "ISO_A3": "FRA" },
                "geometry": { "type": "Polygon", "coordinates": [] }
            }]
        }))
        .unwrap()
    }

    struct CountingSource {
        fetches: AtomicUsize,
        fail_first: AtomicUsize,
    }

    #[async_trait]
    impl CountrySource for CountingSource {
        async fn fetch(&self) -> FlyoverResult<CountryCollection> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_first.load(Ordering::SeqCst) > 0 {
                self.fail_first.fetch_sub(1, Ordering::SeqCst);
                return Err(FlyoverError::renderer("country fetch failed"));
            }
            Ok(one_country())
        }
    }

    fn source(fail_first: usize) -> Arc<CountingSource> {
        Arc::new(CountingSource {
            fetches: AtomicUsize::new(0),
            fail_first: AtomicUsize::new(fail_first),
        })
    }

    #[tokio::test]
    async fn repeated_gets_share_one_fetch() {
        let src = source(0);
        let store = Arc::new(CountryStore::new(src.clone()));

        let a = Arc::clone(&store);
        let b = Arc::clone(&store);
        let (ra, rb) = tokio::join!(a.get(), b.get());
        assert!(ra.is_ok() && rb.is_ok());
        assert!(store.get().await.is_ok());
        assert_eq!(src.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_fetch_is_retried_on_next_get() {
        let src = source(1);
        let store = CountryStore::new(src.clone());

        assert!(store.get().await.is_err());
        let collection = store.get().await.unwrap();
        assert_eq!(collection.features[0].properties.iso_a2, "FR");
        assert_eq!(src.fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn dataset_field_names_round_trip() {
        let collection = one_country();
        let value = serde_json::to_value(&collection).unwrap();
        assert_eq!(value["features"][0]["properties"]["ISO_A2"], "FR");
        assert_eq!(value["type"], "FeatureCollection");
    }
}
