use futures::stream::{self, StreamExt, TryStreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::api_client::QueryExecutor;
use crate::error::FetchError;

pub const DEFAULT_PAGE_SIZE: usize = 5000;
pub const DEFAULT_CONCURRENCY: usize = 4;

/// One page request of a paginated collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub index: usize,
    pub size: usize,
}

/// A single page as returned by the server. `count` is the total across all pages.
#[derive(Debug, Clone, Deserialize)]
pub struct PagedResult<T> {
    pub count: usize,
    #[serde(default = "Vec::new", bound(deserialize = "T: Deserialize<'de>"))]
    pub rows: Vec<T>,
}

/// All pages of a collection concatenated in ascending page order.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedResult<T> {
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Copy)]
pub struct BatchSettings {
    pub page_size: usize,
    pub concurrency: usize,
    pub show_progress: bool,
}

impl Default for BatchSettings {
    fn default() -> Self {
        BatchSettings {
            page_size: DEFAULT_PAGE_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            show_progress: false,
        }
    }
}

impl BatchSettings {
    /// Reads `BATCH_PAGE_SIZE` and `BATCH_CONCURRENCY`, falling back to the defaults.
    pub fn from_env() -> Self {
        let page_size = std::env::var("BATCH_PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE);
        let concurrency = std::env::var("BATCH_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_CONCURRENCY);
        info!("Batch Config: PageSize={}, Concurrency={}", page_size, concurrency);
        BatchSettings {
            page_size,
            concurrency,
            show_progress: false,
        }
    }
}

/// Number of pages needed to cover `count` items.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size)
}

/// Walks a dot path such as `data.target.associatedDiseases`; a missing or null step is an error.
pub fn resolve_path<'v>(value: &'v Value, path: &str) -> Result<&'v Value, FetchError> {
    let mut current = value;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        current = match current.get(segment) {
            Some(Value::Null) | None => {
                return Err(FetchError::MissingPath {
                    path: path.to_string(),
                })
            }
            Some(next) => next,
        };
    }
    Ok(current)
}

/// Runs one query and decodes the value found at `path`.
pub async fn fetch_at_path<E, T>(
    executor: &E,
    query: &str,
    variables: &Map<String, Value>,
    path: &str,
) -> Result<T, FetchError>
where
    E: QueryExecutor + ?Sized,
    T: DeserializeOwned,
{
    let response = executor.execute(query, variables).await?;
    let value = resolve_path(&response, path)?;
    T::deserialize(value).map_err(|source| FetchError::Decode {
        path: path.to_string(),
        source,
    })
}

/// Fetches every page of a paginated query and concatenates the rows.
pub struct BatchAggregator<'a, E: ?Sized> {
    executor: &'a E,
    query: String,
    base_variables: Map<String, Value>,
    data_path: String,
    settings: BatchSettings,
}

impl<'a, E> BatchAggregator<'a, E>
where
    E: QueryExecutor + ?Sized,
{
    pub fn new(
        executor: &'a E,
        query: impl Into<String>,
        base_variables: Map<String, Value>,
        data_path: impl Into<String>,
    ) -> Self {
        BatchAggregator {
            executor,
            query: query.into(),
            base_variables,
            data_path: data_path.into(),
            settings: BatchSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: BatchSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.settings.page_size = page_size;
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.settings.concurrency = concurrency;
        self
    }

    /// Fetches page 0, reads `count`, then fetches the remaining pages.
    ///
    /// Pages after the first are requested concurrently (bounded by the configured
    /// concurrency) but always concatenated in page order. The first failing page
    /// aborts the whole aggregation and nothing fetched so far is returned.
    pub async fn fetch_all<T>(&self) -> Result<AggregatedResult<T>, FetchError>
    where
        T: DeserializeOwned,
    {
        let page_size = self.settings.page_size;
        if page_size == 0 {
            return Err(FetchError::InvalidPageSize);
        }

        let first: PagedResult<T> = self.fetch_page(0).await?;
        let count = first.count;
        if count == 0 {
            debug!("'{}' reported zero rows, skipping remaining pages", self.data_path);
            return Ok(AggregatedResult { items: Vec::new() });
        }

        let pages = total_pages(count, page_size);
        info!(
            "Aggregating {} rows from '{}' in {} pages of {}",
            count, self.data_path, pages, page_size
        );
        let progress = self.progress_bar(pages);
        progress.inc(1);

        let concurrency = self.settings.concurrency.max(1);
        let remaining: Result<Vec<PagedResult<T>>, FetchError> = stream::iter(1..pages)
            .map(|index| {
                let progress = progress.clone();
                async move {
                    let page = self.fetch_page::<T>(index).await?;
                    progress.inc(1);
                    Ok::<_, FetchError>(page)
                }
            })
            .buffered(concurrency)
            .try_collect()
            .await;

        let remaining = match remaining {
            Ok(remaining) => remaining,
            Err(e) => {
                progress.abandon();
                warn!("Aggregation of '{}' aborted: {}", self.data_path, e);
                return Err(e);
            }
        };
        progress.finish_and_clear();

        let mut items = first.rows;
        items.reserve(count.saturating_sub(items.len()));
        for page in remaining {
            items.extend(page.rows);
        }

        if items.len() != count {
            warn!(
                "'{}' aggregated {} rows but the first page reported {}; the collection changed while paging",
                self.data_path,
                items.len(),
                count
            );
        }
        Ok(AggregatedResult { items })
    }

    async fn fetch_page<T>(&self, index: usize) -> Result<PagedResult<T>, FetchError>
    where
        T: DeserializeOwned,
    {
        let page = Page {
            index,
            size: self.settings.page_size,
        };
        let mut variables = self.base_variables.clone();
        variables.insert("index".to_string(), Value::from(page.index));
        variables.insert("size".to_string(), Value::from(page.size));

        debug!("Requesting page {} of '{}'", page.index, self.data_path);
        fetch_at_path(self.executor, &self.query, &variables, &self.data_path).await
    }

    fn progress_bar(&self, pages: usize) -> ProgressBar {
        if !self.settings.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(pages as u64);
        bar.set_style(
            ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}/{len} pages")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        bar.set_message(self.data_path.clone());
        bar
    }
}
