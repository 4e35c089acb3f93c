//! In-memory page source
//!
//! Filters, sorts and slices a local row set the way a server would, so the
//! table can be driven without any backend.

use crate::core::{ColumnDescriptor, PageRequest, PageResponse, SortDirection};
use crate::services::PageSource;
use async_trait::async_trait;
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use std::cmp::Ordering;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug)]
pub struct MemoryPageSource {
    columns: Vec<ColumnDescriptor>,
    rows: Vec<Vec<String>>,
    latency: Option<Duration>,
    /// Fail every Nth fetch (1-based); 0 disables
    fail_every: usize,
    fetch_count: AtomicUsize,
}

impl MemoryPageSource {
    pub fn new(columns: Vec<ColumnDescriptor>, rows: Vec<Vec<String>>) -> Self {
        Self {
            columns,
            rows,
            latency: None,
            fail_every: 0,
            fetch_count: AtomicUsize::new(0),
        }
    }

    /// Load rows from a CSV file; the header row becomes sortable columns
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .wrap_err_with(|| format!("Failed to open CSV file {}", path.display()))?;

        let headers = reader.headers()?.clone();
        let columns: Vec<ColumnDescriptor> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let label = h.trim();
                let id = if label.is_empty() {
                    format!("column_{i}")
                } else {
                    label.to_lowercase().replace(' ', "_")
                };
                ColumnDescriptor::new(id, label).sortable()
            })
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(columns.len(), String::new());
            rows.push(row);
        }
        info!(
            "Loaded {} rows x {} columns from {}",
            rows.len(),
            columns.len(),
            path.display()
        );
        Ok(Self::new(columns, rows))
    }

    /// Delay every fetch, to make the loading indicator observable
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = (!latency.is_zero()).then_some(latency);
        self
    }

    /// Fail every `n`th fetch
    pub fn with_failure_every(mut self, n: usize) -> Self {
        self.fail_every = n;
        self
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_index(&self, id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == id)
    }

    /// Synchronous core of `fetch_page`
    pub fn page(&self, request: &PageRequest) -> Result<PageResponse> {
        let needle = request.query.as_ref().map(|q| q.to_lowercase());
        let mut matched: Vec<&Vec<String>> = self
            .rows
            .iter()
            .filter(|row| match &needle {
                Some(n) => row.iter().any(|cell| cell.to_lowercase().contains(n)),
                None => true,
            })
            .collect();

        if let Some(column) = &request.sort_column {
            if request.sort_direction.is_active() {
                let idx = self
                    .column_index(column)
                    .ok_or_else(|| eyre!("Unknown sort column '{column}'"))?;
                matched.sort_by(|a, b| {
                    let ord = compare_cells(cell(a, idx), cell(b, idx));
                    match request.sort_direction {
                        SortDirection::Descending => ord.reverse(),
                        _ => ord,
                    }
                });
            }
        }

        let total = matched.len();
        let start = request.offset().min(total);
        let end = start.saturating_add(request.rows_per_page).min(total);
        let rows = matched[start..end].iter().map(|r| (*r).clone()).collect();
        Ok(PageResponse { rows, start, total })
    }
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// Numeric comparison when both cells parse as numbers, text otherwise
fn compare_cells(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

#[async_trait]
impl PageSource for MemoryPageSource {
    async fn fetch_page(&self, request: PageRequest) -> Result<PageResponse> {
        let n = self.fetch_count.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        debug!("MemoryPageSource fetch #{n}: {request:?}");
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.fail_every > 0 && n % self.fail_every == 0 {
            return Err(eyre!("Simulated failure on fetch #{n}"));
        }
        self.page(&request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn people() -> MemoryPageSource {
        let columns = vec![
            ColumnDescriptor::new("name", "Name").sortable(),
            ColumnDescriptor::new("age", "Age").sortable(),
        ];
        let rows = [
            ("Alice", "30"),
            ("bob", "9"),
            ("Carol", "41"),
            ("Dave", "100"),
            ("Eve", "27"),
        ]
        .iter()
        .map(|(n, a)| vec![n.to_string(), a.to_string()])
        .collect();
        MemoryPageSource::new(columns, rows)
    }

    fn request(page: usize, rpp: usize) -> PageRequest {
        PageRequest {
            page,
            rows_per_page: rpp,
            query: None,
            sort_column: None,
            sort_direction: SortDirection::None,
        }
    }

    fn names(response: &PageResponse) -> Vec<&str> {
        response.rows.iter().map(|r| r[0].as_str()).collect()
    }

    #[test]
    fn test_slices_pages() {
        let source = people();
        let page = source.page(&request(1, 2)).unwrap();
        assert_eq!(page.start, 2);
        assert_eq!(page.total, 5);
        assert_eq!(names(&page), vec!["Carol", "Dave"]);

        let last = source.page(&request(2, 2)).unwrap();
        assert_eq!(names(&last), vec!["Eve"]);
        assert_eq!(last.end(), 5);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let page = people().page(&request(9, 2)).unwrap();
        assert!(page.rows.is_empty());
        assert_eq!(page.start, 5);
        assert_eq!(page.total, 5);
    }

    #[test]
    fn test_query_filters_case_insensitive() {
        let mut req = request(0, 10);
        req.query = Some("AL".to_string());
        let page = people().page(&req).unwrap();
        assert_eq!(names(&page), vec!["Alice"]);
        assert_eq!(page.total, 1);
    }

    #[test]
    fn test_numeric_sort() {
        let mut req = request(0, 10);
        req.sort_column = Some("age".to_string());
        req.sort_direction = SortDirection::Ascending;
        let page = people().page(&req).unwrap();
        assert_eq!(names(&page), vec!["bob", "Eve", "Alice", "Carol", "Dave"]);

        req.sort_direction = SortDirection::Descending;
        let page = people().page(&req).unwrap();
        assert_eq!(names(&page), vec!["Dave", "Carol", "Alice", "Eve", "bob"]);
    }

    #[test]
    fn test_text_sort_ignores_case() {
        let mut req = request(0, 10);
        req.sort_column = Some("name".to_string());
        req.sort_direction = SortDirection::Ascending;
        let page = people().page(&req).unwrap();
        assert_eq!(names(&page), vec!["Alice", "bob", "Carol", "Dave", "Eve"]);
    }

    #[test]
    fn test_unknown_sort_column_errors() {
        let mut req = request(0, 10);
        req.sort_column = Some("height".to_string());
        req.sort_direction = SortDirection::Ascending;
        assert!(people().page(&req).is_err());
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let source = people().with_failure_every(2);
        assert!(source.fetch_page(request(0, 2)).await.is_ok());
        assert!(source.fetch_page(request(0, 2)).await.is_err());
        assert!(source.fetch_page(request(0, 2)).await.is_ok());
    }

    #[test]
    fn test_huge_page_size_returns_everything() {
        let page = people().page(&request(0, usize::MAX)).unwrap();
        assert_eq!(page.start, 0);
        assert_eq!(page.total, 5);
        assert_eq!(names(&page), vec!["Alice", "bob", "Carol", "Dave", "Eve"]);

        let past = people().page(&request(3, usize::MAX)).unwrap();
        assert!(past.rows.is_empty());
        assert_eq!(past.start, 5);
    }
}
