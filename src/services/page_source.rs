use crate::core::{PageRequest, PageResponse};
use async_trait::async_trait;
use color_eyre::Result;
use std::future::Future;

/// Data-access boundary of the paged table
///
/// The table never knows where rows come from: a local vector, a remote
/// RPC or a database query all sit behind this trait.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch one page of rows for the given display parameters
    async fn fetch_page(&self, request: PageRequest) -> Result<PageResponse>;
}

/// Any async closure taking a `PageRequest` is a page source
#[async_trait]
impl<F, Fut> PageSource for F
where
    F: Fn(PageRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<PageResponse>> + Send,
{
    async fn fetch_page(&self, request: PageRequest) -> Result<PageResponse> {
        (self)(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SortDirection;
    use color_eyre::eyre::eyre;
    use std::sync::Arc;

    fn request(page: usize) -> PageRequest {
        PageRequest {
            page,
            rows_per_page: 10,
            query: None,
            sort_column: None,
            sort_direction: SortDirection::None,
        }
    }

    #[tokio::test]
    async fn test_closure_is_page_source() {
        let source: Arc<dyn PageSource> = Arc::new(|req: PageRequest| async move {
            Ok::<_, color_eyre::Report>(PageResponse {
                rows: vec![vec![format!("page {}", req.page)]],
                start: req.offset(),
                total: 100,
            })
        });

        let response = source.fetch_page(request(3)).await.unwrap();
        assert_eq!(response.start, 30);
        assert_eq!(response.rows[0][0], "page 3");
    }

    #[tokio::test]
    async fn test_closure_error_propagates() {
        let source: Arc<dyn PageSource> =
            Arc::new(|_req: PageRequest| async move {
                Err::<PageResponse, _>(eyre!("backend down"))
            });

        let err = source.fetch_page(request(0)).await.unwrap_err();
        assert!(err.to_string().contains("backend down"));
    }
}
