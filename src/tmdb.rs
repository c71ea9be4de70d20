use std::{num::NonZeroU32, sync::Arc};

use async_trait::async_trait;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use reqwest::StatusCode;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::models::{Candidate, MovieDetail, NewMovie, release_year};

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("movie database refused the request: {0}")]
    Auth(String),
    #[error("movie database has no movie with id {0}")]
    NotFound(i64),
    #[error("movie database request failed: {0}")]
    Upstream(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SearchError::Upstream("request timed out".to_string())
        } else if err.is_decode() {
            SearchError::Upstream(format!("invalid response body: {err}"))
        } else {
            SearchError::Upstream(err.to_string())
        }
    }
}

pub type SearchResult<T> = Result<T, SearchError>;

/// Lookup against an external movie database.
#[async_trait]
pub trait MovieSearch: Send + Sync {
    /// Candidates matching a free-text title, in the provider's order.
    async fn search_by_title(&self, query: &str) -> SearchResult<Vec<Candidate>>;

    async fn fetch_detail(&self, external_id: i64) -> SearchResult<MovieDetail>;
}

pub struct TmdbClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    image_base_url: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        base_url: String,
        image_base_url: String,
        rps: u32,
    ) -> Self {
        if api_key.trim().is_empty() {
            tracing::warn!("no TMDB_API_KEY provided; adding movies is disabled");
        }

        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(
            NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN),
        )));
        Self { client, api_key, base_url, image_base_url, limiter }
    }

    fn image_url(&self, path: Option<String>) -> Option<String> {
        image_url(&self.image_base_url, path.as_deref())
    }

    /// Issues a GET and decodes the JSON body. `Ok(None)` means the provider
    /// answered 404.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> SearchResult<Option<T>> {
        if self.api_key.trim().is_empty() {
            return Err(SearchError::Auth("TMDB_API_KEY is not configured".to_string()));
        }

        self.limiter.until_ready().await;

        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let resp = self
            .client
            .get(url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        match resp.status() {
            s if s.is_success() => Ok(Some(resp.json().await?)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(SearchError::Auth("API key was rejected".to_string()))
            },
            StatusCode::NOT_FOUND => Ok(None),
            s => Err(SearchError::Upstream(format!("unexpected status {s}"))),
        }
    }
}

#[async_trait]
impl MovieSearch for TmdbClient {
    async fn search_by_title(&self, query: &str) -> SearchResult<Vec<Candidate>> {
        debug!(query = %query, "searching movie database");

        let Some(resp) = self.get_json::<SearchResponse>("search/movie", &[("query", query)]).await?
        else {
            return Err(SearchError::Upstream("search endpoint not found".to_string()));
        };

        let candidates: Vec<Candidate> = resp
            .results
            .into_iter()
            .map(|m| Candidate {
                external_id: m.id,
                title: m.title,
                release_date_raw: m.release_date.unwrap_or_default(),
                poster_url: self.image_url(m.poster_path),
            })
            .collect();

        debug!(query = %query, results = candidates.len(), "search finished");
        Ok(candidates)
    }

    async fn fetch_detail(&self, external_id: i64) -> SearchResult<MovieDetail> {
        debug!(external_id = external_id, "fetching movie detail");

        let Some(m) = self.get_json::<DetailResponse>(&format!("movie/{external_id}"), &[]).await?
        else {
            return Err(SearchError::NotFound(external_id));
        };

        Ok(MovieDetail {
            external_id: m.id,
            title: m.title,
            release_date_raw: m.release_date.unwrap_or_default(),
            overview: m.overview.unwrap_or_default(),
            backdrop_url: self.image_url(m.backdrop_path),
            poster_url: self.image_url(m.poster_path),
        })
    }
}

impl TryFrom<MovieDetail> for NewMovie {
    type Error = SearchError;

    /// Uses the backdrop as artwork, falling back to the poster. A record with
    /// no release year or no artwork at all cannot be stored.
    fn try_from(detail: MovieDetail) -> Result<Self, Self::Error> {
        let Some(year) = release_year(&detail.release_date_raw) else {
            return Err(SearchError::Upstream(format!(
                "movie {} has no release date",
                detail.external_id
            )));
        };

        let Some(img_url) = detail.backdrop_url.or(detail.poster_url) else {
            return Err(SearchError::Upstream(format!(
                "movie {} has no artwork",
                detail.external_id
            )));
        };

        Ok(NewMovie { title: detail.title, year, description: detail.overview, img_url })
    }
}

/// Joins the image base URL and a provider path. Absent or blank paths give `None`.
pub fn image_url(base: &str, path: Option<&str>) -> Option<String> {
    let path = path.map(str::trim).filter(|p| !p.is_empty())?;
    Some(format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/')))
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchMovie>,
}

#[derive(Debug, Deserialize)]
struct SearchMovie {
    id: i64,
    title: String,
    release_date: Option<String>,
    poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    id: i64,
    title: String,
    release_date: Option<String>,
    overview: Option<String>,
    backdrop_path: Option<String>,
    poster_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        Json, Router,
        extract::{Path, Query},
        http::StatusCode,
        response::IntoResponse,
        routing::get,
    };
    use serde_json::json;

    use super::*;

    const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";

    async fn stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base_url: String, api_key: &str, timeout: Duration) -> TmdbClient {
        let http = reqwest::Client::builder().timeout(timeout).build().unwrap();
        TmdbClient::new(http, api_key.to_string(), base_url, IMAGE_BASE.to_string(), 50)
    }

    fn tmdb_router() -> Router {
        Router::new()
            .route(
                "/search/movie",
                get(|Query(q): Query<std::collections::HashMap<String, String>>| async move {
                    if q.get("api_key").map(String::as_str) != Some("good") {
                        return (StatusCode::UNAUTHORIZED, Json(json!({ "status_code": 7 })))
                            .into_response();
                    }
                    if q.get("query").map(String::as_str) == Some("nothing") {
                        return Json(json!({ "results": [] })).into_response();
                    }
                    Json(json!({
                        "page": 1,
                        "results": [
                            { "id": 1817, "title": "Phone Booth", "release_date": "2002-11-14", "poster_path": "/p.jpg" },
                            { "id": 99, "title": "Phone Booth 2", "release_date": "", "poster_path": null }
                        ]
                    }))
                    .into_response()
                }),
            )
            .route(
                "/movie/{id}",
                get(|Path(id): Path<i64>| async move {
                    match id {
                        1817 => Json(json!({
                            "id": 1817,
                            "title": "Phone Booth",
                            "release_date": "2002-11-14",
                            "overview": "A sniper pins a publicist in a phone booth.",
                            "backdrop_path": "/b.jpg",
                            "poster_path": "/p.jpg"
                        }))
                        .into_response(),
                        5 => Json(json!({
                            "id": 5,
                            "title": "Four Rooms",
                            "release_date": "1995-12-09",
                            "overview": null,
                            "backdrop_path": null,
                            "poster_path": null
                        }))
                        .into_response(),
                        _ => (StatusCode::NOT_FOUND, Json(json!({ "status_code": 34 })))
                            .into_response(),
                    }
                }),
            )
    }

    #[tokio::test]
    async fn search_returns_candidates_in_order() {
        let base = stub(tmdb_router()).await;
        let tmdb = client(base, "good", Duration::from_secs(5));

        let found = tmdb.search_by_title("phone booth").await.unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].external_id, 1817);
        assert_eq!(found[0].year(), Some(2002));
        assert_eq!(found[0].poster_url.as_deref(), Some("https://image.tmdb.org/t/p/w500/p.jpg"));
        assert_eq!(found[1].year(), None);
        assert_eq!(found[1].poster_url, None);
    }

    #[tokio::test]
    async fn search_without_matches_is_empty() {
        let base = stub(tmdb_router()).await;
        let tmdb = client(base, "good", Duration::from_secs(5));

        assert!(tmdb.search_by_title("nothing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn server_error_is_upstream_not_empty() {
        let base = stub(Router::new().route(
            "/search/movie",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        ))
        .await;
        let tmdb = client(base, "good", Duration::from_secs(5));

        let err = tmdb.search_by_title("phone booth").await.unwrap_err();
        assert!(matches!(err, SearchError::Upstream(_)), "{err:?}");
    }

    #[tokio::test]
    async fn invalid_json_is_upstream() {
        let base =
            stub(Router::new().route("/search/movie", get(|| async { "<html>not json</html>" })))
                .await;
        let tmdb = client(base, "good", Duration::from_secs(5));

        let err = tmdb.search_by_title("phone booth").await.unwrap_err();
        assert!(matches!(err, SearchError::Upstream(_)), "{err:?}");
    }

    #[tokio::test]
    async fn rejected_key_is_auth_error() {
        let base = stub(tmdb_router()).await;
        let tmdb = client(base, "bad", Duration::from_secs(5));

        let err = tmdb.search_by_title("phone booth").await.unwrap_err();
        assert!(matches!(err, SearchError::Auth(_)), "{err:?}");
    }

    #[tokio::test]
    async fn missing_key_fails_without_calling_out() {
        let tmdb = client("http://127.0.0.1:9".to_string(), "", Duration::from_secs(5));

        let err = tmdb.search_by_title("phone booth").await.unwrap_err();
        assert!(matches!(err, SearchError::Auth(_)), "{err:?}");
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let base = stub(Router::new().route(
            "/search/movie",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({ "results": [] }))
            }),
        ))
        .await;
        let tmdb = client(base, "good", Duration::from_millis(200));

        let err = tmdb.search_by_title("phone booth").await.unwrap_err();
        assert!(matches!(err, SearchError::Upstream(ref msg) if msg.contains("timed out")), "{err:?}");
    }

    #[tokio::test]
    async fn detail_resolves_image_urls() {
        let base = stub(tmdb_router()).await;
        let tmdb = client(base, "good", Duration::from_secs(5));

        let detail = tmdb.fetch_detail(1817).await.unwrap();

        assert_eq!(detail.title, "Phone Booth");
        assert_eq!(detail.release_date_raw, "2002-11-14");
        assert_eq!(detail.backdrop_url.as_deref(), Some("https://image.tmdb.org/t/p/w500/b.jpg"));
    }

    #[tokio::test]
    async fn detail_with_null_fields() {
        let base = stub(tmdb_router()).await;
        let tmdb = client(base, "good", Duration::from_secs(5));

        let detail = tmdb.fetch_detail(5).await.unwrap();

        assert_eq!(detail.overview, "");
        assert_eq!(detail.backdrop_url, None);
        assert_eq!(detail.poster_url, None);
    }

    #[tokio::test]
    async fn unknown_detail_is_not_found() {
        let base = stub(tmdb_router()).await;
        let tmdb = client(base, "good", Duration::from_secs(5));

        let err = tmdb.fetch_detail(424242).await.unwrap_err();
        assert!(matches!(err, SearchError::NotFound(424242)), "{err:?}");
    }

    fn detail(backdrop: Option<&str>, poster: Option<&str>, date: &str) -> MovieDetail {
        MovieDetail {
            external_id: 1817,
            title: "Phone Booth".to_string(),
            release_date_raw: date.to_string(),
            overview: "...".to_string(),
            backdrop_url: backdrop.map(str::to_string),
            poster_url: poster.map(str::to_string),
        }
    }

    #[test]
    fn detail_becomes_new_movie() {
        let detail = detail(Some("https://img/b.jpg"), Some("https://img/p.jpg"), "2002-01-15");
        let movie = NewMovie::try_from(detail).unwrap();

        assert_eq!(movie.title, "Phone Booth");
        assert_eq!(movie.year, 2002);
        assert_eq!(movie.description, "...");
        assert_eq!(movie.img_url, "https://img/b.jpg");
    }

    #[test]
    fn missing_backdrop_falls_back_to_poster() {
        let movie =
            NewMovie::try_from(detail(None, Some("https://img/p.jpg"), "2002-01-15")).unwrap();
        assert_eq!(movie.img_url, "https://img/p.jpg");
    }

    #[test]
    fn detail_without_artwork_or_year_is_rejected() {
        let err = NewMovie::try_from(detail(None, None, "2002-01-15")).unwrap_err();
        assert!(matches!(err, SearchError::Upstream(_)));

        let err = NewMovie::try_from(detail(Some("https://img/b.jpg"), None, "")).unwrap_err();
        assert!(matches!(err, SearchError::Upstream(_)));
    }

    #[test]
    fn image_url_joins_paths() {
        assert_eq!(
            image_url("https://img/t/p/w500/", Some("/x.jpg")).as_deref(),
            Some("https://img/t/p/w500/x.jpg")
        );
        assert_eq!(image_url("https://img", None), None);
        assert_eq!(image_url("https://img", Some("  ")), None);
    }
}
