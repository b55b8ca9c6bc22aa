//! TMDB catalog client: genre dictionary, popular/trending feed, and search.

use anyhow::{Context, Result};
use futures::future::try_join;
use image::DynamicImage;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::constants::constants;
use crate::genres::{self, GenreMap};
use crate::movie::{Movie, merge_by_id};

// --- Wire shapes ---
//
// Responses are loosely typed; only the fields consumed here are declared,
// everything else in the body is ignored.

#[derive(Debug, Deserialize)]
struct GenreListResponse {
  genres: Vec<GenreRecord>,
}

#[derive(Debug, Deserialize)]
struct GenreRecord {
  id: u32,
  name: String,
}

#[derive(Debug, Deserialize)]
struct PageResponse {
  #[serde(default)]
  results: Vec<TitleRecord>,
}

#[derive(Debug, Deserialize)]
struct TitleRecord {
  id: u64,
  /// Movie endpoints use `title`; the trending feed can surface entries
  /// that carry `name` instead.
  title: Option<String>,
  name: Option<String>,
  poster_path: Option<String>,
  #[serde(default)]
  genre_ids: Vec<u32>,
}

/// Map a wire record to a Movie, resolving genre ids to display names.
/// Records without a usable title are dropped.
fn movie_from_record(record: TitleRecord, dictionary: &GenreMap) -> Option<Movie> {
  let title = record.title.or(record.name).filter(|t| !t.is_empty())?;
  let poster_url = match record.poster_path {
    Some(ref path) if !path.is_empty() => format!("{}{}", constants().image_base_url, path),
    _ => String::new(),
  };
  Some(Movie { id: record.id, title, poster_url, genres: genres::resolve(&record.genre_ids, dictionary) })
}

/// Catalog API client. Cheap to clone — the underlying reqwest client is
/// reference-counted — so spawned fetch tasks take their own copy.
#[derive(Clone)]
pub struct CatalogClient {
  http: Client,
  base_url: String,
  api_key: String,
  language: String,
}

impl CatalogClient {
  pub fn new(api_key: String, language: String) -> Self {
    Self { http: Client::new(), base_url: constants().api_base_url.clone(), api_key, language }
  }

  async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str, extra: &[(&str, &str)]) -> Result<T> {
    let url = format!("{}{}", self.base_url, path);
    let mut query: Vec<(&str, &str)> = vec![("api_key", self.api_key.as_str()), ("language", self.language.as_str())];
    query.extend_from_slice(extra);

    let response =
      self.http.get(&url).query(&query).send().await.with_context(|| format!("Request to {} failed", path))?;
    let response = response.error_for_status().with_context(|| format!("Catalog API rejected {}", path))?;
    response.json().await.with_context(|| format!("Failed to decode {} response", path))
  }

  /// Fetch the genre dictionary. Called once per session.
  pub async fn fetch_genres(&self) -> Result<GenreMap> {
    let list: GenreListResponse = self.get_json("/genre/movie/list", &[]).await?;
    debug!(count = list.genres.len(), "fetched genre dictionary");
    Ok(list.genres.into_iter().map(|g| (g.id, g.name)).collect())
  }

  /// Fetch the popular and trending feeds concurrently and merge them by id,
  /// first occurrence winning.
  pub async fn fetch_popular_and_trending(&self, dictionary: &GenreMap) -> Result<Vec<Movie>> {
    let popular = self.get_json::<PageResponse>("/movie/popular", &[("page", "1")]);
    let trending = self.get_json::<PageResponse>("/trending/movie/week", &[]);
    let (popular, trending) = try_join(popular, trending).await?;

    let popular: Vec<Movie> = popular.results.into_iter().filter_map(|r| movie_from_record(r, dictionary)).collect();
    let trending: Vec<Movie> = trending.results.into_iter().filter_map(|r| movie_from_record(r, dictionary)).collect();
    let merged = merge_by_id(&popular, &trending);
    debug!(count = merged.len(), "fetched catalog feed");
    Ok(merged)
  }

  /// Search the catalog by free text. The query is sent as a URL-escaped
  /// parameter; callers reject empty queries before any request is issued.
  pub async fn search(&self, query: &str, dictionary: &GenreMap) -> Result<Vec<Movie>> {
    let page = constants().search_page.to_string();
    let response: PageResponse = self
      .get_json("/search/movie", &[("query", query), ("page", page.as_str()), ("include_adult", "false")])
      .await?;
    Ok(response.results.into_iter().filter_map(|r| movie_from_record(r, dictionary)).collect())
  }

  /// Fetch and decode a poster image for in-terminal rendering.
  pub async fn fetch_poster(&self, url: &str) -> Result<DynamicImage> {
    let response = self.http.get(url).send().await.with_context(|| format!("Failed to fetch poster {}", url))?;
    let response = response.error_for_status().with_context(|| format!("Poster request rejected for {}", url))?;
    let bytes = response.bytes().await.with_context(|| format!("Failed to read poster bytes from {}", url))?;
    image::load_from_memory(&bytes).with_context(|| format!("Failed to decode poster from {}", url))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn dictionary() -> GenreMap {
    GenreMap::from([(28, "Action".to_string()), (18, "Drama".to_string())])
  }

  #[test]
  fn page_response_consumes_only_the_declared_fields() {
    let json = r#"{
      "page": 1,
      "results": [
        {"id": 603, "title": "The Matrix", "poster_path": "/abc.jpg", "genre_ids": [28, 878],
         "vote_average": 8.2, "overview": "ignored", "adult": false}
      ],
      "total_pages": 42
    }"#;
    let page: PageResponse = serde_json::from_str(json).expect("decode");
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].id, 603);
  }

  #[test]
  fn missing_results_array_decodes_as_empty() {
    let page: PageResponse = serde_json::from_str("{}").expect("decode");
    assert!(page.results.is_empty());
  }

  #[test]
  fn genre_list_decodes_to_a_map() {
    let json = r#"{"genres": [{"id": 28, "name": "Action"}, {"id": 18, "name": "Drama"}]}"#;
    let list: GenreListResponse = serde_json::from_str(json).expect("decode");
    let map: GenreMap = list.genres.into_iter().map(|g| (g.id, g.name)).collect();
    assert_eq!(map.get(&28).map(String::as_str), Some("Action"));
    assert_eq!(map.get(&18).map(String::as_str), Some("Drama"));
  }

  #[test]
  fn record_maps_to_movie_with_poster_url_and_resolved_genres() {
    let record = TitleRecord {
      id: 603,
      title: Some("The Matrix".to_string()),
      name: None,
      poster_path: Some("/abc.jpg".to_string()),
      genre_ids: vec![28, 999],
    };
    let movie = movie_from_record(record, &dictionary()).expect("movie");
    assert_eq!(movie.poster_url, format!("{}/abc.jpg", constants().image_base_url));
    assert_eq!(movie.genres, vec!["Action".to_string(), constants().genre_fallback.clone()]);
  }

  #[test]
  fn record_without_poster_gets_an_empty_url() {
    let record = TitleRecord { id: 1, title: Some("Heat".to_string()), name: None, poster_path: None, genre_ids: vec![] };
    let movie = movie_from_record(record, &dictionary()).expect("movie");
    assert_eq!(movie.poster_url, "");
    assert!(movie.genres.is_empty());
  }

  #[test]
  fn record_falls_back_to_the_name_field() {
    let record =
      TitleRecord { id: 7, title: None, name: Some("Dark".to_string()), poster_path: None, genre_ids: vec![18] };
    let movie = movie_from_record(record, &dictionary()).expect("movie");
    assert_eq!(movie.title, "Dark");
  }

  #[test]
  fn record_without_any_title_is_dropped() {
    let record = TitleRecord { id: 9, title: None, name: None, poster_path: None, genre_ids: vec![] };
    assert!(movie_from_record(record, &dictionary()).is_none());
  }
}
