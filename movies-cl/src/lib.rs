use chrono::NaiveDate;
use log::debug;
use reqwest::{Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ClientError::UnexpectedStatusCode;

pub struct ClientConfig {
    base: Url,
    http: reqwest::Client,
}

impl ClientConfig {
    pub fn new(url: &str) -> Result<Self, ClientError> {
        let base = Url::parse(url)
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(url.to_string()));
        }

        Ok(ClientConfig { base, http: reqwest::Client::new() })
    }

    /// Appends path segments to the base url, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub id: i32,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub genre_id: i32,
    pub language_id: i32,
    pub oscar_count: Option<i32>,
    pub release_date: Option<NaiveDate>,
    pub director: Option<String>,
    pub duration: Option<i32>,
    pub genre: Genre,
    pub language: Language,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoviesSummary {
    pub total_movies: usize,
    pub average_duration: Option<f64>,
    pub movies: Vec<Movie>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TitleLanguageGenre {
    pub id: i32,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub oscar_count: Option<i32>,
    pub language_name: String,
    pub genre_name: String,
    pub duration: Option<i32>,
    pub director: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateMovieRequest {
    pub title: String,
    pub genre_id: i32,
    pub language_id: i32,
    pub oscar_count: Option<i32>,
    pub release_date: Option<NaiveDate>,
    pub director: Option<String>,
    pub duration: Option<i32>,
}

/// Fields left as `None` are not sent; `Some(None)` clears the value.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateMovieRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oscar_count: Option<Option<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<Option<i32>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenreRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct Message {
    message: String,
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("error calling server: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("invalid server url: {0}")]
    InvalidUrl(String),
    #[error("rejected: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("unexpected status code {0}: {1}")]
    UnexpectedStatusCode(StatusCode, String),
}

impl ClientError {
    fn from_status(status: StatusCode, message: String) -> ClientError {
        match status {
            StatusCode::BAD_REQUEST => ClientError::BadRequest(message),
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            StatusCode::CONFLICT => ClientError::Conflict(message),
            unexpected => UnexpectedStatusCode(unexpected, message),
        }
    }
}

async fn expect_status(res: Response, expected: StatusCode) -> Result<Response, ClientError> {
    let status = res.status();
    if status == expected {
        return Ok(res);
    }

    let message = res.json::<Message>().await
        .map(|m| m.message)
        .unwrap_or_default();
    debug!("server answered {} instead of {}: {}", status, expected, message);

    Err(ClientError::from_status(status, message))
}

async fn get_json<T: for<'de> Deserialize<'de>>(
    cfg: &ClientConfig,
    segments: &[&str],
) -> Result<T, ClientError> {
    let res = cfg.http
        .get(cfg.endpoint(segments))
        .header("Accept", "application/json")
        .send()
        .await?;

    let res = expect_status(res, StatusCode::OK).await?;
    Ok(res.json().await?)
}

pub async fn get_movies(cfg: &ClientConfig) -> Result<MoviesSummary, ClientError> {
    get_json(cfg, &["movies"]).await
}

pub async fn get_movies_by_genre(cfg: &ClientConfig, genre_name: &str) -> Result<Vec<Movie>, ClientError> {
    get_json(cfg, &["movies", genre_name]).await
}

pub async fn get_sorted_movies(cfg: &ClientConfig, sort_by: &str) -> Result<Vec<Movie>, ClientError> {
    get_json(cfg, &["movies", "sort", sort_by]).await
}

pub async fn get_movies_view(cfg: &ClientConfig) -> Result<Vec<TitleLanguageGenre>, ClientError> {
    get_json(cfg, &["movies-view"]).await
}

pub async fn get_movies_view_by_genre(
    cfg: &ClientConfig,
    genre_name: &str,
) -> Result<Vec<TitleLanguageGenre>, ClientError> {
    get_json(cfg, &["movies-view", genre_name]).await
}

pub async fn get_sorted_movies_view(
    cfg: &ClientConfig,
    sort_by: &str,
) -> Result<Vec<TitleLanguageGenre>, ClientError> {
    get_json(cfg, &["movies-view", "sort", sort_by]).await
}

pub async fn create_movie(
    cfg: &ClientConfig,
    req: &CreateMovieRequest,
) -> Result<(), ClientError> {
    let res = cfg.http
        .post(cfg.endpoint(&["movies"]))
        .json(req)
        .send()
        .await?;

    expect_status(res, StatusCode::CREATED).await?;
    Ok(())
}

pub async fn update_movie(
    cfg: &ClientConfig,
    id: i32,
    req: &UpdateMovieRequest,
) -> Result<(), ClientError> {
    let res = cfg.http
        .put(cfg.endpoint(&["movies", &id.to_string()]))
        .json(req)
        .send()
        .await?;

    expect_status(res, StatusCode::OK).await?;
    Ok(())
}

pub async fn delete_movie(cfg: &ClientConfig, id: i32) -> Result<(), ClientError> {
    let res = cfg.http
        .delete(cfg.endpoint(&["movies", &id.to_string()]))
        .send()
        .await?;

    expect_status(res, StatusCode::OK).await?;
    Ok(())
}

pub async fn get_genres(cfg: &ClientConfig) -> Result<Vec<Genre>, ClientError> {
    get_json(cfg, &["genres"]).await
}

pub async fn create_genre(cfg: &ClientConfig, req: &GenreRequest) -> Result<Genre, ClientError> {
    let res = cfg.http
        .post(cfg.endpoint(&["genres"]))
        .json(req)
        .header("Accept", "application/json")
        .send()
        .await?;

    let res = expect_status(res, StatusCode::CREATED).await?;
    Ok(res.json().await?)
}

pub async fn rename_genre(
    cfg: &ClientConfig,
    id: i32,
    req: &GenreRequest,
) -> Result<Genre, ClientError> {
    let res = cfg.http
        .put(cfg.endpoint(&["genres", &id.to_string()]))
        .json(req)
        .header("Accept", "application/json")
        .send()
        .await?;

    let res = expect_status(res, StatusCode::OK).await?;
    Ok(res.json().await?)
}

pub async fn delete_genre(cfg: &ClientConfig, id: i32) -> Result<(), ClientError> {
    let res = cfg.http
        .delete(cfg.endpoint(&["genres", &id.to_string()]))
        .send()
        .await?;

    expect_status(res, StatusCode::OK).await?;
    Ok(())
}

pub async fn get_languages(cfg: &ClientConfig) -> Result<Vec<Language>, ClientError> {
    get_json(cfg, &["languages"]).await
}
