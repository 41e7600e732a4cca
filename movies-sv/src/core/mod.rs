use chrono::NaiveDate;
use diesel::{AsChangeset, Insertable, Queryable, QueryableByName};
use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::db::schema::{genres, movies, title_language_genre};

pub mod action;
pub mod error;
pub mod fields;

#[derive(Clone, Serialize, Queryable, PartialEq, Debug)]
pub struct Language {
    pub id: i32,
    pub name: String,
}

#[derive(Clone, Serialize, Queryable, PartialEq, Debug)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

#[derive(Clone, Debug, Insertable)]
#[table_name="genres"]
pub struct NewGenre {
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Queryable)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub genre_id: i32,
    pub language_id: i32,
    pub oscar_count: Option<i32>,
    pub release_date: Option<NaiveDate>,
    pub director: Option<String>,
    pub duration: Option<i32>,
}

#[derive(Clone, Debug, Insertable)]
#[table_name="movies"]
pub struct NewMovie {
    pub title: String,
    pub genre_id: i32,
    pub language_id: i32,
    pub oscar_count: Option<i32>,
    pub release_date: Option<NaiveDate>,
    pub director: Option<String>,
    pub duration: Option<i32>,
}

#[derive(Clone, Debug, AsChangeset)]
#[table_name="movies"]
pub struct MovieChangeset {
    pub title: Option<String>,
    pub genre_id: Option<i32>,
    pub language_id: Option<i32>,
    pub oscar_count: Option<Option<i32>>,
    pub release_date: Option<Option<NaiveDate>>,
    pub director: Option<Option<String>>,
    pub duration: Option<Option<i32>>,
}

impl MovieChangeset {
    /// diesel refuses to build an UPDATE without any SET clause.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.genre_id.is_none()
            && self.language_id.is_none()
            && self.oscar_count.is_none()
            && self.release_date.is_none()
            && self.director.is_none()
            && self.duration.is_none()
    }
}

/// A movie with its genre and language expanded.
#[derive(Clone, Debug, Serialize)]
pub struct MovieDetails {
    #[serde(flatten)]
    pub movie: Movie,
    pub genre: Genre,
    pub language: Language,
}

impl From<(Movie, Genre, Language)> for MovieDetails {
    fn from((movie, genre, language): (Movie, Genre, Language)) -> Self {
        MovieDetails { movie, genre, language }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct MoviesSummary {
    pub total_movies: usize,
    pub average_duration: Option<f64>,
    pub movies: Vec<MovieDetails>,
}

impl MoviesSummary {
    pub fn from_movies(movies: Vec<MovieDetails>) -> MoviesSummary {
        let durations: Vec<i32> = movies.iter()
            .filter_map(|m| m.movie.duration)
            .collect();

        let average_duration = if durations.is_empty() {
            None
        } else {
            let total: i64 = durations.iter().map(|d| i64::from(*d)).sum();
            Some(total as f64 / durations.len() as f64)
        };

        MoviesSummary {
            total_movies: movies.len(),
            average_duration,
            movies,
        }
    }
}

/// A row of the `title_language_genre` reporting view.
#[derive(Clone, Debug, Serialize, QueryableByName)]
#[table_name="title_language_genre"]
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

/// Columns a listing may be sorted by. Anything outside this set keeps the
/// default id ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortKey {
    Title,
    Director,
    ReleaseDate,
}

impl SortKey {
    pub fn parse(raw: &str) -> Option<SortKey> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "title" => Some(SortKey::Title),
            "director" => Some(SortKey::Director),
            "release_date" => Some(SortKey::ReleaseDate),
            _ => None,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            SortKey::Title => "title",
            SortKey::Director => "director",
            SortKey::ReleaseDate => "release_date",
        }
    }
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String, Error> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(Error::MissingField(field))
}

fn non_negative(value: Option<i32>, field: &str) -> Result<Option<i32>, Error> {
    match value {
        Some(v) if v < 0 => Err(Error::Invalid(format!("{} must not be negative", field))),
        other => Ok(other),
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreateMovieParams {
    pub title: Option<String>,
    pub genre_id: i32,
    pub language_id: i32,
    pub oscar_count: Option<i32>,
    #[serde(default, deserialize_with = "fields::date")]
    pub release_date: Option<NaiveDate>,
    pub director: Option<String>,
    pub duration: Option<i32>,
}

impl CreateMovieParams {
    pub fn create(self) -> Result<NewMovie, Error> {
        Ok(NewMovie {
            title: required_text(self.title, "title")?,
            genre_id: self.genre_id,
            language_id: self.language_id,
            oscar_count: non_negative(self.oscar_count, "oscar_count")?,
            release_date: self.release_date,
            director: self.director.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()),
            duration: non_negative(self.duration, "duration")?,
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateMovieParams {
    pub title: Option<String>,
    pub genre_id: Option<i32>,
    pub language_id: Option<i32>,
    #[serde(default, deserialize_with = "fields::patch")]
    pub oscar_count: Option<Option<i32>>,
    #[serde(default, deserialize_with = "fields::patch_date")]
    pub release_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "fields::patch")]
    pub director: Option<Option<String>>,
    #[serde(default, deserialize_with = "fields::patch")]
    pub duration: Option<Option<i32>>,
}

impl UpdateMovieParams {
    pub fn update(self) -> Result<MovieChangeset, Error> {
        let title = match self.title {
            Some(t) => Some(required_text(Some(t), "title")?),
            None => None,
        };

        Ok(MovieChangeset {
            title,
            genre_id: self.genre_id,
            language_id: self.language_id,
            oscar_count: self.oscar_count
                .map(|c| non_negative(c, "oscar_count"))
                .transpose()?,
            release_date: self.release_date,
            director: self.director,
            duration: self.duration
                .map(|d| non_negative(d, "duration"))
                .transpose()?,
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct GenreParams {
    pub name: Option<String>,
}

impl GenreParams {
    pub fn name(self) -> Result<String, Error> {
        required_text(self.name, "name")
    }
}
