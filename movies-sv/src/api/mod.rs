use actix_web::{get, HttpResponse, Responder, ResponseError, web};
use actix_web::http::StatusCode;
use log::error;
use serde::Serialize;

use crate::core::action;
use crate::core::error::Error;
use crate::db::{DbConnection, DbConnectionPool};

pub mod genres;
pub mod movies;


#[derive(Debug, Serialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Message { message: message.into() }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingField(_) | Error::Invalid(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = if self.is_client_error() {
            self.to_string()
        } else {
            error!("{}", self);
            "internal server error".to_string()
        };

        HttpResponse::build(self.status_code()).json(Message { message })
    }
}

/// Runs `f` on a pooled connection off the async workers.
pub async fn with_conn<F, T>(pool: web::Data<DbConnectionPool>, f: F) -> Result<T, Error>
    where
        F: FnOnce(&DbConnection) -> Result<T, Error> + Send + 'static,
        T: Send + 'static,
{
    web::block(move || {
        let conn: DbConnection = pool.get()?;
        f(&conn)
    })
        .await
        .map_err(Error::from)
}

/// Body deserialization failures answer with the same JSON shape as every other error.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| Error::Invalid(err.to_string()).into())
}

/// Path segments that don't parse as ids are rejected like bad bodies.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| Error::Invalid(err.to_string()).into())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .service(home)
        .service(movies::get_movies)
        .service(movies::get_movies_view)
        .service(movies::get_sorted_movies)
        .service(movies::get_sorted_movies_view)
        .service(movies::get_movies_by_genre)
        .service(movies::get_movies_view_by_genre)
        .service(movies::post_movie)
        .service(movies::put_movie)
        .service(movies::delete_movie)
        .service(genres::get_genres)
        .service(genres::post_genre)
        .service(genres::put_genre)
        .service(genres::delete_genre)
        .service(get_languages);
}

#[get("/")]
pub async fn home() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Home Page")
}

#[get("/languages")]
pub async fn get_languages(
    pool: web::Data<DbConnectionPool>,
) -> Result<HttpResponse, Error> {
    let languages = with_conn(pool, action::list_languages).await?;

    Ok(HttpResponse::Ok().json(languages))
}
