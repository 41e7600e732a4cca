use actix_web::{delete, get, HttpResponse, post, put, web};
use actix_web::web::Json;

use crate::api::{Message, with_conn};
use crate::core::{CreateMovieParams, UpdateMovieParams};
use crate::core::action;
use crate::core::error::Error;
use crate::db::DbConnectionPool;

#[get("/movies")]
pub async fn get_movies(
    pool: web::Data<DbConnectionPool>,
) -> Result<HttpResponse, Error> {
    let summary = with_conn(pool, action::list_movies).await?;

    Ok(HttpResponse::Ok().json(summary))
}

#[get("/movies-view")]
pub async fn get_movies_view(
    pool: web::Data<DbConnectionPool>,
) -> Result<HttpResponse, Error> {
    let rows = with_conn(pool, action::list_view).await?;

    Ok(HttpResponse::Ok().json(rows))
}

#[get("/movies/sort/{name}")]
pub async fn get_sorted_movies(
    pool: web::Data<DbConnectionPool>,
    name: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let key = name.into_inner();
    let movies = with_conn(pool, move |conn| action::sorted_movies(conn, &key)).await?;

    Ok(HttpResponse::Ok().json(movies))
}

#[get("/movies-view/sort/{name}")]
pub async fn get_sorted_movies_view(
    pool: web::Data<DbConnectionPool>,
    name: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let key = name.into_inner();
    let rows = with_conn(pool, move |conn| action::sorted_view(conn, &key)).await?;

    Ok(HttpResponse::Ok().json(rows))
}

#[get("/movies/{genre_name}")]
pub async fn get_movies_by_genre(
    pool: web::Data<DbConnectionPool>,
    genre_name: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let genre = genre_name.into_inner();
    let movies = with_conn(pool, move |conn| action::movies_by_genre(conn, &genre)).await?;

    Ok(HttpResponse::Ok().json(movies))
}

#[get("/movies-view/{genre_name}")]
pub async fn get_movies_view_by_genre(
    pool: web::Data<DbConnectionPool>,
    genre_name: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let genre = genre_name.into_inner();
    let rows = with_conn(pool, move |conn| action::view_by_genre(conn, &genre)).await?;

    Ok(HttpResponse::Ok().json(rows))
}

#[post("/movies")]
pub async fn post_movie(
    pool: web::Data<DbConnectionPool>,
    req: Json<CreateMovieParams>,
) -> Result<HttpResponse, Error> {
    let movie = req.into_inner().create()?;
    with_conn(pool, move |conn| action::create_movie(conn, movie)).await?;

    Ok(HttpResponse::Created().finish())
}

#[put("/movies/{movie_id}")]
pub async fn put_movie(
    pool: web::Data<DbConnectionPool>,
    movie_id: web::Path<i32>,
    req: Json<UpdateMovieParams>,
) -> Result<HttpResponse, Error> {
    let id = movie_id.into_inner();
    let changes = req.into_inner().update()?;
    with_conn(pool, move |conn| action::update_movie(conn, id, changes)).await?;

    Ok(HttpResponse::Ok().finish())
}

#[delete("/movies/{movie_id}")]
pub async fn delete_movie(
    pool: web::Data<DbConnectionPool>,
    movie_id: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let id = movie_id.into_inner();
    with_conn(pool, move |conn| action::delete_movie(conn, id)).await?;

    Ok(HttpResponse::Ok().json(Message::new(format!("movie {} deleted", id))))
}
