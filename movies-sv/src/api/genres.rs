use actix_web::{delete, get, HttpResponse, post, put, web};
use actix_web::web::Json;

use crate::api::{Message, with_conn};
use crate::core::{GenreParams, NewGenre};
use crate::core::action;
use crate::core::error::Error;
use crate::db::DbConnectionPool;

#[get("/genres")]
pub async fn get_genres(
    pool: web::Data<DbConnectionPool>,
) -> Result<HttpResponse, Error> {
    let genres = with_conn(pool, action::list_genres).await?;

    Ok(HttpResponse::Ok().json(genres))
}

#[post("/genres")]
pub async fn post_genre(
    pool: web::Data<DbConnectionPool>,
    req: Json<GenreParams>,
) -> Result<HttpResponse, Error> {
    let genre = NewGenre { name: req.into_inner().name()? };
    let created = with_conn(pool, move |conn| action::create_genre(conn, genre)).await?;

    Ok(HttpResponse::Created().json(created))
}

#[put("/genres/{genre_id}")]
pub async fn put_genre(
    pool: web::Data<DbConnectionPool>,
    genre_id: web::Path<i32>,
    req: Json<GenreParams>,
) -> Result<HttpResponse, Error> {
    let id = genre_id.into_inner();
    let name = req.into_inner().name()?;
    let renamed = with_conn(pool, move |conn| action::rename_genre(conn, id, name)).await?;

    Ok(HttpResponse::Ok().json(renamed))
}

#[delete("/genres/{genre_id}")]
pub async fn delete_genre(
    pool: web::Data<DbConnectionPool>,
    genre_id: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let id = genre_id.into_inner();
    with_conn(pool, move |conn| action::delete_genre(conn, id)).await?;

    Ok(HttpResponse::Ok().json(Message::new(format!("genre {} deleted", id))))
}
