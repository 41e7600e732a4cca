use std::time::Duration;

use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::sql_types::Text;
use log::debug;
use r2d2::Pool;

use crate::core::{Genre, Language, Movie, MovieChangeset, MovieDetails, NewGenre, NewMovie, SortKey, TitleLanguageGenre};
use crate::core::error::Error;
use crate::core::error::Error::DBQueryError;

pub mod schema;

pub type DbConnection = PooledConnection<ConnectionManager<PgConnection>>;
pub type DbConnectionPool = Pool<ConnectionManager<PgConnection>>;

embed_migrations!("migrations");

sql_function!(fn lower(x: Text) -> Text);

const VIEW_COLUMNS: &str =
    "id, title, release_date, oscar_count, language_name, genre_name, duration, director";

pub fn build_pool(database_url: &str, max_size: u32) -> Result<DbConnectionPool, Error> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .max_size(max_size)
        .connection_timeout(Duration::from_secs(5))
        .build(manager)
        .map_err(Error::PoolError)
}

pub fn run_migrations(conn: &PgConnection) -> Result<(), Error> {
    embedded_migrations::run(conn)?;
    Ok(())
}

pub fn find_movies(conn: &DbConnection, sort: Option<SortKey>) -> Result<Vec<MovieDetails>, Error> {
    use schema::{genres, languages, movies};

    let query = movies::table
        .inner_join(genres::table)
        .inner_join(languages::table)
        .into_boxed();

    let query = match sort {
        Some(SortKey::Title) =>
            query.order((movies::title.asc(), movies::id.asc())),
        Some(SortKey::Director) =>
            query.order((movies::director.asc().nulls_last(), movies::id.asc())),
        Some(SortKey::ReleaseDate) =>
            query.order((movies::release_date.asc().nulls_last(), movies::id.asc())),
        None =>
            query.order(movies::id.asc()),
    };

    debug!("{}", diesel::debug_query::<Pg, _>(&query));

    let rows = query.load::<(Movie, Genre, Language)>(conn)?;

    Ok(rows.into_iter().map(MovieDetails::from).collect())
}

pub fn find_movies_by_genre(conn: &DbConnection, genre_name: &str) -> Result<Vec<MovieDetails>, Error> {
    use schema::{genres, languages, movies};

    let query = movies::table
        .inner_join(genres::table)
        .inner_join(languages::table)
        .filter(lower(genres::name).eq(lower(genre_name)))
        .order(movies::id.asc());

    debug!("{}", diesel::debug_query::<Pg, _>(&query));

    let rows = query.load::<(Movie, Genre, Language)>(conn)?;

    Ok(rows.into_iter().map(MovieDetails::from).collect())
}

/// Id of a movie whose title equals `movie_title` ignoring case, other than `excluding`.
pub fn find_movie_id_by_title(
    conn: &DbConnection,
    movie_title: &str,
    excluding: Option<i32>,
) -> Result<Option<i32>, Error> {
    use schema::movies::dsl::*;

    let mut query = movies
        .select(id)
        .filter(lower(title).eq(lower(movie_title)))
        .into_boxed();

    if let Some(own_id) = excluding {
        query = query.filter(id.ne(own_id));
    }

    query
        .first::<i32>(conn)
        .optional()
        .map_err(DBQueryError)
}

pub fn movie_exists(conn: &DbConnection, movie_id: i32) -> Result<bool, Error> {
    use schema::movies::dsl::*;

    diesel::select(diesel::dsl::exists(movies.filter(id.eq(movie_id))))
        .get_result(conn)
        .map_err(DBQueryError)
}

pub fn create_movie(conn: &DbConnection, movie: &NewMovie) -> Result<Movie, Error> {
    use schema::movies;

    let query = diesel::insert_into(movies::table)
        .values(movie);

    debug!("{}", diesel::debug_query::<Pg, _>(&query));

    query
        .get_result(conn)
        .map_err(DBQueryError)
}

pub fn update_movie(conn: &DbConnection, movie_id: i32, movie: &MovieChangeset) -> Result<Option<Movie>, Error> {
    use schema::movies;
    use schema::movies::dsl::*;

    let query = diesel::update(movies::table)
        .set(movie)
        .filter(id.eq(movie_id));

    debug!("{}", diesel::debug_query::<Pg, _>(&query));

    query
        .get_result(conn)
        .optional()
        .map_err(DBQueryError)
}

pub fn delete_movie(conn: &DbConnection, movie_id: i32) -> Result<bool, Error> {
    use schema::movies;
    use schema::movies::dsl::*;

    let query = diesel::delete(movies::table)
        .filter(id.eq(movie_id));

    debug!("{}", diesel::debug_query::<Pg, _>(&query));

    query
        .execute(conn)
        .map_err(DBQueryError)
        .map(|r| r > 0)
}

pub fn find_genres(conn: &DbConnection) -> Result<Vec<Genre>, Error> {
    use schema::genres::dsl::*;

    genres
        .order(id.asc())
        .load(conn)
        .map_err(DBQueryError)
}

pub fn find_one_genre(conn: &DbConnection, genre_id: i32) -> Result<Option<Genre>, Error> {
    use schema::genres::dsl::*;

    genres.filter(id.eq(genre_id))
        .first(conn)
        .optional()
        .map_err(DBQueryError)
}

/// Id of a genre whose name equals `genre_name` ignoring case, other than `excluding`.
pub fn find_genre_id_by_name(
    conn: &DbConnection,
    genre_name: &str,
    excluding: Option<i32>,
) -> Result<Option<i32>, Error> {
    use schema::genres::dsl::*;

    let mut query = genres
        .select(id)
        .filter(lower(name).eq(lower(genre_name)))
        .into_boxed();

    if let Some(own_id) = excluding {
        query = query.filter(id.ne(own_id));
    }

    query
        .first::<i32>(conn)
        .optional()
        .map_err(DBQueryError)
}

pub fn create_genre(conn: &DbConnection, genre: &NewGenre) -> Result<Genre, Error> {
    use schema::genres;

    let query = diesel::insert_into(genres::table)
        .values(genre);

    debug!("{}", diesel::debug_query::<Pg, _>(&query));

    query
        .get_result(conn)
        .map_err(DBQueryError)
}

pub fn rename_genre(conn: &DbConnection, genre_id: i32, new_name: &str) -> Result<Option<Genre>, Error> {
    use schema::genres;
    use schema::genres::dsl::*;

    let query = diesel::update(genres::table)
        .set(name.eq(new_name))
        .filter(id.eq(genre_id));

    debug!("{}", diesel::debug_query::<Pg, _>(&query));

    query
        .get_result(conn)
        .optional()
        .map_err(DBQueryError)
}

pub fn delete_genre(conn: &DbConnection, genre_id: i32) -> Result<bool, Error> {
    use schema::genres;
    use schema::genres::dsl::*;

    let query = diesel::delete(genres::table)
        .filter(id.eq(genre_id));

    debug!("{}", diesel::debug_query::<Pg, _>(&query));

    query
        .execute(conn)
        .map_err(DBQueryError)
        .map(|r| r > 0)
}

pub fn find_languages(conn: &DbConnection) -> Result<Vec<Language>, Error> {
    use schema::languages::dsl::*;

    languages
        .order(id.asc())
        .load(conn)
        .map_err(DBQueryError)
}

/// SQL for listing the reporting view. The ORDER BY column only ever comes
/// from [`SortKey::column`].
fn view_query(sort: Option<SortKey>) -> String {
    let order = match sort {
        Some(key) => format!("{} ASC NULLS LAST, id ASC", key.column()),
        None => "id ASC".to_string(),
    };

    format!("SELECT {} FROM title_language_genre ORDER BY {}", VIEW_COLUMNS, order)
}

/// Escapes LIKE wildcards so a caller's text only ever matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub fn find_view_rows(conn: &DbConnection, sort: Option<SortKey>) -> Result<Vec<TitleLanguageGenre>, Error> {
    let sql = view_query(sort);

    debug!("{}", sql);

    diesel::sql_query(sql)
        .load(conn)
        .map_err(DBQueryError)
}

pub fn find_view_rows_by_genre(conn: &DbConnection, genre_name: &str) -> Result<Vec<TitleLanguageGenre>, Error> {
    let query = diesel::sql_query(format!(
        "SELECT {} FROM title_language_genre WHERE genre_name ILIKE $1 ORDER BY id ASC",
        VIEW_COLUMNS,
    ))
        .bind::<Text, _>(escape_like(genre_name));

    debug!("{}", diesel::debug_query::<Pg, _>(&query));

    query
        .load(conn)
        .map_err(DBQueryError)
}
