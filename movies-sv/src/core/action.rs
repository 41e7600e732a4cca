use diesel::Connection;
use diesel::result::DatabaseErrorKind;
use diesel::result::Error::DatabaseError;
use log::{debug, info};

use crate::core::{Genre, Language, MovieChangeset, MovieDetails, MoviesSummary, NewGenre, NewMovie, SortKey, TitleLanguageGenre};
use crate::core::error::Error;
use crate::db;
use crate::db::DbConnection;

/// Turns constraint violations raised by a write into the matching client error.
pub(crate) fn constraint_violation(
    err: Error,
    unique: impl FnOnce() -> Error,
    foreign_key: impl FnOnce() -> Error,
) -> Error {
    match err {
        Error::DBQueryError(DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => unique(),
        other => foreign_key_violation(other, foreign_key),
    }
}

/// Deletes can only trip foreign keys.
fn foreign_key_violation(err: Error, foreign_key: impl FnOnce() -> Error) -> Error {
    match err {
        Error::DBQueryError(DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => foreign_key(),
        other => other,
    }
}

fn unknown_references() -> Error {
    Error::Invalid("genre_id and language_id must reference existing records".to_string())
}

fn sort_key(raw: &str) -> Option<SortKey> {
    let key = SortKey::parse(raw);
    if key.is_none() {
        debug!("unrecognized sort key {:?}, keeping default order", raw);
    }
    key
}

pub fn list_movies(conn: &DbConnection) -> Result<MoviesSummary, Error> {
    info!("finding movies");
    db::find_movies(conn, None).map(MoviesSummary::from_movies)
}

pub fn sorted_movies(conn: &DbConnection, raw_key: &str) -> Result<Vec<MovieDetails>, Error> {
    info!("finding movies sorted by {:?}", raw_key);
    db::find_movies(conn, sort_key(raw_key))
}

pub fn movies_by_genre(conn: &DbConnection, genre_name: &str) -> Result<Vec<MovieDetails>, Error> {
    info!("finding movies genre={:?}", genre_name);
    let found = db::find_movies_by_genre(conn, genre_name)?;
    if found.is_empty() {
        return Err(Error::NotFound(format!("movies for genre {:?}", genre_name)));
    }
    Ok(found)
}

pub fn create_movie(conn: &DbConnection, movie: NewMovie) -> Result<(), Error> {
    info!("creating movie {:?}", movie);

    let created = conn.transaction::<_, Error, _>(|| {
        if db::find_movie_id_by_title(conn, &movie.title, None)?.is_some() {
            return Err(Error::Conflict(format!("movie titled {:?} already exists", movie.title)));
        }
        db::create_movie(conn, &movie)
    }).map_err(|e| constraint_violation(
        e,
        || Error::Conflict(format!("movie titled {:?} already exists", movie.title)),
        unknown_references,
    ))?;

    info!("created movie id={}", created.id);
    Ok(())
}

pub fn update_movie(conn: &DbConnection, id: i32, changes: MovieChangeset) -> Result<(), Error> {
    info!("updating movie id={} {:?}", id, changes);

    conn.transaction::<_, Error, _>(|| {
        if !db::movie_exists(conn, id)? {
            return Err(Error::NotFound(format!("movie id={}", id)));
        }
        if let Some(title) = &changes.title {
            if db::find_movie_id_by_title(conn, title, Some(id))?.is_some() {
                return Err(Error::Conflict(format!("movie titled {:?} already exists", title)));
            }
        }
        if changes.is_empty() {
            debug!("nothing to update for movie id={}", id);
            return Ok(());
        }
        db::update_movie(conn, id, &changes)?
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("movie id={}", id)))
    }).map_err(|e| constraint_violation(
        e,
        || Error::Conflict("movie title already exists".to_string()),
        unknown_references,
    ))
}

pub fn delete_movie(conn: &DbConnection, id: i32) -> Result<(), Error> {
    debug!("deleting movie id={}", id);
    if !db::delete_movie(conn, id)? {
        return Err(Error::NotFound(format!("movie id={}", id)));
    }

    info!("deleted movie id={}", id);
    Ok(())
}

pub fn list_view(conn: &DbConnection) -> Result<Vec<TitleLanguageGenre>, Error> {
    info!("finding movies view rows");
    db::find_view_rows(conn, None)
}

pub fn sorted_view(conn: &DbConnection, raw_key: &str) -> Result<Vec<TitleLanguageGenre>, Error> {
    info!("finding movies view rows sorted by {:?}", raw_key);
    db::find_view_rows(conn, sort_key(raw_key))
}

pub fn view_by_genre(conn: &DbConnection, genre_name: &str) -> Result<Vec<TitleLanguageGenre>, Error> {
    info!("finding movies view rows genre={:?}", genre_name);
    let found = db::find_view_rows_by_genre(conn, genre_name)?;
    if found.is_empty() {
        return Err(Error::NotFound(format!("movies for genre {:?}", genre_name)));
    }
    Ok(found)
}

pub fn list_genres(conn: &DbConnection) -> Result<Vec<Genre>, Error> {
    info!("finding genres");
    db::find_genres(conn)
}

pub fn create_genre(conn: &DbConnection, genre: NewGenre) -> Result<Genre, Error> {
    info!("creating genre {:?}", genre);

    let created = conn.transaction::<_, Error, _>(|| {
        if db::find_genre_id_by_name(conn, &genre.name, None)?.is_some() {
            return Err(Error::Conflict(format!("genre {:?} already exists", genre.name)));
        }
        db::create_genre(conn, &genre)
    }).map_err(|e| constraint_violation(
        e,
        || Error::Conflict(format!("genre {:?} already exists", genre.name)),
        || Error::Invalid("genre could not be created".to_string()),
    ))?;

    info!("created genre id={}", created.id);
    Ok(created)
}

pub fn rename_genre(conn: &DbConnection, id: i32, name: String) -> Result<Genre, Error> {
    info!("renaming genre id={} to {:?}", id, name);

    conn.transaction::<_, Error, _>(|| {
        if db::find_one_genre(conn, id)?.is_none() {
            return Err(Error::NotFound(format!("genre id={}", id)));
        }
        if db::find_genre_id_by_name(conn, &name, Some(id))?.is_some() {
            return Err(Error::Conflict(format!("genre {:?} already exists", name)));
        }
        db::rename_genre(conn, id, &name)?
            .ok_or_else(|| Error::NotFound(format!("genre id={}", id)))
    }).map_err(|e| constraint_violation(
        e,
        || Error::Conflict(format!("genre {:?} already exists", name)),
        || Error::Invalid("genre could not be renamed".to_string()),
    ))
}

pub fn delete_genre(conn: &DbConnection, id: i32) -> Result<(), Error> {
    debug!("deleting genre id={}", id);

    let deleted = conn.transaction::<_, Error, _>(|| db::delete_genre(conn, id))
        .map_err(|e| foreign_key_violation(
            e,
            || Error::Conflict(format!("genre id={} is still used by movies", id)),
        ))?;

    if !deleted {
        return Err(Error::NotFound(format!("genre id={}", id)));
    }

    info!("deleted genre id={}", id);
    Ok(())
}

pub fn list_languages(conn: &DbConnection) -> Result<Vec<Language>, Error> {
    info!("finding languages");
    db::find_languages(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database_error(kind: DatabaseErrorKind) -> Error {
        Error::DBQueryError(DatabaseError(kind, Box::new("violation".to_string())))
    }

    #[test]
    fn unique_violations_become_conflicts() {
        let err = constraint_violation(
            database_error(DatabaseErrorKind::UniqueViolation),
            || Error::Conflict("dup".to_string()),
            unknown_references,
        );
        assert!(matches!(err, Error::Conflict(m) if m == "dup"));
    }

    #[test]
    fn foreign_key_violations_use_the_given_error() {
        let err = constraint_violation(
            database_error(DatabaseErrorKind::ForeignKeyViolation),
            || Error::Conflict("dup".to_string()),
            unknown_references,
        );
        assert!(matches!(err, Error::Invalid(_)));
    }

    #[test]
    fn deletes_only_map_foreign_keys() {
        let err = foreign_key_violation(
            database_error(DatabaseErrorKind::ForeignKeyViolation),
            || Error::Conflict("in use".to_string()),
        );
        assert!(matches!(err, Error::Conflict(m) if m == "in use"));

        let err = foreign_key_violation(
            database_error(DatabaseErrorKind::UniqueViolation),
            || Error::Conflict("in use".to_string()),
        );
        assert!(matches!(err, Error::DBQueryError(DatabaseError(DatabaseErrorKind::UniqueViolation, _))));
    }

    #[test]
    fn other_errors_pass_through() {
        let err = constraint_violation(
            Error::DBQueryError(diesel::result::Error::NotFound),
            || Error::Conflict("dup".to_string()),
            unknown_references,
        );
        assert!(matches!(err, Error::DBQueryError(diesel::result::Error::NotFound)));

        let err = constraint_violation(
            Error::NotFound("movie id=1".to_string()),
            || Error::Conflict("dup".to_string()),
            unknown_references,
        );
        assert!(matches!(err, Error::NotFound(_)));
    }
}
