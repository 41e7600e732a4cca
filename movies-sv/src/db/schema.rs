table! {
    genres (id) {
        id -> Int4,
        name -> Text,
    }
}

table! {
    languages (id) {
        id -> Int4,
        name -> Text,
    }
}

table! {
    movies (id) {
        id -> Int4,
        title -> Text,
        genre_id -> Int4,
        language_id -> Int4,
        oscar_count -> Nullable<Int4>,
        release_date -> Nullable<Date>,
        director -> Nullable<Text>,
        duration -> Nullable<Int4>,
    }
}

// view, read only
table! {
    title_language_genre (id) {
        id -> Int4,
        title -> Text,
        release_date -> Nullable<Date>,
        oscar_count -> Nullable<Int4>,
        language_name -> Text,
        genre_name -> Text,
        duration -> Nullable<Int4>,
        director -> Nullable<Text>,
    }
}

joinable!(movies -> genres (genre_id));
joinable!(movies -> languages (language_id));

allow_tables_to_appear_in_same_query!(
    genres,
    languages,
    movies,
);
