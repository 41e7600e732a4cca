#[macro_use]
extern crate diesel;
#[macro_use]
extern crate diesel_migrations;
extern crate env_logger;
extern crate log;

use std::io;

use actix_web::{App, HttpServer, middleware};
use actix_web::web::Data;
use log::info;

use crate::config::Settings;

mod api;
mod config;
mod core;
mod db;

fn startup_error(err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    std::env::set_var("RUST_LOG",
      format!("{}actix_web=debug", std::env::var("RUST_LOG")
          .map_or_else(|_| "".to_string(), |ll| format!("{},", ll))
      ));
    env_logger::init();

    let settings = Settings::from_env().map_err(startup_error)?;

    let pg_pool = db::build_pool(&settings.database_url, settings.pool_size)
        .map_err(startup_error)?;

    if settings.run_migrations {
        let conn = pg_pool.get().map_err(startup_error)?;
        db::run_migrations(&conn).map_err(startup_error)?;
        info!("database migrations applied");
    }

    let pg_pool = Data::new(pg_pool);
    let bind = settings.bind_addr.clone();

    info!("Starting server at: {}", &bind);

    HttpServer::new(move || {
        App::new()
            .app_data(pg_pool.clone())
            .app_data(api::json_config())
            .app_data(api::path_config())
            .wrap(middleware::Logger::default())
            .configure(api::configure)
    })
    .bind(&bind)?
    .run()
    .await?;

    info!("server stopped");
    Ok(())
}
