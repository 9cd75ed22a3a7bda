use actix_web::middleware::Logger;
use actix_web::{App, HttpServer};
use env_logger::Env;
use eventsphere::db::init_db;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    eventsphere::session::init();
    init_db(std::env::var("DATABASE_URL").expect("DATABASE_URL must be set.")).await;

    let bind = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_owned());
    log::info!("Listening on {}", bind);

    HttpServer::new(|| {
        App::new()
            .wrap(Logger::default())
            .configure(eventsphere::web::configure)
    })
    .bind(&bind)?
    .run()
    .await
}
