pub mod health;
pub mod realtime;
pub mod rooms;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    health::configure_routes(cfg);
    rooms::configure_routes(cfg);
    realtime::configure_routes(cfg);
}
