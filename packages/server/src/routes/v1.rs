use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest("/drones", drone_routes())
}

fn drone_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::drone::list_available_drones,
            handlers::drone::register_drone
        ))
        .routes(routes!(handlers::drone::get_battery_level))
        .routes(routes!(handlers::drone::load_medications))
        .routes(routes!(handlers::drone::list_medications))
        .routes(routes!(handlers::drone::list_event_logs))
}
