use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::api::{
    assessments, bookings, documents, evaluations, health, imports, pathways, players,
    suggestions, teams, tryouts, users, AppState,
};
use crate::auth::{
    admin_only_middleware, cors_layer, jwt_auth_middleware, security_headers_layer,
};

pub fn create_routes(state: AppState) -> Router {
    let auth_layer = middleware::from_fn_with_state(state.auth.clone(), jwt_auth_middleware);

    // /api/auth mixes public flows with authenticated account routes.
    let auth_router = users::auth_routes()
        .merge(users::account_routes().layer(auth_layer.clone()));

    // Player sub-resources live under /api/players/:id/...
    let players_router = players::routes()
        .merge(assessments::player_routes())
        .merge(evaluations::player_routes())
        .merge(pathways::player_routes())
        .merge(documents::player_routes());

    let api = Router::new()
        .nest("/players", players_router)
        .nest("/teams", teams::routes())
        .nest("/tryouts", tryouts::routes())
        .nest("/assessments", assessments::routes())
        .nest("/evaluations", evaluations::routes())
        .nest("/bookings", bookings::routes())
        .nest("/imports", imports::routes())
        .nest("/documents", documents::routes())
        .nest("/suggestions", suggestions::routes())
        .layer(auth_layer.clone());

    // Admin routes check the role after the JWT layer has resolved the
    // session; layers run outermost-last.
    let admin_router = users::admin_routes()
        .layer(middleware::from_fn(admin_only_middleware))
        .layer(auth_layer);

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/auth", auth_router)
        .nest("/api/admin", admin_router)
        .nest("/api", api)
        .layer(security_headers_layer())
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
