use axum::{extract::Extension, Json};

use crate::app::dto::Envelope;
use crate::context::ActorContext;

/// Returns the actor resolved by the protected-resource gate.
pub async fn profile(Extension(actor): Extension<ActorContext>) -> Json<Envelope> {
    Json(Envelope::ok("Profile fetched successfully").with_actor(actor.into_actor()))
}
