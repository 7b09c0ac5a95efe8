use std::sync::Arc;

use hearth::config::RouteConfig;
use hearth::nav::Navigator;
use hearth::onboarding::HouseSetup;
use hearth::services::identity::Principal;
use hearth::services::memory::{MemoryBackend, MemoryNavigator};
use hearth::services::{IdentityProvider, ProfileStore};
use hearth::session::SessionService;

/// Demo run against the in-memory backend: walks a full session from
/// anonymous start through sign-in, house creation, and sign-out, logging
/// every snapshot and redirect.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_target(false)
        .init();

    eprintln!("🏠 Hearth session demo v{}\n", env!("CARGO_PKG_VERSION"));

    let backend = Arc::new(MemoryBackend::new());
    let navigator = Arc::new(MemoryNavigator::new("/"));

    let service = SessionService::new(
        backend.clone() as Arc<dyn IdentityProvider>,
        backend.clone() as Arc<dyn ProfileStore>,
        navigator.clone() as Arc<dyn Navigator>,
        RouteConfig::default(),
    );

    let _listener = service.handle().subscribe(|snapshot| {
        tracing::info!(
            authenticated = snapshot.is_authenticated,
            loading = snapshot.loading,
            house = snapshot
                .user_profile
                .as_ref()
                .and_then(|p| p.house_id.as_deref()),
            "Session changed"
        );
    });

    // ── Cold start, signed out ──────────────────────────────────────────
    service.start();
    tracing::info!(at = %navigator.current_location(), "After cold start");

    // ── Sign in; no profile document exists yet ─────────────────────────
    backend.sign_in(Principal::new("demo-user"));
    tracing::info!(at = %navigator.current_location(), "After sign-in");

    // ── Onboarding: create a house from the setup screen ────────────────
    let user_id = service
        .snapshot()
        .principal
        .map(|p| p.uid)
        .expect("signed in");

    let mut setup = HouseSetup::new();
    setup.open_create();
    setup.set_name("Maple House");
    let created = setup.submit(backend.as_ref(), &user_id).await;
    tracing::info!(created, at = %navigator.current_location(), "After house creation");

    if let Some(code) = backend.invite_code_for(&user_id) {
        tracing::info!(%code, "Invite code for housemates");
    }

    // ── Sign out ────────────────────────────────────────────────────────
    backend.sign_out();
    tracing::info!(at = %navigator.current_location(), "After sign-out");

    eprintln!("\nRedirect history: {:?}", navigator.replaced_paths());
    Ok(())
}
