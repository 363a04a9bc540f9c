use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use clinic_core::model::{Patient, PractitionerProfile, User};
use clinic_core::store::{ClinicStore, MemoryStore};
use clinic_core::{AppointmentService, CoreConfig};
use clinic_session::{Pbkdf2Verifier, SessionService, TokenSigner};
use clinic_types::{DoctorProfileId, PatientId, Role, UserId, Username};
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_rest::{ApiDoc, AppState};

/// Main entry point for the clinic backend.
///
/// Serves the REST API plus Swagger UI on a single listener.
///
/// # Environment Variables
/// - `CLINIC_ADDR`: listen address (default: "0.0.0.0:3000")
/// - `CLINIC_TOKEN_SECRET`: HMAC key for session tokens (random per boot if unset)
/// - `CLINIC_TOKEN_TTL_MINUTES`: session lifetime (default: 480)
/// - `CLINIC_ADMIN_USERNAME`: bootstrap admin account (default: "admin")
/// - `CLINIC_ADMIN_PASSWORD`: bootstrap admin credential (default: "admin")
/// - `CLINIC_SEED_DEMO`: set to "1" to seed a demo doctor and patient
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clinic=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("CLINIC_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let secret = match std::env::var("CLINIC_TOKEN_SECRET") {
        Ok(secret) if !secret.is_empty() => secret.into_bytes(),
        _ => {
            tracing::warn!(
                "CLINIC_TOKEN_SECRET is not set; using a per-boot random secret, \
                 all sessions die on restart"
            );
            let mut bytes = Vec::with_capacity(32);
            bytes.extend_from_slice(uuid::Uuid::new_v4().as_bytes());
            bytes.extend_from_slice(uuid::Uuid::new_v4().as_bytes());
            bytes
        }
    };

    let ttl_minutes: i64 = std::env::var("CLINIC_TOKEN_TTL_MINUTES")
        .unwrap_or_else(|_| "480".into())
        .parse()?;

    let store = Arc::new(MemoryStore::new());
    seed_admin(&store)?;
    if std::env::var("CLINIC_SEED_DEMO").is_ok_and(|v| v == "1") {
        seed_demo(&store);
    }

    let sessions = Arc::new(SessionService::new(
        store.clone() as Arc<dyn ClinicStore>,
        TokenSigner::new(secret),
        Arc::new(Pbkdf2Verifier),
        Duration::minutes(ttl_minutes),
    ));
    let appointments = Arc::new(AppointmentService::new(
        store as Arc<dyn ClinicStore>,
        CoreConfig::default(),
    ));

    let app = api_rest::router(AppState {
        sessions,
        appointments,
    })
    .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    .layer(CorsLayer::permissive());

    tracing::info!("++ Starting clinic REST on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Seeds the bootstrap admin account so a fresh deployment is reachable.
fn seed_admin(store: &MemoryStore) -> anyhow::Result<()> {
    let username = std::env::var("CLINIC_ADMIN_USERNAME").unwrap_or_else(|_| "admin".into());
    let password = match std::env::var("CLINIC_ADMIN_PASSWORD") {
        Ok(password) if !password.is_empty() => password,
        _ => {
            tracing::warn!("CLINIC_ADMIN_PASSWORD is not set; bootstrap admin uses \"admin\"");
            "admin".into()
        }
    };

    let credential_hash = Pbkdf2Verifier::hash(&password)
        .map_err(|e| anyhow::anyhow!("failed to hash admin credential: {e}"))?;
    let username =
        Username::new(&username).map_err(|e| anyhow::anyhow!("bad admin username: {e}"))?;

    tracing::info!(%username, "seeded bootstrap admin");
    store.seed_user(User {
        id: UserId::new(),
        username,
        credential_hash,
        role: Role::Admin,
        revocation_counter: 0,
        deleted: false,
    });
    Ok(())
}

/// Seeds one doctor profile and one patient for manual Swagger exploration.
fn seed_demo(store: &MemoryStore) {
    let doctor_user = UserId::new();
    store.seed_doctor_profile(PractitionerProfile {
        id: DoctorProfileId::new(),
        owner_user_id: doctor_user,
        name: "Dr. Demo".into(),
        specialization: "General practice".into(),
        contact: "ext. 10".into(),
        deleted: false,
    });
    store.seed_patient(Patient {
        id: PatientId::new(),
        name: "Demo Patient".into(),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
        contact_phone: Some("+44 20 7946 0000".into()),
        address: None,
        deleted: false,
    });
    tracing::info!("seeded demo doctor profile and patient");
}
