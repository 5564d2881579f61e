//! What the `innkeep` binary's subcommands do.

use std::net::SocketAddr;

use chrono::NaiveTime;
use innkeep::model::{
    BasicInfoFields, FoodRulesFields, GuestProfileRulesFields, IdProofType, LocationFields,
    PropertyRulesFields, PropertyType, RefundTier, RoomPricingFields, SmokingRulesFields, UserRole,
};
use innkeep::wizard::{HouseRules, Rejected, Step, StoreSink, WizardSession};
use innkeep::{Accounts, Credentials, Jsonb, MigrationRunner, RoomInput};
use innkeep_config::Config;
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_postgres::NoTls;
use tracing::info;

use crate::{AppState, api};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] innkeep_config::ConfigError),

    #[error(transparent)]
    Store(#[from] innkeep::Error),

    #[error("failed to connect to the database: {0}")]
    Connect(#[from] tokio_postgres::Error),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),

    #[error("seeding stopped at {}: {}", .0.session.step(), .0.error)]
    Seed(Box<Rejected>),
}

impl From<Box<Rejected>> for CommandError {
    fn from(rejected: Box<Rejected>) -> Self {
        CommandError::Seed(rejected)
    }
}

pub type Result<T> = std::result::Result<T, CommandError>;

async fn connect(config: &Config) -> Result<tokio_postgres::Client> {
    let (client, connection) = tokio_postgres::connect(&config.database_url, NoTls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("connection error: {e}");
        }
    });
    Ok(client)
}

/// Apply pending migrations and report what ran.
pub async fn migrate(config: &Config) -> Result<()> {
    info!(database = %config.masked_database_url(), "migrating");
    let mut client = connect(config).await?;
    let applied = MigrationRunner::new(&mut client).migrate().await?;
    if applied.is_empty() {
        println!("Database is up to date.");
    } else {
        for version in &applied {
            println!("  applied {version}");
        }
        println!("Applied {} migration(s).", applied.len());
    }
    Ok(())
}

/// Print every known migration and whether it has run.
pub async fn status(config: &Config) -> Result<()> {
    let mut client = connect(config).await?;
    let status = MigrationRunner::new(&mut client).status().await?;
    for migration in &status {
        match migration.applied_at {
            Some(at) => println!("  [x] {} ({})", migration.version, at.format("%Y-%m-%d %H:%M:%S")),
            None => println!("  [ ] {}", migration.version),
        }
    }
    let pending = status.iter().filter(|m| !m.applied).count();
    println!("{} migration(s), {pending} pending.", status.len());
    Ok(())
}

/// Run the HTTP server until Ctrl+C or SIGTERM.
pub async fn serve(config: &Config, run_migrations: bool) -> Result<()> {
    if run_migrations {
        let mut client = connect(config).await?;
        let applied = MigrationRunner::new(&mut client).migrate().await?;
        info!(count = applied.len(), "migrations applied");
    }

    let state = AppState::from_config(config)?;
    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| CommandError::Bind { addr, source })?;
    info!(
        %addr,
        database = %config.masked_database_url(),
        upload_dir = %config.upload_dir.display(),
        "server running"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(CommandError::Serve)?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

const DEMO_EMAIL: &str = "demo.host@example.com";
const DEMO_PASSWORD: &str = "innkeep-demo";

fn time(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn demo_room(room_type: &str, floor: i32, capacity: i32) -> RoomInput {
    RoomInput {
        id: None,
        floor,
        room_type: room_type.into(),
        room_count: 2,
        capacity,
        bed_type: "Queen".into(),
        amenities: vec!["wifi".into(), "air conditioning".into()],
    }
}

/// Create a demo host account (or reuse it) and walk the onboarding wizard
/// for one property named `name`. Returns the property id.
pub async fn seed(config: &Config, name: &str) -> Result<i64> {
    let state = AppState::from_config(config)?;
    let conn = state.pool.get().await?;
    let accounts = Accounts::new();

    let credentials = Credentials {
        email: DEMO_EMAIL.into(),
        password: DEMO_PASSWORD.into(),
    };
    let user_id = match accounts.login(&conn, &credentials).await {
        Ok(user) => user.id,
        Err(innkeep::Error::InvalidCredentials) => {
            let registration = innkeep::Registration {
                name: "Demo Host".into(),
                email: DEMO_EMAIL.into(),
                phone: None,
                password: DEMO_PASSWORD.into(),
                role: UserRole::Host,
            };
            accounts.register(&conn, &registration).await?
        }
        Err(e) => return Err(e.into()),
    };
    drop(conn);

    let sink = StoreSink::new(state.pool.clone());
    let mut session = WizardSession::new(user_id)
        .with_basic_info(BasicInfoFields {
            star_rating: Some(4),
            contact_email: Some(DEMO_EMAIL.into()),
            ..BasicInfoFields::new(user_id, name, PropertyType::Villa)
        })
        .with_location(LocationFields {
            user_id,
            property_id: 0,
            address_line1: "12 Beach Road".into(),
            address_line2: None,
            city: "Panaji".into(),
            state: "Goa".into(),
            country: "India".into(),
            postal_code: "403001".into(),
        })
        .with_rooms(vec![demo_room("Deluxe", 1, 2), demo_room("Family Suite", 2, 4)]);

    // Pricing refers to room ids, so walk up to the pricing step first.
    while session.step() != Step::RoomPricing {
        session = session.next(&sink).await?;
    }
    let pricing = session
        .draft()
        .rooms
        .iter()
        .filter_map(|room| room.id.map(|id| (id, room)))
        .map(|(room_id, room)| RoomPricingFields {
            user_id,
            property_id: 0,
            room_id,
            room_type: room.room_type.clone(),
            base_price: Decimal::new(3500, 0) * Decimal::from(room.capacity / 2),
            occupancy_pricing: Jsonb(Vec::new()),
            refund_tiers: Jsonb(vec![RefundTier {
                enabled: true,
                days_before: 7,
                refund_percent: 100,
            }]),
            available_units: room.room_count,
            available_from: None,
            available_to: None,
        })
        .collect();

    let mut session = session
        .with_pricing(pricing)
        .with_property_rules(PropertyRulesFields {
            user_id,
            property_id: 0,
            check_in_time: time(14),
            check_out_time: time(11),
            min_guest_age: 18,
            smoking_allowed: false,
            alcohol_allowed: true,
            pets_allowed: false,
            outside_food_allowed: true,
            wheelchair_accessible: false,
            unmarried_couples_allowed: true,
            local_ids_allowed: true,
        })
        .with_house_rules(HouseRules {
            food: Some(FoodRulesFields {
                user_id,
                property_id: 0,
                outside_food_allowed: true,
                food_delivery_allowed: true,
                in_house_restaurant: false,
                non_veg_allowed: true,
            }),
            smoking: Some(SmokingRulesFields {
                user_id,
                property_id: 0,
                smoking_allowed: false,
                designated_area: true,
                smoking_in_rooms: false,
            }),
            ..Default::default()
        })
        .with_guest_profile(GuestProfileRulesFields {
            user_id,
            property_id: 0,
            unmarried_couples_allowed: true,
            local_ids_allowed: true,
            male_only_groups_allowed: false,
            min_age: 18,
        })
        .with_id_proofs(vec![IdProofType::Passport, IdProofType::NationalId]);

    // The demo has no images, so the walk ends on the image step.
    while session.step() != Step::RoomImages {
        session = session.next(&sink).await?;
    }
    let property_id = session.property_id().unwrap_or_default();
    info!(user_id, property_id, "demo property seeded");
    Ok(property_id)
}
