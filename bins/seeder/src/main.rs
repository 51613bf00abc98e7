//! Demo data seeder for BrokerDesk development.
//!
//! Creates insurance companies, a driver role and four approved drivers, then
//! fills January to June 2022 with random sales and settles January to May.
//!
//! Usage: cargo run --bin seeder

use anyhow::{Context, bail};
use chrono::{Days, NaiveDate};
use rand::{Rng, seq::IndexedRandom};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use tracing::info;
use uuid::Uuid;

use brokerdesk_core::auth::hash_password;
use brokerdesk_core::period::Period;
use brokerdesk_core::permission::PermissionSet;
use brokerdesk_db::repositories::{MemberUpdate, NewTransaction, TransactionUpdate};
use brokerdesk_db::{
    BootstrapOutcome, InsuranceCompanyRepository, InvoiceRepository, RoleRepository,
    TransactionRepository, UserRepository, connect, ensure_superuser,
};
use brokerdesk_shared::AppConfig;

const YEAR: i32 = 2022;
const SETTLED_MONTHS: std::ops::RangeInclusive<u32> = 1..=5;
const PASSWORD: &str = "testpassword1!";
const DRIVER_ROLE: &str = "Driver";

const COMPANIES: [&str; 3] = ["Anycar", "HyundaiMarine", "Partner"];
const DRIVERS: [(&str, &str); 4] = [
    ("Jennie", "jennie@blackpink.com"),
    ("Chaeyoung", "chaeyoung@blackpink.com"),
    ("Jisoo", "jisoo@blackpink.com"),
    ("Lalisa", "lalisa@blackpink.com"),
];
const PLATE_SYLLABLES: [&str; 7] = ["가", "나", "다", "라", "마", "바", "사"];
const MODELS: [&str; 12] = [
    "Avante", "Sonata", "Grandeur", "Genesis", "K3", "K5", "K7", "K9", "E220d", "S500", "Huracan",
    "Chiron",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seeder=info,brokerdesk_db=info".into()),
        )
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = connect(&config.database).await?;
    info!("Connected to database");

    if let Some(superuser) = &config.superuser
        && let BootstrapOutcome::Created { user_id } = ensure_superuser(&db, superuser).await?
    {
        info!(user_id = %user_id, "Administrator account created");
    }

    let company_ids = seed_companies(&db).await?;
    let driver_ids = seed_drivers(&db).await?;
    seed_transactions(&db, &driver_ids, &company_ids).await?;
    settle_months(&db, &driver_ids).await?;

    info!("Seeding complete");
    Ok(())
}

async fn seed_companies(db: &DatabaseConnection) -> anyhow::Result<Vec<i64>> {
    let repo = InsuranceCompanyRepository::new(db.clone());
    if !repo.list().await?.is_empty() {
        bail!("The database already has insurance companies; seed an empty database");
    }

    let mut ids = Vec::with_capacity(COMPANIES.len());
    for name in COMPANIES {
        ids.push(repo.create(name).await?.id);
    }
    info!(count = ids.len(), "Insurance companies created");
    Ok(ids)
}

/// Registers, verifies and approves the demo drivers.
async fn seed_drivers(db: &DatabaseConnection) -> anyhow::Result<Vec<i64>> {
    let role = RoleRepository::new(db.clone()).create(DRIVER_ROLE).await?;
    let users = UserRepository::new(db.clone());
    let password_hash = hash_password(PASSWORD)?;
    let mut rng = rand::rng();

    let mut ids = Vec::with_capacity(DRIVERS.len());
    for (name, email) in DRIVERS {
        let token = Uuid::new_v4().simple().to_string();
        users.register(email, &password_hash, name, &token).await?;
        let user = users.verify_email(&token).await?;
        let user = users
            .update_member(
                user,
                MemberUpdate {
                    name: None,
                    role_id: Some(role.id),
                    accept: true,
                    plate_fee: Some(rng.random_range(15..=20) * 10_000),
                    contract_fee: Some(Decimal::new(rng.random_range(150..=200), 1)),
                    permission: Some(PermissionSet::DEFAULT),
                },
            )
            .await?;
        ids.push(user.id);
    }
    info!(count = ids.len(), password = PASSWORD, "Drivers approved");
    Ok(ids)
}

/// Random sales over the first half of the year; about one in twenty is canceled.
async fn seed_transactions(
    db: &DatabaseConnection,
    driver_ids: &[i64],
    company_ids: &[i64],
) -> anyhow::Result<()> {
    let repo = TransactionRepository::new(db.clone());
    let first_day = NaiveDate::from_ymd_opt(YEAR, 1, 1).context("invalid seed year")?;
    let mut rng = rand::rng();
    let mut total = 0_usize;

    for &user_id in driver_ids {
        for _ in 0..rng.random_range(500..=1000) {
            let company_id = *company_ids.choose(&mut rng).context("no companies")?;
            let date = first_day
                .checked_add_days(Days::new(rng.random_range(0..=180)))
                .context("date out of range")?;
            let memo = if rng.random_range(1..=15) == 1 {
                format!("memo{}", rng.random_range(1..=2))
            } else {
                String::new()
            };
            let transaction = repo
                .create(NewTransaction {
                    user_id,
                    insurance_company_id: company_id,
                    vehicle_id: plate_number(&mut rng),
                    vehicle_model: (*MODELS.choose(&mut rng).context("no models")?).to_string(),
                    date,
                    price: rng.random_range(100..=250) * 1_000,
                    memo,
                })
                .await?;

            if rng.random_range(1..=20) == 1 {
                repo.update(
                    transaction,
                    TransactionUpdate {
                        canceled: Some(true),
                        cancel_fee: Some(rng.random_range(5..=15) * 1_000),
                        ..TransactionUpdate::default()
                    },
                )
                .await?;
            }
            total += 1;
        }
    }
    info!(count = total, "Transactions created");
    Ok(())
}

fn plate_number(rng: &mut impl Rng) -> String {
    let syllable = PLATE_SYLLABLES.choose(rng).copied().unwrap_or("가");
    format!(
        "{}{syllable}{}",
        rng.random_range(10..=150),
        rng.random_range(1000..=9999)
    )
}

/// Adds occasional extras and settles every driver and the company for
/// January to May.
async fn settle_months(db: &DatabaseConnection, driver_ids: &[i64]) -> anyhow::Result<()> {
    let invoices = InvoiceRepository::new(db.clone());
    let mut rng = rand::rng();

    for month in SETTLED_MONTHS {
        let period = Period::new(YEAR, month)?;

        for &user_id in driver_ids {
            if rng.random_range(1..=5) == 1 {
                let bonus = rng.random_range(100..=250) * 1_000;
                invoices
                    .create_user_extra(user_id, period, "Holiday bonus", bonus)
                    .await?;
            }
            invoices.settle_user_invoice(user_id, period).await?;
        }

        match rng.random_range(1..=5) {
            4 => {
                let price = -rng.random_range(50..=100) * 10_000;
                invoices
                    .create_company_extra(period, "Extra expense", price)
                    .await?;
            }
            5 => {
                let price = rng.random_range(50..=100) * 10_000;
                invoices
                    .create_company_extra(period, "Extra income", price)
                    .await?;
            }
            _ => {}
        }

        let rental_fee = rng.random_range(50..=100) * 10_000;
        let maintenance_fee = rng.random_range(5..=10) * 10_000;
        let invoice = invoices
            .settle_company_invoice(period, rental_fee, maintenance_fee)
            .await?;
        info!(year = YEAR, month, income = invoice.income, "Month settled");
    }
    Ok(())
}
