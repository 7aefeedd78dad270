// SPDX-FileCopyrightText: Gatherly Contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! Core library of the *Gatherly Controller*
//!
//! # Example
//!
//! ```no_run
//! use gatherly_controller_core::Controller;
//! use anyhow::Result;
//!
//! #[actix_web::main]
//! async fn main()  {
//!     gatherly_controller_core::try_or_exit(run()).await;
//! }
//!
//! async fn run() -> Result<()> {
//!    if let Some(controller) = Controller::create("Gatherly Controller").await? {
//!         controller.run().await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

use crate::api::v1::middleware::token_auth::TokenAuth;
use crate::api::v1::response::error::json_error_handler;
use crate::settings::{Settings, SharedSettings};
use actix_cors::Cors;
use actix_web::http::header;
use actix_web::web::{self, Data};
use actix_web::{App, HttpServer, Scope};
use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use database::Db;
use std::net::Ipv6Addr;
use std::sync::Arc;
use tokio::signal::ctrl_c;
use tokio::signal::unix::{signal, SignalKind};
use tracing_actix_web::TracingLogger;

#[cfg(not(doc))]
mod api;
#[cfg(doc)]
pub mod api;

mod cli;
mod trace;

pub mod policy;
pub mod settings;
pub mod token;

#[derive(Debug, thiserror::Error)]
#[error("Blocking thread has panicked")]
pub struct BlockingError;

/// Custom version of `actix_web::web::block` which retains the current tracing span
pub async fn block<F, R>(f: F) -> Result<R, BlockingError>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let span = tracing::Span::current();

    let fut = actix_rt::task::spawn_blocking(move || span.in_scope(f));

    fut.await.map_err(|_| BlockingError)
}

/// Wrapper of the main function. Correctly outputs the error to the logging utility or stderr.
pub async fn try_or_exit<T, F>(f: F) -> T
where
    F: std::future::Future<Output = Result<T>>,
{
    match f.await {
        Ok(ok) => ok,
        Err(err) => {
            if log::log_enabled!(log::Level::Error) {
                log::error!("Crashed with error: {:?}", err);
            } else {
                eprintln!("Crashed with error: {err:?}");
            }

            std::process::exit(-1);
        }
    }
}

/// Controller struct representation containing all fields required to drive the controller
pub struct Controller {
    /// Settings loaded on [Controller::create]
    pub startup_settings: Arc<Settings>,

    /// Cloneable shared settings, re-read from the config file when receiving the `reload` signal.
    pub shared_settings: SharedSettings,

    /// CLI arguments
    args: cli::Args,

    db: Arc<Db>,
}

impl Controller {
    /// Tries to create a controller from CLI arguments and then the settings.
    ///
    /// This can return Ok(None) which would indicate that the controller executed a CLI
    /// subprogram (e.g. `migrate-db`) and must now exit.
    ///
    /// Otherwise it will return itself which can be run using [`Controller::run`]
    pub async fn create(program_name: &str) -> Result<Option<Self>> {
        let args = cli::parse_args();

        if let Some(cli::SubCommand::MigrateDb) = args.cmd {
            let settings = Settings::load(&args.config)?;

            db_storage::migrations::migrate_from_url(&settings.database.url)
                .await
                .context("Failed to migrate database")?;

            return Ok(None);
        }

        let settings = Settings::load(&args.config)?;

        trace::init(&settings.logging)?;

        log::info!("Starting {}", program_name);

        let controller = Self::init(settings, args).await?;

        Ok(Some(controller))
    }

    #[tracing::instrument(err, skip(settings, args))]
    async fn init(settings: Settings, args: cli::Args) -> Result<Self> {
        let settings = Arc::new(settings);
        let shared_settings: SharedSettings = Arc::new(ArcSwap::from(settings.clone()));

        db_storage::migrations::migrate_from_url(&settings.database.url)
            .await
            .context("Failed to migrate database")?;

        let db = Db::connect_url(
            &settings.database.url,
            settings.database.max_connections,
            Some(settings.database.min_idle_connections),
        )
        .context("Failed to connect to database")?;
        let db = Arc::new(db);

        Ok(Self {
            startup_settings: settings,
            shared_settings,
            args,
            db,
        })
    }

    /// Runs the controller until a fatal error occurred or a shutdown is requested (e.g. SIGTERM).
    pub async fn run(self) -> Result<()> {
        let http_server = {
            let cors = self.startup_settings.http.cors.clone();
            let db = Arc::downgrade(&self.db);
            let shared_settings = self.shared_settings.clone();

            HttpServer::new(move || {
                let cors = setup_cors(&cors);

                // Unwraps cannot panic. Server gets stopped before dropping the Arc.
                let db = Data::from(db.upgrade().unwrap());

                App::new()
                    .wrap(TracingLogger::default())
                    .wrap(cors)
                    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                    .app_data(Data::from(shared_settings.clone()))
                    .app_data(db.clone())
                    .service(v1_scope(db, shared_settings.clone()))
            })
        };

        let address = (Ipv6Addr::UNSPECIFIED, self.startup_settings.http.port);

        let http_server = http_server.bind(address).with_context(|| {
            format!("Failed to bind http server to {}:{}", address.0, address.1)
        })?;

        log::info!("Startup finished");

        let http_server = http_server.disable_signals().run();
        let http_server_handle = http_server.handle();

        let mut reload_signal =
            signal(SignalKind::hangup()).context("Failed to register SIGHUP signal handler")?;

        actix_rt::spawn(http_server);

        // Wait for either SIGTERM or SIGHUP and handle them accordingly
        loop {
            tokio::select! {
                _ = ctrl_c() => {
                    log::info!("Got termination signal, exiting");
                    break;
                }
                _ = reload_signal.recv() => {
                    log::info!("Got reload signal, reloading");

                    if let Err(e) = settings::reload_settings(self.shared_settings.clone(), &self.args.config) {
                        log::error!("Failed to reload settings, {}", e);
                        continue
                    }
                }
            }
        }

        http_server_handle.stop(true).await;

        log::info!("HTTP server stopped, goodbye!");

        Ok(())
    }
}

fn v1_scope(db: Data<Db>, shared_settings: SharedSettings) -> Scope {
    // the auth middleware only establishes the caller identity, each endpoint
    // decides itself whether an anonymous caller is acceptable
    web::scope("/v1").service(
        web::scope("")
            .wrap(TokenAuth {
                db,
                settings: shared_settings,
            })
            .service(api::v1::auth::register)
            .service(api::v1::auth::login)
            .service(api::v1::users::get_me)
            .service(api::v1::users::patch_me)
            .service(api::v1::users::get_user)
            .service(api::v1::events::new_event)
            .service(api::v1::events::get_events)
            .service(api::v1::events::get_event)
            .service(api::v1::events::patch_event)
            .service(api::v1::events::delete_event)
            .service(api::v1::events::rsvps::rsvp_to_event)
            .service(api::v1::events::rsvps::update_rsvp)
            .service(api::v1::events::reviews::get_reviews)
            .service(api::v1::events::reviews::add_review)
            .service(api::v1::events::invitations::get_invitations)
            .service(api::v1::events::invitations::invite_user)
            .service(api::v1::events::invitations::remove_invitation),
    )
}

fn setup_cors(settings: &settings::HttpCors) -> Cors {
    let mut cors = Cors::default();

    for origin in &settings.allowed_origin {
        cors = cors.allowed_origin(origin)
    }

    cors.allowed_header(header::CONTENT_TYPE)
        .allowed_header(header::AUTHORIZATION)
        .allow_any_method()
}
