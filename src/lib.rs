#[macro_use]
extern crate rocket;

pub mod cache;
pub mod crm;
pub mod delivery;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod request_logger;
pub mod routes;
pub mod segments;

use crate::cache::TtlCache;
use crate::delivery::{DeliveryClient, DeliveryConfig, EmailSender};
use crate::dispatch::DispatchConfig;
use crate::request_logger::RequestLogger;
use env_logger::Env;
use rocket::fairing::AdHoc;
use rocket::http::Method;
use rocket::{Build, Rocket};
use rocket_cors::{AllowedOrigins, CorsOptions};
use rocket_okapi::{
    openapi_get_routes,
    rapidoc::{GeneralConfig, HideShowConfig, RapiDocConfig, make_rapidoc},
    settings::UrlObject,
    swagger_ui::{SwaggerUIConfig, make_swagger_ui},
};
use std::sync::{Arc, Once};

static LOGGER: Once = Once::new();

fn init_logger() {
    LOGGER.call_once(|| {
        env_logger::Builder::from_env(
            Env::default().default_filter_or("info,rocket::server=warn,rocket::request=warn"),
        )
        .init();
    });
}

pub fn rocket() -> Rocket<Build> {
    init_logger();

    log::info!("Starting Campaign API Server");

    // Configure CORS
    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .allowed_methods(
            vec![
                Method::Get,
                Method::Post,
                Method::Put,
                Method::Delete,
                Method::Patch,
            ]
            .into_iter()
            .map(From::from)
            .collect(),
        )
        .allow_credentials(true)
        .to_cors()
        .expect("Error creating CORS");

    rocket::build()
        .attach(RequestLogger)
        .attach(cors)
        // Delivery provider client and configuration
        .attach(AdHoc::try_on_ignite(
            "Delivery Configuration",
            |rocket| async move {
                let delivery_config = DeliveryConfig::from_env();
                if !delivery_config.is_configured() {
                    log::warn!(
                        "delivery provider not fully configured; missing {:?}. Sends will fail until these are set.",
                        delivery_config.missing()
                    );
                }

                match DeliveryClient::new(delivery_config.clone()) {
                    Ok(client) => {
                        let sender: Arc<dyn EmailSender> = Arc::new(client);
                        Ok(rocket.manage(delivery_config).manage(sender))
                    }
                    Err(err) => {
                        log::error!("failed to initialize delivery client: {}", err);
                        Err(rocket)
                    }
                }
            },
        ))
        // Dispatch ceiling and suggestion cache
        .attach(AdHoc::on_ignite("Dispatch Configuration", |rocket| async move {
            rocket
                .manage(DispatchConfig::from_env())
                .manage(TtlCache::default())
        }))
        .mount(
            "/api/v1",
            openapi_get_routes![
                // Health routes
                routes::health::health_check,
                routes::health::readiness,
                // Segment routes
                routes::segments::suggest_segments,
                // CRM routes
                routes::crm::company_profile,
                // Email routes
                routes::email::send_email,
                routes::email::dispatch_emails,
                routes::email::email_config,
            ],
        )
        .mount(
            "/api/docs/swagger/",
            make_swagger_ui(&SwaggerUIConfig {
                url: "../../v1/openapi.json".to_owned(),
                ..Default::default()
            }),
        )
        .mount(
            "/api/docs/rapidoc/",
            make_rapidoc(&RapiDocConfig {
                general: GeneralConfig {
                    spec_urls: vec![UrlObject::new("Campaign API", "../../v1/openapi.json")],
                    ..Default::default()
                },
                hide_show: HideShowConfig {
                    allow_spec_url_load: false,
                    allow_spec_file_load: false,
                    ..Default::default()
                },
                ..Default::default()
            }),
        )
}

#[cfg_attr(not(test), allow(dead_code))]
pub mod test_support {
    use rocket::config::LogLevel;
    use rocket::figment::Figment;
    use rocket::local::asynchronous::Client as AsyncClient;
    use rocket::local::blocking::Client;
    use rocket::{Build, Rocket, Route};

    /// Builder for constructing Rocket instances tailored for integration
    /// tests: random port, logging off, only the routes and managed state a
    /// test needs.
    #[derive(Default)]
    pub struct TestRocketBuilder {
        figment: Figment,
        mounts: Vec<(String, Vec<Route>)>,
        states: Vec<Box<dyn FnOnce(Rocket<Build>) -> Rocket<Build>>>,
    }

    impl TestRocketBuilder {
        /// Start a builder with sensible defaults: random port, logging disabled.
        pub fn new() -> Self {
            let figment = rocket::Config::figment()
                .merge(("port", 0))
                .merge(("log_level", LogLevel::Off))
                .merge(("cli_colors", false));

            Self {
                figment,
                mounts: Vec::new(),
                states: Vec::new(),
            }
        }

        /// Mount routes under `/api/v1`.
        pub fn mount_api_routes(mut self, routes: Vec<Route>) -> Self {
            self.mounts.push(("/api/v1".to_string(), routes));
            self
        }

        /// Manage a state value for routes that request it via `&State<T>`.
        pub fn manage<T: Send + Sync + 'static>(mut self, value: T) -> Self {
            self.states.push(Box::new(move |rocket| rocket.manage(value)));
            self
        }

        /// Finish building the Rocket instance.
        pub fn build(self) -> Rocket<Build> {
            let mut rocket = rocket::custom(self.figment);

            for (base, routes) in self.mounts {
                rocket = rocket.mount(base, routes);
            }

            for install in self.states {
                rocket = install(rocket);
            }

            rocket
        }

        /// Convenience helper to produce a blocking local client.
        pub fn blocking_client(self) -> Client {
            Client::tracked(self.build()).expect("valid Rocket instance")
        }

        /// Convenience helper to produce an asynchronous local client.
        pub async fn async_client(self) -> AsyncClient {
            AsyncClient::tracked(self.build())
                .await
                .expect("valid Rocket instance")
        }
    }
}
