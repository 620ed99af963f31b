/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use actix_web::{web, App, HttpServer};
use dispatch_service::{
    domain::api,
    environment::{AppConfig, AppState},
    middleware::*,
    tools::{logger::*, prometheus::prometheus_metrics},
};
use std::{env::var, time::Duration};
use tracing_actix_web::TracingLogger;

pub fn read_dhall_config(config_path: &str) -> Result<AppConfig, String> {
    let config = serde_dhall::from_file(config_path).parse::<AppConfig>();
    match config {
        Ok(config) => Ok(config),
        Err(e) => Err(format!("Error reading config: {}", e)),
    }
}

#[actix_web::main]
async fn start_server() -> std::io::Result<()> {
    let dhall_config_path = var("DHALL_CONFIG")
        .unwrap_or_else(|_| "./dhall_config/dispatch_service.dhall".to_string());
    let app_config = read_dhall_config(&dhall_config_path).unwrap_or_else(|err| {
        println!("Dhall Config Reading Error : {}", err);
        std::process::exit(1);
    });

    let _guard = setup_tracing(app_config.logger_cfg.to_owned());

    let port = app_config.port;
    let workers = app_config.workers;

    let app_state = AppState::new(app_config).await.unwrap_or_else(|err| {
        error!(tag = "[Startup]", error_code = %err.code(), error = %err.message());
        std::process::exit(1);
    });

    let data = web::Data::new(app_state);

    info!(tag = "[Starting Server]", port = port, workers = workers);

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .app_data(
                web::JsonConfig::default()
                    .limit(data.max_allowed_req_size)
                    .error_handler(json_payload_error),
            )
            .wrap(RequestTimeout(Duration::from_millis(data.request_timeout)))
            .wrap(IncomingRequestMetrics)
            .wrap(TracingLogger::<DomainRootSpanBuilder>::new())
            .wrap(prometheus_metrics())
            .configure(api::handler)
    })
    .workers(workers)
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

fn main() {
    start_server().expect("Failed to start the server");
}
