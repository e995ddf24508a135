mod render;

use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    AccountType, AggregatedRow, Granularity, PayoutMode, ProjectionSummary, SimulationConfig,
    SimulationError, aggregate, run_projection, validate,
};

pub use render::{format_money, format_shares, render_report};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliAccountType {
    Taxable,
    TaxDeferred,
}

impl From<CliAccountType> for AccountType {
    fn from(value: CliAccountType) -> Self {
        match value {
            CliAccountType::Taxable => AccountType::Taxable,
            CliAccountType::TaxDeferred => AccountType::TaxDeferred,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliView {
    Monthly,
    Yearly,
    Total,
}

impl From<CliView> for Granularity {
    fn from(value: CliView) -> Self {
        match value {
            CliView::Monthly => Granularity::Monthly,
            CliView::Yearly => Granularity::Yearly,
            CliView::Total => Granularity::Total,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiAccountType {
    #[serde(alias = "Taxable")]
    Taxable,
    #[serde(
        alias = "taxDeferred",
        alias = "tax_deferred",
        alias = "Tax Deferred"
    )]
    TaxDeferred,
}

impl From<ApiAccountType> for CliAccountType {
    fn from(value: ApiAccountType) -> Self {
        match value {
            ApiAccountType::Taxable => CliAccountType::Taxable,
            ApiAccountType::TaxDeferred => CliAccountType::TaxDeferred,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiView {
    #[serde(alias = "Monthly")]
    Monthly,
    #[serde(alias = "Yearly")]
    Yearly,
    #[serde(alias = "Total")]
    Total,
}

impl From<ApiView> for CliView {
    fn from(value: ApiView) -> Self {
        match value {
            ApiView::Monthly => CliView::Monthly,
            ApiView::Yearly => CliView::Yearly,
            ApiView::Total => CliView::Total,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
enum ResponseView {
    Monthly,
    Yearly,
    Total,
}

impl From<Granularity> for ResponseView {
    fn from(value: Granularity) -> Self {
        match value {
            Granularity::Monthly => ResponseView::Monthly,
            Granularity::Yearly => ResponseView::Yearly,
            Granularity::Total => ResponseView::Total,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    total_shares: Option<f64>,
    avg_cost_basis: Option<f64>,
    holding_months: Option<u32>,
    avg_monthly_dividend: Option<f64>,
    federal_tax_rate: Option<f64>,
    state_tax_rate: Option<f64>,
    account_type: Option<ApiAccountType>,
    reinvest_dividends: Option<bool>,
    reinvest_percent: Option<f64>,
    monthly_withdrawal: Option<f64>,
    reinvestment_share_price: Option<f64>,
    monthly_dca: Option<f64>,
    view: Option<ApiView>,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "dripsim",
    about = "Monthly dividend reinvestment projection (DRIP, withdrawals, taxes, DCA)",
    after_help = "Run `dripsim serve [port]` to start the HTTP API and web page (default port 8080)."
)]
pub struct Cli {
    #[arg(long, default_value_t = 10_000.0, help = "Shares held at the start")]
    total_shares: f64,
    #[arg(
        long,
        default_value_t = 25.0,
        help = "Weighted average cost basis per share (informational)"
    )]
    avg_cost_basis: f64,
    #[arg(long, default_value_t = 24, help = "Holding period in months (1-240)")]
    holding_months: u32,
    #[arg(
        long,
        default_value_t = 2.0,
        help = "Average monthly dividend per share"
    )]
    avg_monthly_dividend_per_share: f64,
    #[arg(long, default_value_t = 20.0, help = "Federal tax rate in percent")]
    federal_tax_rate: f64,
    #[arg(long, default_value_t = 5.0, help = "State tax rate in percent")]
    state_tax_rate: f64,
    #[arg(long, value_enum, default_value_t = CliAccountType::Taxable)]
    account_type: CliAccountType,
    #[arg(long, help = "Reinvest dividends instead of withdrawing a fixed amount")]
    reinvest_dividends: bool,
    #[arg(
        long,
        default_value_t = 100.0,
        help = "Percent of net dividends to reinvest, used with --reinvest-dividends"
    )]
    reinvest_percent: f64,
    #[arg(
        long,
        default_value_t = 2_000.0,
        help = "Monthly withdrawal; any net dividend above it is reinvested"
    )]
    monthly_withdrawal: f64,
    #[arg(
        long,
        default_value_t = 25.0,
        help = "Average share price paid for reinvested and DCA shares"
    )]
    reinvestment_share_price: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Extra dollars invested every month"
    )]
    monthly_dca: f64,
    #[arg(long, value_enum, default_value_t = CliView::Monthly)]
    view: CliView,
    #[arg(long, help = "Print the JSON response instead of the table")]
    json: bool,
}

#[derive(Debug)]
struct ApiRequest {
    config: SimulationConfig,
    view: Granularity,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    view: ResponseView,
    holding_months: u32,
    summary: ProjectionSummary,
    rows: Vec<AggregatedRow>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn describe_error(err: SimulationError) -> String {
    match err {
        SimulationError::InvalidConfiguration { field, message } => {
            format!("--{} {message}", field.replace('_', "-"))
        }
        other => other.to_string(),
    }
}

fn build_config(cli: &Cli) -> Result<SimulationConfig, String> {
    let payout = if cli.reinvest_dividends {
        PayoutMode::Reinvest {
            percent: cli.reinvest_percent,
        }
    } else {
        PayoutMode::Withdraw {
            monthly_amount: cli.monthly_withdrawal,
        }
    };

    let config = SimulationConfig {
        total_shares: cli.total_shares,
        avg_cost_basis: cli.avg_cost_basis,
        holding_months: cli.holding_months,
        avg_monthly_dividend_per_share: cli.avg_monthly_dividend_per_share,
        federal_tax_rate: cli.federal_tax_rate,
        state_tax_rate: cli.state_tax_rate,
        account_type: cli.account_type.into(),
        payout,
        reinvestment_share_price: cli.reinvestment_share_price,
        monthly_dca: cli.monthly_dca,
    };
    validate(&config).map_err(describe_error)?;
    Ok(config)
}

fn build_simulate_response(
    config: &SimulationConfig,
    view: Granularity,
) -> Result<SimulateResponse, SimulationError> {
    let projection = run_projection(config)?;
    let rows = aggregate(&projection.months, view)?;
    Ok(SimulateResponse {
        view: view.into(),
        holding_months: config.holding_months,
        summary: projection.summary,
        rows,
    })
}

/// Runs one projection from parsed flags and returns what should be printed.
pub fn project_from_cli(cli: &Cli) -> Result<String, String> {
    let config = build_config(cli)?;
    let view = Granularity::from(cli.view);
    let response = build_simulate_response(&config, view).map_err(describe_error)?;

    if cli.json {
        return serde_json::to_string_pretty(&response)
            .map_err(|e| format!("failed to serialize response: {e}"));
    }
    Ok(render_report(&response.summary, &response.rows, view))
}

pub fn run_cli() -> Result<(), String> {
    let cli = Cli::parse();
    let output = project_from_cli(&cli)?;
    println!("{output}");
    Ok(())
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "dripsim HTTP API listening");
    info!("local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(payload: Result<Query<SimulatePayload>, QueryRejection>) -> Response {
    match payload {
        Ok(Query(payload)) => simulate_handler_impl(payload),
        Err(rejection) => rejected_payload(rejection.status(), rejection.body_text()),
    }
}

async fn simulate_post_handler(payload: Result<Json<SimulatePayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => simulate_handler_impl(payload),
        Err(rejection) => rejected_payload(rejection.status(), rejection.body_text()),
    }
}

fn rejected_payload(status: StatusCode, msg: String) -> Response {
    warn!(error = %msg, "malformed simulate payload");
    error_response(status, &msg)
}

fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => {
            warn!(error = %msg, "rejected simulate request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    match build_simulate_response(&request.config, request.view) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => {
            let msg = describe_error(err);
            warn!(error = %msg, "simulation failed");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: SimulatePayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.total_shares {
        cli.total_shares = v;
    }
    if let Some(v) = payload.avg_cost_basis {
        cli.avg_cost_basis = v;
    }
    if let Some(v) = payload.holding_months {
        cli.holding_months = v;
    }
    if let Some(v) = payload.avg_monthly_dividend {
        cli.avg_monthly_dividend_per_share = v;
    }
    if let Some(v) = payload.federal_tax_rate {
        cli.federal_tax_rate = v;
    }
    if let Some(v) = payload.state_tax_rate {
        cli.state_tax_rate = v;
    }
    if let Some(v) = payload.account_type {
        cli.account_type = v.into();
    }
    if let Some(v) = payload.reinvest_dividends {
        cli.reinvest_dividends = v;
    }
    if let Some(v) = payload.reinvest_percent {
        cli.reinvest_percent = v;
    }
    if let Some(v) = payload.monthly_withdrawal {
        cli.monthly_withdrawal = v;
    }
    if let Some(v) = payload.reinvestment_share_price {
        cli.reinvestment_share_price = v;
    }
    if let Some(v) = payload.monthly_dca {
        cli.monthly_dca = v;
    }
    if let Some(v) = payload.view {
        cli.view = v.into();
    }

    let config = build_config(&cli)?;
    Ok(ApiRequest {
        config,
        view: cli.view.into(),
    })
}

fn default_cli_for_api() -> Cli {
    Cli {
        total_shares: 10_000.0,
        avg_cost_basis: 25.0,
        holding_months: 24,
        avg_monthly_dividend_per_share: 2.0,
        federal_tax_rate: 20.0,
        state_tax_rate: 5.0,
        account_type: CliAccountType::Taxable,
        reinvest_dividends: false,
        reinvest_percent: 100.0,
        monthly_withdrawal: 2_000.0,
        reinvestment_share_price: 25.0,
        monthly_dca: 0.0,
        view: CliView::Monthly,
        json: false,
    }
}
