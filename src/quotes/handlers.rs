use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, instrument};

use crate::error::ApiError;
use crate::extract::AppQuery;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stock-data/", get(stock_data))
        .route("/stock-price/", get(stock_price))
}

#[derive(Debug, Deserialize)]
pub struct TickerQuery {
    pub ticker: Option<String>,
}

impl TickerQuery {
    fn ticker(&self) -> Result<&str, ApiError> {
        self.ticker
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Validation("Ticker is required".into()))
    }
}

/// Relays the upstream company profile verbatim. Upstream detail stays in the
/// logs; the caller sees a generic failure.
#[instrument(skip(state))]
pub async fn stock_data(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<TickerQuery>,
) -> Result<Json<Value>, ApiError> {
    let ticker = query.ticker()?;
    match state.quotes.company_profile(ticker).await {
        Ok(body) => Ok(Json(body)),
        Err(e) => {
            error!(error = %e, %ticker, "stock data fetch failed");
            Err(ApiError::Upstream)
        }
    }
}

/// Relays the upstream price snapshot verbatim.
#[instrument(skip(state))]
pub async fn stock_price(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<TickerQuery>,
) -> Result<Json<Value>, ApiError> {
    let ticker = query.ticker()?;
    match state.quotes.quote(ticker).await {
        Ok(body) => Ok(Json(body)),
        Err(e) => {
            error!(error = %e, %ticker, "stock price fetch failed");
            Err(ApiError::Upstream)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::quotes::client::QuoteClient;

    struct StaticQuotes;

    #[async_trait]
    impl QuoteClient for StaticQuotes {
        async fn quote(&self, _ticker: &str) -> anyhow::Result<Value> {
            Ok(json!({"c": 150.25, "d": 1.5, "dp": 1.0, "h": 151.0, "o": 149.0, "pc": 148.75, "t": 1700000000}))
        }
        async fn company_profile(&self, ticker: &str) -> anyhow::Result<Value> {
            Ok(json!({"ticker": ticker, "name": "Apple Inc"}))
        }
    }

    #[tokio::test]
    async fn missing_ticker_is_a_client_error() {
        let state = AppState::fake();
        let err = stock_price(State(state), AppQuery(TickerQuery { ticker: None }))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Ticker is required");
    }

    #[tokio::test]
    async fn blank_ticker_is_a_client_error() {
        let state = AppState::fake();
        let err = stock_data(
            State(state),
            AppQuery(TickerQuery {
                ticker: Some("   ".into()),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upstream_failure_maps_to_generic_error() {
        // AppState::fake() wires a client whose calls always fail.
        let state = AppState::fake();
        let err = stock_price(
            State(state),
            AppQuery(TickerQuery {
                ticker: Some("AAPL".into()),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Failed to fetch stock data");
    }

    #[tokio::test]
    async fn success_relays_upstream_body() {
        let state = AppState::fake_with_quotes(Arc::new(StaticQuotes));
        let Json(body) = stock_price(
            State(state.clone()),
            AppQuery(TickerQuery {
                ticker: Some("AAPL".into()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(body["c"], 150.25);
        assert_eq!(body["pc"], 148.75);

        let Json(profile) = stock_data(
            State(state),
            AppQuery(TickerQuery {
                ticker: Some("AAPL".into()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(profile["ticker"], "AAPL");
    }
}
