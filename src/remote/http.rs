//! HTTP client for the ordering backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    domain::{
        cart::models::Product,
        gift_cards::models::{GiftCards, IssuedGiftCard, NewGiftCard, RedeemedGiftCard},
        orders::models::{Order, OrderRequest},
        session::models::{Credentials, Registration, User},
    },
    ids::ProductId,
    remote::{
        RemoteError, RemoteService,
        models::{
            AuthResponse, ErrorBody, GiftCardResponse, OrderResponse, ProductResponse,
            ProductsResponse, ProfileResponse, RedeemRequest,
        },
    },
};

/// Configuration for connecting to the backend.
#[derive(Debug, Clone)]
pub struct HttpRemoteConfig {
    /// Server address, e.g. `"http://localhost:5000"`.
    pub base_url: String,

    /// Upper bound for a whole request, connect to last byte.
    pub timeout: Duration,
}

/// [`RemoteService`] over HTTP and JSON.
#[derive(Debug, Clone)]
pub struct HttpRemoteService {
    config: HttpRemoteConfig,
    http: Client,
}

impl HttpRemoteService {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Client`] when the HTTP client cannot be built.
    pub fn new(config: HttpRemoteConfig) -> Result<Self, RemoteError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(RemoteError::Client)?;

        Ok(Self { config, http })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RemoteError> {
        let response = request.send().await?;
        let status = response.status();

        debug!(status = status.as_u16(), url = %response.url(), "backend response");

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();

            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(ErrorBody::into_message)
                .unwrap_or_else(|| {
                    format!(
                        "request failed with status {}",
                        status.canonical_reason().unwrap_or(status.as_str())
                    )
                });

            return Err(RemoteError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl RemoteService for HttpRemoteService {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, RemoteError> {
        let request = self
            .http
            .post(self.url("/api/auth/login"))
            .json(credentials);

        self.send(request).await
    }

    async fn register(&self, registration: &Registration) -> Result<AuthResponse, RemoteError> {
        let request = self
            .http
            .post(self.url("/api/auth/register"))
            .json(registration);

        self.send(request).await
    }

    async fn profile(&self, token: &str) -> Result<User, RemoteError> {
        let request = self
            .http
            .get(self.url("/api/auth/profile"))
            .bearer_auth(token);

        let response: ProfileResponse = self.send(request).await?;

        Ok(response.user)
    }

    async fn create_order(
        &self,
        token: &str,
        order: &OrderRequest,
    ) -> Result<Order, RemoteError> {
        let request = self
            .http
            .post(self.url("/api/orders/"))
            .bearer_auth(token)
            .json(order);

        let response: OrderResponse = self.send(request).await?;

        Ok(response.order)
    }

    async fn products(&self) -> Result<Vec<Product>, RemoteError> {
        let response: ProductsResponse = self.send(self.http.get(self.url("/api/products/"))).await?;

        Ok(response.products)
    }

    async fn product(&self, id: ProductId) -> Result<Product, RemoteError> {
        let request = self.http.get(self.url(&format!("/api/products/{id}")));
        let response: ProductResponse = self.send(request).await?;

        Ok(response.product)
    }

    async fn create_gift_card(
        &self,
        token: &str,
        card: &NewGiftCard,
    ) -> Result<IssuedGiftCard, RemoteError> {
        let request = self
            .http
            .post(self.url("/api/gift-cards/"))
            .bearer_auth(token)
            .json(card);

        let response: GiftCardResponse<IssuedGiftCard> = self.send(request).await?;

        Ok(response.gift_card)
    }

    async fn gift_cards(&self, token: &str) -> Result<GiftCards, RemoteError> {
        let request = self
            .http
            .get(self.url("/api/gift-cards/"))
            .bearer_auth(token);

        self.send(request).await
    }

    async fn redeem_gift_card(
        &self,
        token: &str,
        code: &str,
    ) -> Result<RedeemedGiftCard, RemoteError> {
        let request = self
            .http
            .post(self.url("/api/gift-cards/redeem"))
            .bearer_auth(token)
            .json(&RedeemRequest { code });

        let response: GiftCardResponse<RedeemedGiftCard> = self.send(request).await?;

        Ok(response.gift_card)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{Read, Write},
        net::TcpListener,
        thread::{self, JoinHandle},
    };

    use testresult::TestResult;

    use super::*;
    use crate::{domain::orders::models::OrderStatus, ids::OrderId, prices::Price};

    /// Serve one canned response and hand back the raw request.
    fn serve_once(status: &str, body: &str) -> TestResult<(String, JoinHandle<String>)> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let base_url = format!("http://{}", listener.local_addr()?);
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );

        let handle = thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return String::new();
            };

            let mut request = Vec::new();
            let mut buffer = [0_u8; 4096];

            while let Ok(read) = stream.read(&mut buffer) {
                if read == 0 {
                    break;
                }

                request.extend(buffer.iter().take(read));

                if is_complete(&request) {
                    break;
                }
            }

            if stream.write_all(response.as_bytes()).is_err() {
                return String::new();
            }

            String::from_utf8_lossy(&request).into_owned()
        });

        Ok((base_url, handle))
    }

    fn is_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);

        let Some((head, body)) = text.split_once("\r\n\r\n") else {
            return false;
        };

        let length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);

        body.len() >= length
    }

    fn client(base_url: String) -> TestResult<HttpRemoteService> {
        Ok(HttpRemoteService::new(HttpRemoteConfig {
            base_url,
            timeout: Duration::from_secs(5),
        })?)
    }

    #[tokio::test]
    async fn login_posts_credentials() -> TestResult {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"message":"Login successful","access_token":"tok","user":{"id":1,"username":"ana","email":"ana@example.com","first_name":"Ana","last_name":"B","loyalty_points":40}}"#,
        )?;

        let response = client(base_url)?
            .login(&Credentials::new("ana@example.com", "secret1"))
            .await?;

        let request = server.join().unwrap_or_default();

        assert!(request.starts_with("POST /api/auth/login "), "{request}");
        assert!(request.contains(r#""email":"ana@example.com""#), "{request}");
        assert_eq!(response.access_token, "tok");
        assert_eq!(response.user.loyalty_points, 40);

        Ok(())
    }

    #[tokio::test]
    async fn error_body_becomes_status_error() -> TestResult {
        let (base_url, server) =
            serve_once("401 Unauthorized", r#"{"error":"Invalid email or password"}"#)?;

        let result = client(base_url)?
            .login(&Credentials::new("ana@example.com", "wrong"))
            .await;

        server.join().unwrap_or_default();

        assert!(
            matches!(
                &result,
                Err(RemoteError::Status { status: 401, message }) if message == "Invalid email or password"
            ),
            "expected 401 with server message, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_order_sends_bearer_token() -> TestResult {
        let (base_url, server) = serve_once(
            "201 Created",
            r#"{"message":"Order created successfully","order":{"id":9,"status":"pending","total_amount":2.5,"points_earned":12,"points_used":100,"order_date":"2024-05-01 10:30:00"}}"#,
        )?;

        let order = client(base_url)?
            .create_order(
                "tok",
                &OrderRequest {
                    items: Vec::new(),
                    use_points: true,
                    table_number: Some(4),
                },
            )
            .await?;

        let request = server.join().unwrap_or_default().to_ascii_lowercase();

        assert!(request.contains("authorization: bearer tok"), "{request}");
        assert_eq!(order.id, OrderId(9));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_amount, Price::new(250));

        Ok(())
    }

    #[tokio::test]
    async fn gift_card_redemption_posts_code() -> TestResult {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"message":"Gift card redeemed successfully","gift_card":{"id":2,"amount":10.0,"redeemed_at":"2024-05-03 08:15:00"}}"#,
        )?;

        let redeemed = client(base_url)?.redeem_gift_card("tok", "GC-BBBB2222").await?;

        let request = server.join().unwrap_or_default();

        assert!(request.starts_with("POST /api/gift-cards/redeem "), "{request}");
        assert!(request.contains(r#"{"code":"GC-BBBB2222"}"#), "{request}");
        assert_eq!(redeemed.amount, Price::new(1000));
        assert_eq!(redeemed.redeemed_at, "2024-05-03T08:15:00Z".parse::<jiff::Timestamp>()?);

        Ok(())
    }

    #[tokio::test]
    async fn gift_card_not_found_keeps_server_message() -> TestResult {
        let (base_url, server) =
            serve_once("404 Not Found", r#"{"error":"Gift card not found"}"#)?;

        let result = client(base_url)?.redeem_gift_card("tok", "GC-NOPE").await;

        server.join().unwrap_or_default();

        assert!(
            matches!(
                &result,
                Err(RemoteError::Status { status: 404, message }) if message == "Gift card not found"
            ),
            "expected 404 with server message, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn gift_card_purchase_returns_code() -> TestResult {
        let (base_url, server) = serve_once(
            "201 Created",
            r#"{"message":"Gift card created successfully","gift_card":{"id":4,"code":"GC-ABCD1234","amount":25.0,"receiver_email":"bea@example.com","expiration_date":"2025-05-01"}}"#,
        )?;

        let issued = client(base_url)?
            .create_gift_card(
                "tok",
                &NewGiftCard {
                    amount: Price::new(2500),
                    receiver_email: "bea@example.com".to_string(),
                    message: String::new(),
                },
            )
            .await?;

        let request = server.join().unwrap_or_default();

        assert!(request.starts_with("POST /api/gift-cards/ "), "{request}");
        assert!(request.contains(r#""amount":25.0"#), "{request}");
        assert_eq!(issued.code, "GC-ABCD1234");
        assert_eq!(issued.expiration_date, jiff::civil::date(2025, 5, 1));

        Ok(())
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() -> TestResult {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let base_url = format!("http://{}", listener.local_addr()?);
        drop(listener);

        let result = client(base_url)?.profile("tok").await;

        assert!(
            matches!(result, Err(RemoteError::Transport(_) | RemoteError::Timeout)),
            "expected transport error, got {result:?}"
        );

        Ok(())
    }
}
