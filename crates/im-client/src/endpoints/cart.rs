use im_api_types::{
    Ack, AddToCartRequest, AddToCartResponse, Cart, CartItemId, InstrumentId, UpdateCartRequest,
};

use crate::client::{ApiClient, RequestOptions};
use crate::error::ApiError;
use crate::transport::Transport;

pub const MIN_QUANTITY_MESSAGE: &str = "数量不能小于1";

impl<T: Transport> ApiClient<T> {
    pub async fn cart(&self) -> Result<Cart, ApiError> {
        self.request("/cart", RequestOptions::get()).await
    }

    pub async fn add_to_cart(
        &self,
        instrument_id: InstrumentId,
        quantity: u32,
    ) -> Result<AddToCartResponse, ApiError> {
        let body = AddToCartRequest {
            instrument_id,
            quantity: quantity.max(1),
        };
        self.request("/cart/add", RequestOptions::post().json(&body)?)
            .await
    }

    /// PUT /cart/:id. Quantities below 1 are refused without a request.
    pub async fn update_cart_item(&self, item: CartItemId, quantity: i64) -> Result<Ack, ApiError> {
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q >= 1)
            .ok_or_else(|| ApiError::Validation(MIN_QUANTITY_MESSAGE.to_string()))?;
        let options = RequestOptions::put().json(&UpdateCartRequest { quantity })?;
        self.request(&format!("/cart/{item}"), options).await
    }

    pub async fn remove_cart_item(&self, item: CartItemId) -> Result<Ack, ApiError> {
        self.request(&format!("/cart/{item}"), RequestOptions::delete())
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::mock::{MockTransport, mock_client};
    use crate::transport::Method;

    use super::*;

    #[tokio::test]
    async fn quantity_below_one_never_reaches_the_server() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        let client = mock_client(&transport);

        for quantity in [0, -3] {
            let err = client
                .update_cart_item(CartItemId(7), quantity)
                .await
                .unwrap_err();
            assert_eq!(err, ApiError::Validation(MIN_QUANTITY_MESSAGE.into()));
        }
        assert!(transport.requests().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn add_to_cart_posts_id_and_quantity() -> anyhow::Result<()> {
        let transport = MockTransport::new();
        transport.reply(Method::Post, "/cart/add", 200, r#"{"success":true,"message":"已加入购物车"}"#);
        let client = mock_client(&transport);

        let added = client.add_to_cart(InstrumentId(42), 1).await?;
        assert_eq!(added.message.as_deref(), Some("已加入购物车"));

        let sent = transport.last_request_to(Method::Post, "/cart/add").expect("request recorded");
        let body: serde_json::Value = serde_json::from_str(sent.json_body().expect("json body"))?;
        assert_eq!(body, serde_json::json!({"instrument_id": 42, "quantity": 1}));
        Ok(())
    }
}
