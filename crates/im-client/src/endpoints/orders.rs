use im_api_types::{
    Ack, CreateOrderRequest, CreateOrderResponse, OrderId, OrderList, OrderStatus,
    UpdateOrderStatusRequest,
};

use crate::client::{ApiClient, RequestOptions};
use crate::error::ApiError;
use crate::transport::Transport;

impl<T: Transport> ApiClient<T> {
    pub async fn orders(&self) -> Result<OrderList, ApiError> {
        self.request("/user/orders", RequestOptions::get()).await
    }

    pub async fn create_order(&self, order: &CreateOrderRequest) -> Result<CreateOrderResponse, ApiError> {
        self.request("/orders", RequestOptions::post().json(order)?)
            .await
    }

    /// PUT /orders/:id/status after checking the move locally.
    pub async fn update_order_status(
        &self,
        order: &OrderId,
        current: OrderStatus,
        next: OrderStatus,
    ) -> Result<Ack, ApiError> {
        if !current.can_transition_to(next) {
            return Err(ApiError::Validation(format!(
                "订单状态不能从 {} 变更为 {}",
                current.as_str(),
                next.as_str()
            )));
        }
        let options = RequestOptions::put().json(&UpdateOrderStatusRequest { status: next })?;
        self.request(&format!("/orders/{order}/status"), options)
            .await
    }
}
