//! Order placement and fulfilment.

use crate::context::AppContext;
use crate::services::{current_timestamp, require_admin, Pagination};
use crate::ApiError;
use bazar_auth::User;
use bazar_commerce::{
    Address, Cart, CommerceError, Order, OrderId, OrderItem, OrderStatus, PaymentMethod,
    PaymentStatus, Product,
};
use bazar_store::{filter, Filter, FindOptions};
use rand::Rng;

/// Filters for [`list_all_orders`]. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_method: Option<PaymentMethod>,
}

impl OrderQuery {
    fn to_filter(self) -> Filter {
        let mut filter = Filter::new();
        if let Some(status) = self.status {
            filter = filter.eq("status", status.as_str());
        }
        if let Some(payment_status) = self.payment_status {
            filter = filter.eq("payment_status", payment_status.as_str());
        }
        if let Some(payment_method) = self.payment_method {
            filter = filter.eq("payment_method", payment_method.as_str());
        }
        filter
    }
}

/// Place an order from the caller's cart.
///
/// Stock checks, the stock decrement for every line, the order insert,
/// and the cart clear commit together; if any line lacks stock, nothing
/// is decremented and the cart keeps its contents.
pub fn place_order(
    ctx: &AppContext,
    actor: &User,
    address_id: &str,
    payment_method: PaymentMethod,
) -> Result<Order, ApiError> {
    let user = actor.id.clone();

    let order = ctx.store.transaction::<_, ApiError, _>(|tx| {
        let mut cart: Cart = tx
            .find_one(&filter! {"user" => user.as_str()})?
            .ok_or(CommerceError::EmptyCart)?;
        if cart.is_empty() {
            return Err(CommerceError::EmptyCart.into());
        }

        let address: Address = tx
            .get(address_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Address not found: {}", address_id)))?;
        if address.user != user {
            return Err(ApiError::Forbidden("Address belongs to another user".to_string()));
        }

        let totals = cart.totals()?;

        let mut items = Vec::with_capacity(cart.items.len());
        for line in &cart.items {
            let mut product: Product = tx
                .get(line.product.as_str())?
                .ok_or_else(|| CommerceError::ProductNotFound(line.product.to_string()))?;
            product.take_stock(line.quantity)?;
            tx.save(&product)?;

            items.push(OrderItem {
                product: line.product.clone(),
                title: line.title.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                color: line.color.clone(),
            });
        }

        let now = current_timestamp();
        let order = Order {
            id: OrderId::generate(),
            user: user.clone(),
            items,
            shipping_address: address.to_shipping(),
            subtotal: totals.subtotal,
            discount: totals.discount,
            total: totals.total,
            coupon_code: cart.applied_coupon.as_ref().map(|c| c.code.clone()),
            payment_method,
            payment_status: PaymentStatus::Pending,
            paid_at: None,
            status: OrderStatus::Pending,
            tracking_code: None,
            created_at: now,
            updated_at: now,
        };
        tx.insert(&order)?;

        cart.clear();
        tx.save(&cart)?;
        Ok(order)
    })?;

    tracing::info!(
        order = %order.id,
        user = %order.user,
        total = %order.total,
        "order placed"
    );
    Ok(order)
}

/// Record a settled payment on an order.
pub fn mark_order_paid(ctx: &AppContext, actor: &User, id: &str) -> Result<Order, ApiError> {
    let mut order = load_owned(ctx, actor, id)?;
    order.mark_paid()?;
    ctx.store.save(&order)?;
    tracing::info!(order = %id, "payment settled");
    Ok(order)
}

/// Record a failed payment attempt. Admin only.
pub fn fail_order_payment(ctx: &AppContext, actor: &User, id: &str) -> Result<Order, ApiError> {
    require_admin(actor)?;
    let mut order = load(ctx, id)?;
    order.fail_payment()?;
    ctx.store.save(&order)?;
    tracing::warn!(order = %id, "payment failed");
    Ok(order)
}

/// Refund a settled payment. Admin only.
pub fn refund_order_payment(ctx: &AppContext, actor: &User, id: &str) -> Result<Order, ApiError> {
    require_admin(actor)?;
    let mut order = load(ctx, id)?;
    order.refund_payment()?;
    ctx.store.save(&order)?;
    tracing::info!(order = %id, "payment refunded");
    Ok(order)
}

/// Move an order into fulfilment. Admin only.
pub fn process_order(ctx: &AppContext, actor: &User, id: &str) -> Result<Order, ApiError> {
    require_admin(actor)?;
    let mut order = load(ctx, id)?;
    order.mark_processing()?;
    ctx.store.save(&order)?;
    Ok(order)
}

/// Hand an order to the carrier. Admin only. Assigns a tracking code.
pub fn ship_order(ctx: &AppContext, actor: &User, id: &str) -> Result<Order, ApiError> {
    require_admin(actor)?;
    let mut order = load(ctx, id)?;
    order.mark_shipped(generate_tracking_code())?;
    ctx.store.save(&order)?;
    tracing::info!(order = %id, tracking = ?order.tracking_code, "order shipped");
    Ok(order)
}

/// Replace the tracking code of a shipped order. Admin only.
pub fn set_tracking_code(
    ctx: &AppContext,
    actor: &User,
    id: &str,
    tracking_code: &str,
) -> Result<Order, ApiError> {
    require_admin(actor)?;
    if tracking_code.trim().is_empty() {
        return Err(ApiError::Validation("Tracking code is required".to_string()));
    }
    let mut order = load(ctx, id)?;
    if order.tracking_code.is_none() {
        return Err(ApiError::Validation(
            "Order has not been shipped yet".to_string(),
        ));
    }
    order.tracking_code = Some(tracking_code.trim().to_string());
    ctx.store.save(&order)?;
    Ok(order)
}

/// Mark an order delivered. Admin only.
pub fn deliver_order(ctx: &AppContext, actor: &User, id: &str) -> Result<Order, ApiError> {
    require_admin(actor)?;
    let mut order = load(ctx, id)?;
    order.mark_delivered()?;
    ctx.store.save(&order)?;
    Ok(order)
}

/// Cancel an order, returning its stock.
///
/// Allowed for the owner or an admin while the order has not been
/// delivered. The status change and every stock return commit together.
pub fn cancel_order(ctx: &AppContext, actor: &User, id: &str) -> Result<Order, ApiError> {
    let order = load_owned(ctx, actor, id)?;
    let id = order.id.clone();

    let order = ctx.store.transaction::<_, ApiError, _>(|tx| {
        let mut order: Order = tx
            .get(id.as_str())?
            .ok_or_else(|| CommerceError::OrderNotFound(id.to_string()))?;
        order.cancel()?;

        for item in &order.items {
            // The product may have been deleted since placement.
            let restored = tx.update::<Product, _>(item.product.as_str(), |product| {
                product.return_stock(item.quantity)
            })?;
            if !restored {
                tracing::warn!(
                    order = %id,
                    product = %item.product,
                    "stock not returned, product no longer exists"
                );
            }
        }

        tx.save(&order)?;
        Ok(order)
    })?;

    tracing::info!(order = %id, "order cancelled");
    Ok(order)
}

/// Fetch one order. Owner or admin.
pub fn get_order(ctx: &AppContext, actor: &User, id: &str) -> Result<Order, ApiError> {
    load_owned(ctx, actor, id)
}

/// List the caller's orders, newest first.
pub fn list_my_orders(ctx: &AppContext, actor: &User) -> Result<Vec<Order>, ApiError> {
    Ok(ctx.store.find(
        &filter! {"user" => actor.id.as_str()},
        &FindOptions::new().sort_desc("created_at"),
    )?)
}

/// List every order, newest first, with optional filters. Admin only.
pub fn list_all_orders(
    ctx: &AppContext,
    actor: &User,
    query: OrderQuery,
    page: Pagination,
) -> Result<Vec<Order>, ApiError> {
    require_admin(actor)?;
    Ok(ctx.store.find(
        &query.to_filter(),
        &page.apply(FindOptions::new().sort_desc("created_at")),
    )?)
}

fn load(ctx: &AppContext, id: &str) -> Result<Order, ApiError> {
    ctx.store
        .get(id)?
        .ok_or_else(|| CommerceError::OrderNotFound(id.to_string()).into())
}

fn load_owned(ctx: &AppContext, actor: &User, id: &str) -> Result<Order, ApiError> {
    let order = load(ctx, id)?;
    if order.user != actor.id && !actor.is_admin() {
        return Err(ApiError::Forbidden("Not your order".to_string()));
    }
    Ok(order)
}

fn generate_tracking_code() -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..10)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("TRK-{}", suffix)
}
