//! Handler bodies for the command surface, one function per registered
//! command. Each takes the whitespace-split argument list (name already
//! stripped) and renders its own human-readable response line — the
//! dispatcher never inspects a handler's success/failure, it just forwards
//! whatever string comes back to the output writer.

use std::sync::Arc;

use chrono::Utc;
use oms::domain::{Order, Packaging};
use oms::store::order_store::GetOrdersOptions;
use oms::usecase::OrderUseCase;
use pvz_common::{OrderId, PvzResult, RecipientId};

use crate::duration::parse_duration;

fn render_order(order: &Order) -> String {
    format!(
        "order {} pvz={} recipient={} cost={} weight={} packaging={} state={:?}",
        order.id,
        order.pvz_id,
        order.recipient_id,
        order.cost,
        order.weight,
        order.packaging,
        order.state()
    )
}

fn arity_error(command: &str, expected: &str) -> String {
    format!("{command}: expected {expected}")
}

pub async fn accept_delivery(args: &[String], use_case: &OrderUseCase) -> PvzResult<String> {
    if args.len() != 6 && args.len() != 7 {
        return Ok(arity_error(
            "accept-delivery",
            "<order> <recipient> <duration> <cost> <weight> <packaging> [<additional-film>]",
        ));
    }
    let order_id = OrderId::from(args[0].clone());
    let recipient_id = RecipientId::from(args[1].clone());
    let storage_time = parse_duration(&args[2])?;
    let cost: i64 = args[3]
        .parse()
        .map_err(|_| pvz_common::PvzError::invalid_argument("cost must be an integer"))?;
    let weight: i64 = args[4]
        .parse()
        .map_err(|_| pvz_common::PvzError::invalid_argument("weight must be an integer"))?;
    let packaging: Packaging = args[5].parse()?;
    let additional_film = args.get(6).map(String::as_str) == Some("true");

    let order = use_case
        .accept_order_delivery(
            order_id,
            recipient_id,
            storage_time,
            cost,
            weight,
            packaging,
            additional_film,
        )
        .await?;
    Ok(format!("accepted {}", render_order(&order)))
}

pub async fn return_delivery(args: &[String], use_case: &OrderUseCase) -> PvzResult<String> {
    let [order_id] = args else {
        return Ok(arity_error("return-delivery", "<order>"));
    };
    use_case
        .return_order_delivery(OrderId::from(order_id.clone()), Utc::now())
        .await?;
    Ok(format!("returned {order_id} to courier"))
}

pub async fn give_orders(args: &[String], use_case: &OrderUseCase) -> PvzResult<String> {
    if args.is_empty() {
        return Ok(arity_error("give-orders", "<order…>"));
    }
    let order_ids: Vec<OrderId> = args.iter().cloned().map(OrderId::from).collect();
    let count = order_ids.len();
    use_case.give_order_to_client(order_ids, Utc::now()).await?;
    Ok(format!("issued {count} order(s) to client"))
}

pub async fn accept_return(args: &[String], use_case: &OrderUseCase) -> PvzResult<String> {
    let [recipient_id, order_id] = args else {
        return Ok(arity_error("accept-return", "<recipient> <order>"));
    };
    use_case
        .accept_return(
            RecipientId::from(recipient_id.clone()),
            OrderId::from(order_id.clone()),
            Utc::now(),
        )
        .await?;
    Ok(format!("accepted return of {order_id} from {recipient_id}"))
}

pub async fn get_orders(args: &[String], use_case: &OrderUseCase) -> PvzResult<String> {
    let [user] = args else {
        return Ok(arity_error("get-orders", "<user>"));
    };
    let orders = use_case
        .get_orders(RecipientId::from(user.clone()), GetOrdersOptions::default(), false)
        .await?;
    if orders.is_empty() {
        return Ok(format!("no orders for {user}"));
    }
    Ok(orders.iter().map(render_order).collect::<Vec<_>>().join("\n"))
}

pub async fn get_returns(args: &[String], use_case: &OrderUseCase) -> PvzResult<String> {
    if !args.is_empty() {
        return Ok(arity_error("get-returns", "(no arguments)"));
    }
    let orders = use_case
        .get_returns(oms::store::order_store::GetReturnsOptions::default())
        .await?;
    if orders.is_empty() {
        return Ok("no returned orders".to_string());
    }
    Ok(orders.iter().map(render_order).collect::<Vec<_>>().join("\n"))
}

/// The names under which the commands above are registered, in the order
/// `help` lists them — mirrors the registration order of the original
/// command-line tool's subcommands.
pub const REGISTERED: &[&str] = &[
    "accept-delivery",
    "accept-return",
    "get-orders",
    "get-returns",
    "give-orders",
    "return-delivery",
];

/// Dispatch `name` to its handler, returning `None` if `name` is not one of
/// [`REGISTERED`].
pub async fn run(name: &str, args: &[String], use_case: &Arc<OrderUseCase>) -> Option<PvzResult<String>> {
    Some(match name {
        "accept-delivery" => accept_delivery(args, use_case).await,
        "accept-return" => accept_return(args, use_case).await,
        "get-orders" => get_orders(args, use_case).await,
        "get-returns" => get_returns(args, use_case).await,
        "give-orders" => give_orders(args, use_case).await,
        "return-delivery" => return_delivery(args, use_case).await,
        _ => return None,
    })
}
