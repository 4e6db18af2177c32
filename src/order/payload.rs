use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::door::{Accessory, Casing, Crown, Door, Extension, LineItem, ProductRef};
use super::Order;
use crate::numeric::money_string;
use crate::pricing::Settlement;

/// Door as sent to the backend, nested entries already filtered.
#[derive(Debug, Serialize)]
pub struct DoorPayload<'a> {
    pub model: Option<&'a ProductRef>,
    pub price: Decimal,
    pub quantity: u32,
    pub height: Decimal,
    pub width: Decimal,
    pub material: Option<&'a str>,
    pub color: Option<&'a str>,
    pub glass_type: Option<u64>,
    pub threshold: Option<u64>,
    pub extensions: Vec<&'a Extension>,
    pub casings: Vec<&'a Casing>,
    pub crowns: Vec<&'a Crown>,
    pub accessories: Vec<&'a Accessory>,
}

fn submittable<T: LineItem>(items: &[T]) -> Vec<&T> {
    items.iter().filter(|item| item.is_submittable()).collect()
}

impl<'a> From<&'a Door> for DoorPayload<'a> {
    fn from(door: &'a Door) -> Self {
        Self {
            model: door.model.as_ref(),
            price: door.price,
            quantity: door.quantity,
            height: door.height,
            width: door.width,
            material: door.material.as_deref(),
            color: door.color.as_deref(),
            glass_type: door.glass_type,
            threshold: door.threshold,
            extensions: submittable(&door.extensions),
            casings: submittable(&door.casings),
            crowns: submittable(&door.crowns),
            accessories: submittable(&door.accessories),
        }
    }
}

/// Order graph for the calculate endpoint.
#[derive(Debug, Serialize)]
pub struct OrderGraph<'a> {
    pub order_number: &'a str,
    pub customer: &'a str,
    pub phone: Option<&'a str>,
    pub order_date: NaiveDate,
    pub deadline: Option<NaiveDate>,
    pub doors: Vec<DoorPayload<'a>>,
}

impl<'a> From<&'a Order> for OrderGraph<'a> {
    fn from(order: &'a Order) -> Self {
        Self {
            order_number: &order.number,
            customer: &order.customer,
            phone: order.phone.as_deref(),
            order_date: order.date,
            deadline: order.deadline,
            doors: order.doors.iter().map(DoorPayload::from).collect(),
        }
    }
}

/// Create/update body: the graph plus settled money as fixed-point strings.
#[derive(Debug, Serialize)]
pub struct OrderSubmission<'a> {
    #[serde(flatten)]
    pub graph: OrderGraph<'a>,
    pub discount_percentage: String,
    pub discount_amount: String,
    pub agreement_amount: String,
    pub total_amount: String,
    pub advance_payment: String,
    pub remaining_balance: String,
}

impl<'a> OrderSubmission<'a> {
    pub fn new(order: &'a Order) -> Self {
        let settlement: Settlement = order.settlement();
        Self {
            graph: OrderGraph::from(order),
            discount_percentage: money_string(order.discount.discount_percentage),
            discount_amount: money_string(settlement.total_discount_amount),
            agreement_amount: money_string(order.discount.agreement_amount),
            total_amount: money_string(settlement.total_amount),
            advance_payment: money_string(settlement.advance_payment),
            remaining_balance: money_string(settlement.remaining_balance),
        }
    }
}

/// The part of the create/update response we keep.
#[derive(Debug, Deserialize)]
pub struct SubmittedOrder {
    pub id: u64,
}
