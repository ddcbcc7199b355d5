use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::Storage,
    models::booking::{Booking, CreateBookingPayload, InsertBooking},
    services::whatsapp::{BookingNotification, WhatsAppService},
};

/// Leading-integer parse with the same semantics the booking totals have
/// always had: optional sign, digit prefix, everything after it ignored.
/// Unparseable input counts as zero.
pub fn parse_price(raw: &str) -> i64 {
    let s = raw.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let prefix: String = digits.chars().take_while(|c| c.is_ascii_digit()).collect();
    if prefix.is_empty() {
        tracing::warn!("unparseable price {raw:?}, treating as 0");
        return 0;
    }
    sign * prefix.parse::<i64>().unwrap_or_else(|_| {
        tracing::warn!("price {raw:?} overflows, treating as 0");
        0
    })
}

#[derive(Clone)]
pub struct BookingService {
    storage: Arc<dyn Storage>,
    whatsapp: Arc<WhatsAppService>,
}

impl BookingService {
    pub fn new(storage: Arc<dyn Storage>, whatsapp: Arc<WhatsAppService>) -> Self {
        Self { storage, whatsapp }
    }

    /// Creates a booking with the price snapshot taken now:
    /// `total = parse_price(activity.price) * number_of_people`. The new
    /// booking starts pending/unpaid. There is no capacity check against
    /// other bookings for the same date.
    pub async fn create(
        &self,
        payload: CreateBookingPayload,
        lang: &str,
    ) -> Result<Booking, AppError> {
        let activity = self
            .storage
            .get_activity(payload.activity_id)
            .await?
            .ok_or(AppError::NotFound("activity"))?;

        let total_amount = parse_price(&activity.price) * i64::from(payload.number_of_people);

        let participant_names = if payload.participant_names.is_empty() {
            vec![payload.customer_name.clone()]
        } else {
            payload.participant_names
        };

        let booking = self
            .storage
            .create_booking(InsertBooking {
                customer_name: payload.customer_name,
                customer_phone: payload.customer_phone,
                customer_email: payload.customer_email,
                activity_id: payload.activity_id,
                number_of_people: payload.number_of_people,
                preferred_date: payload.preferred_date,
                participant_names,
                notes: payload.notes,
                total_amount: total_amount.to_string(),
            })
            .await?;

        let notification = BookingNotification::from_booking(&booking, &activity);
        self.whatsapp.notify_booking_created(&notification, lang);

        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_integers() {
        assert_eq!(parse_price("450"), 450);
        assert_eq!(parse_price("1100"), 1100);
        assert_eq!(parse_price("0"), 0);
    }

    #[test]
    fn truncates_at_the_first_non_digit() {
        assert_eq!(parse_price("450.50"), 450);
        assert_eq!(parse_price("450 MAD"), 450);
        assert_eq!(parse_price("  99 "), 99);
    }

    #[test]
    fn handles_signs() {
        assert_eq!(parse_price("+450"), 450);
        assert_eq!(parse_price("-450"), -450);
    }

    #[test]
    fn unparseable_input_is_zero() {
        assert_eq!(parse_price(""), 0);
        assert_eq!(parse_price("abc"), 0);
        assert_eq!(parse_price("MAD 450"), 0);
    }
}
