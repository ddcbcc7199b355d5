use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{
    activity::Activity,
    auth::Role,
    booking::{Booking, BookingStatus, PaymentMethod, PaymentStatus},
};

// WhatsApp is outbound-only: staff open the generated wa.me links by hand.
// Everything in here is string templating; there is no API client, no
// delivery receipt and no retry.

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WhatsAppContact {
    pub name: String,
    pub phone: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WhatsAppLink {
    pub name: String,
    pub phone: String,
    pub link: String,
}

/// Payload shared by the booking-alert and payment-confirmation templates.
#[derive(Debug, Clone)]
pub struct BookingNotification {
    pub booking_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub activity_name: String,
    pub number_of_people: i32,
    pub preferred_date: NaiveDate,
    pub participant_names: Vec<String>,
    pub total_amount: i64,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: PaymentStatus,
    pub status: BookingStatus,
    pub notes: Option<String>,
}

impl BookingNotification {
    pub fn from_booking(booking: &Booking, activity: &Activity) -> Self {
        Self {
            booking_id: booking.id.to_string(),
            customer_name: booking.customer_name.clone(),
            customer_phone: booking.customer_phone.clone(),
            activity_name: activity.name.clone(),
            number_of_people: booking.number_of_people,
            preferred_date: booking.preferred_date,
            participant_names: booking.participant_names.clone(),
            total_amount: crate::services::bookings::parse_price(&booking.total_amount),
            payment_method: booking.payment_method,
            payment_status: booking.payment_status,
            status: booking.status,
            notes: booking.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentKind {
    Full,
    Deposit,
}

/// Builds a `https://wa.me/<digits>?text=<encoded>` deep link.
pub fn wa_link(phone: &str, text: &str) -> String {
    format!(
        "https://wa.me/{}?text={}",
        phone.replace('+', ""),
        urlencoding::encode(text)
    )
}

pub struct WhatsAppService {
    contacts: Vec<WhatsAppContact>,
}

impl Default for WhatsAppService {
    fn default() -> Self {
        Self::new()
    }
}

impl WhatsAppService {
    pub fn new() -> Self {
        let contact = |name: &str, phone: &str, role: Role| WhatsAppContact {
            name: name.to_string(),
            phone: phone.to_string(),
            role,
        };
        Self {
            contacts: vec![
                contact("Ahmed", "+212600623630", Role::Admin),
                contact("Yahia", "+212693323368", Role::Admin),
                contact("Nadia", "+212654497354", Role::Superadmin),
            ],
        }
    }

    pub fn contacts(&self) -> &[WhatsAppContact] {
        &self.contacts
    }

    /// One wa.me link per staff contact, all carrying the same message.
    pub fn admin_links(&self, message: &str) -> Vec<WhatsAppLink> {
        self.contacts
            .iter()
            .map(|contact| WhatsAppLink {
                name: contact.name.clone(),
                phone: contact.phone.clone(),
                link: wa_link(&contact.phone, message),
            })
            .collect()
    }

    pub fn customer_link(&self, notification: &BookingNotification, message: &str) -> WhatsAppLink {
        WhatsAppLink {
            name: notification.customer_name.clone(),
            phone: notification.customer_phone.clone(),
            link: wa_link(&notification.customer_phone, message),
        }
    }

    /// Staff alert for a fresh booking. Mirrors the tone the operators use
    /// with their customers: French, short lines, explicit next steps.
    pub fn format_booking_alert(&self, n: &BookingNotification) -> String {
        let participants = if n.participant_names.is_empty() {
            n.customer_name.clone()
        } else {
            n.participant_names.join(", ")
        };
        let notes = n
            .notes
            .as_deref()
            .map(|notes| format!("\nNotes: {notes}"))
            .unwrap_or_default();

        format!(
            "📌 Nouvelle réservation\n\
             Activité: {activity}\n\
             Date: {date}\n\
             Personnes: {people}\n\
             Noms: {participants}\n\
             Téléphone: {phone}{notes}\n\
             \n\
             💰 PAIEMENT:\n\
             • Montant total: {total} MAD\n\
             • Méthode: {method}\n\
             • Statut: {payment_status}\n\
             • Statut réservation: {status}\n\
             \n\
             🎯 ACTION REQUISE:\n\
             1. Contactez le client rapidement\n\
             2. Confirmez la disponibilité\n\
             3. Organisez le point de rendez-vous\n\
             \n\
             📞 Contactez {customer} au {phone}",
            activity = n.activity_name,
            date = n.preferred_date.format("%d/%m/%Y"),
            people = n.number_of_people,
            participants = participants,
            phone = n.customer_phone,
            notes = notes,
            total = n.total_amount,
            method = payment_method_text(n.payment_method),
            payment_status = payment_status_text(n.payment_status),
            status = booking_status_text(n.status),
            customer = n.customer_name,
        )
    }

    /// Customer confirmation. French by default; English when the booking
    /// request announced an English `Accept-Language`.
    pub fn format_customer_confirmation(&self, n: &BookingNotification, lang: &str) -> String {
        if lang == "en" {
            return format!(
                "🏜️ BOOKING CONFIRMATION - MarrakechDunes\n\
                 \n\
                 Hello {customer},\n\
                 \n\
                 ✅ Your booking request has been received!\n\
                 \n\
                 📋 YOUR BOOKING:\n\
                 • Activity: {activity}\n\
                 • Date: {date}\n\
                 • People: {people}\n\
                 • Total amount: {total} MAD\n\
                 • Booking ID: {id}\n\
                 \n\
                 💰 PAYMENT:\n\
                 • Method: cash (on site)\n\
                 • Status: {payment_status}\n\
                 \n\
                 Our team will contact you within 24h to confirm the meeting \
                 point and departure time.\n\
                 \n\
                 The MarrakechDunes team 🐪",
                customer = n.customer_name,
                activity = n.activity_name,
                date = n.preferred_date.format("%d/%m/%Y"),
                people = n.number_of_people,
                total = n.total_amount,
                id = n.booking_id,
                payment_status = payment_status_text_en(n.payment_status),
            );
        }

        format!(
            "🏜️ CONFIRMATION DE RÉSERVATION - MarrakechDunes\n\
             \n\
             Bonjour {customer},\n\
             \n\
             ✅ Votre demande de réservation a bien été reçue !\n\
             \n\
             📋 DÉTAILS DE VOTRE RÉSERVATION:\n\
             • Activité: {activity}\n\
             • Date: {date}\n\
             • Nombre de personnes: {people}\n\
             • Montant total: {total} MAD\n\
             • ID de réservation: {id}\n\
             \n\
             💰 PAIEMENT:\n\
             • Mode de paiement: Espèces (sur place)\n\
             • Statut: {payment_status}\n\
             \n\
             📍 POINT DE RENDEZ-VOUS:\n\
             Nous vous contacterons sous peu pour confirmer le lieu et \
             l'heure exacte de départ.\n\
             \n\
             Merci d'avoir choisi MarrakechDunes pour votre aventure marocaine !\n\
             \n\
             L'équipe MarrakechDunes 🐪",
            customer = n.customer_name,
            activity = n.activity_name,
            date = n.preferred_date.format("%d/%m/%Y"),
            people = n.number_of_people,
            total = n.total_amount,
            id = n.booking_id,
            payment_status = payment_status_text(n.payment_status),
        )
    }

    /// Staff alert for a payment update, full settlement or 30% deposit.
    pub fn format_payment_confirmation(
        &self,
        n: &BookingNotification,
        kind: PaymentKind,
    ) -> String {
        let deposit = ((n.total_amount as f64) * 0.3).round() as i64;
        let (header, amount) = match kind {
            PaymentKind::Full => ("PAIEMENT COMPLET", format!("{} MAD (complet)", n.total_amount)),
            PaymentKind::Deposit => ("ACOMPTE PAYÉ", format!("{deposit} MAD (acompte 30%)")),
        };
        let balance = match kind {
            PaymentKind::Full => String::new(),
            PaymentKind::Deposit => {
                format!("\n⚠️ SOLDE RESTANT: {} MAD", n.total_amount - deposit)
            }
        };

        format!(
            "💰 {header} CONFIRMÉ - MarrakechDunes\n\
             \n\
             📋 RÉSERVATION:\n\
             • ID: {id}\n\
             • Client: {customer}\n\
             • Activité: {activity}\n\
             • Montant payé: {amount}\n\
             \n\
             ✅ STATUT: Paiement confirmé en espèces{balance}\n\
             \n\
             📞 Client: {phone}",
            header = header,
            id = n.booking_id,
            customer = n.customer_name,
            activity = n.activity_name,
            amount = amount,
            balance = balance,
            phone = n.customer_phone,
        )
    }

    /// Builds and logs the links for a fresh booking. Delivery is manual,
    /// the log line is what staff act on in development.
    pub fn notify_booking_created(&self, n: &BookingNotification, lang: &str) {
        let alert = self.format_booking_alert(n);
        for link in self.admin_links(&alert) {
            tracing::info!(admin = %link.name, link = %link.link, "booking alert link");
        }

        let confirmation = self.format_customer_confirmation(n, lang);
        let customer = self.customer_link(n, &confirmation);
        tracing::info!(customer = %customer.name, link = %customer.link, "customer confirmation link");
    }

    pub fn notify_payment_updated(&self, n: &BookingNotification, kind: PaymentKind) {
        let message = self.format_payment_confirmation(n, kind);
        for link in self.admin_links(&message) {
            tracing::info!(admin = %link.name, link = %link.link, "payment confirmation link");
        }
    }
}

fn payment_method_text(method: Option<PaymentMethod>) -> &'static str {
    match method {
        Some(PaymentMethod::Cash) => "Espèces (paiement complet)",
        Some(PaymentMethod::CashDeposit) => "Espèces (acompte)",
        None => "Espèces",
    }
}

fn payment_status_text(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Unpaid => "❌ Non payé",
        PaymentStatus::DepositPaid => "🟡 Acompte payé",
        PaymentStatus::FullyPaid => "✅ Entièrement payé",
    }
}

fn payment_status_text_en(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Unpaid => "unpaid",
        PaymentStatus::DepositPaid => "deposit paid",
        PaymentStatus::FullyPaid => "fully paid",
    }
}

fn booking_status_text(status: BookingStatus) -> &'static str {
    match status {
        BookingStatus::Pending => "🟡 En attente",
        BookingStatus::Confirmed => "✅ Confirmée",
        BookingStatus::Cancelled => "❌ Annulée",
        BookingStatus::Completed => "✅ Terminée",
    }
}
