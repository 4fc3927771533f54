//! Single-page booking form with a static price table. No session gate.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ValidationError;

/// Formats accepted from a `datetime-local` input.
const DATE_TIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerType {
    #[default]
    Individual,
    Organization,
}

impl CustomerType {
    pub fn label(&self) -> &'static str {
        match self {
            CustomerType::Individual => "Pessoa Física",
            CustomerType::Organization => "Pessoa Jurídica",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceKind {
    #[serde(rename = "intercambio")]
    Exchange,
    #[serde(rename = "viagemCorporativa")]
    CorporateTrip,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 2] = [ServiceKind::Exchange, ServiceKind::CorporateTrip];

    pub fn key(&self) -> &'static str {
        match self {
            ServiceKind::Exchange => "intercambio",
            ServiceKind::CorporateTrip => "viagemCorporativa",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ServiceKind::Exchange => "Intercâmbio",
            ServiceKind::CorporateTrip => "Viagem Corporativa",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }
}

/// Fixed prices in whole reais
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceTable;

impl PriceTable {
    pub fn price_of(&self, kind: ServiceKind) -> u32 {
        match kind {
            ServiceKind::Exchange => 7500,
            ServiceKind::CorporateTrip => 10500,
        }
    }

    /// Price for a raw service key; unknown keys cost 0.
    pub fn lookup(&self, key: &str) -> u32 {
        ServiceKind::from_key(key).map_or(0, |kind| self.price_of(kind))
    }
}

/// `7500` -> `7.500`
pub fn format_reais(amount: u32) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingAction {
    SetCustomerType(CustomerType),
    SetEmail(String),
    SetPassword(String),
    /// Raw value of the service select
    SelectService(String),
    SetDateTime(String),
    CalculatePrice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingForm {
    pub customer_type: CustomerType,
    pub email: String,
    pub password: String,
    pub service: String,
    pub date_time: String,
    /// Last calculated price; 0 until "Calcular preço" runs.
    pub price: u32,
}

impl Default for BookingForm {
    fn default() -> Self {
        Self {
            customer_type: CustomerType::default(),
            email: String::new(),
            password: String::new(),
            service: ServiceKind::Exchange.key().to_string(),
            date_time: String::new(),
            price: 0,
        }
    }
}

impl BookingForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reduce(mut self, action: BookingAction) -> Self {
        match action {
            BookingAction::SetCustomerType(kind) => self.customer_type = kind,
            BookingAction::SetEmail(email) => self.email = email,
            BookingAction::SetPassword(password) => self.password = password,
            BookingAction::SelectService(service) => self.service = service,
            BookingAction::SetDateTime(value) => self.date_time = value,
            BookingAction::CalculatePrice => {
                self.price = PriceTable.lookup(&self.service);
                debug!(service = %self.service, price = self.price, "Price calculated");
            }
        }
        self
    }

    /// The "Preço total" line, shown only for a positive price.
    pub fn price_line(&self) -> Option<String> {
        (self.price > 0).then(|| format!("Preço total: R$ {}", format_reais(self.price)))
    }

    /// Required-field check in form order, then the confirmation.
    /// The price is whatever was last calculated, 0 if never.
    pub fn confirm(&self) -> Result<BookingConfirmation, ValidationError> {
        if self.email.is_empty() {
            return Err(ValidationError::RequiredField { field: "E-mail" });
        }
        if self.password.is_empty() {
            return Err(ValidationError::RequiredField { field: "Senha" });
        }
        let scheduled_for = parse_date_time(&self.date_time)
            .ok_or(ValidationError::RequiredField { field: "Data e Hora" })?;

        info!(
            customer_type = ?self.customer_type,
            service = %self.service,
            %scheduled_for,
            price = self.price,
            "Booking confirmed"
        );
        Ok(BookingConfirmation {
            customer_type: self.customer_type,
            service: self.service.clone(),
            date_time: self.date_time.clone(),
            scheduled_for,
            price: self.price,
        })
    }
}

fn parse_date_time(raw: &str) -> Option<NaiveDateTime> {
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingConfirmation {
    pub customer_type: CustomerType,
    pub service: String,
    /// As typed, for display
    pub date_time: String,
    pub scheduled_for: NaiveDateTime,
    pub price: u32,
}

impl BookingConfirmation {
    pub fn message(&self) -> String {
        format!(
            "Agendamento realizado!\nTipo: {}\nServiço: {}\nData: {}\nValor: R$ {}",
            self.customer_type.label(),
            self.service,
            self.date_time,
            format_reais(self.price)
        )
    }
}
