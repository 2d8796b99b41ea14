//! Deep links that hand an exported quotation over to the client's email or
//! chat application. The exported file cannot be attached programmatically, so
//! every target carries an instruction telling the advisor to attach it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::quotation::Quotation;

pub const MESSAGING_BASE_URL: &str = "https://wa.me";
const ADVISOR_FALLBACK_NAME: &str = "Asesora";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    #[serde(alias = "whatsapp")]
    Messaging,
}

impl Channel {
    pub fn attachment_instruction(self) -> &'static str {
        match self {
            Self::Email => "Adjunta el PDF descargado al correo.",
            Self::Messaging => "Adjunta el PDF descargado al mensaje de WhatsApp.",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email => f.write_str("email"),
            Self::Messaging => f.write_str("messaging"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unsupported channel `{0}` (expected email|whatsapp)")]
pub struct UnknownChannel(pub String);

impl FromStr for Channel {
    type Err = UnknownChannel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "email" | "correo" => Ok(Self::Email),
            "messaging" | "whatsapp" => Ok(Self::Messaging),
            _ => Err(UnknownChannel(value.trim().to_owned())),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HandoffError {
    #[error("client phone number has no digits")]
    NoPhoneNumber,
}

impl HandoffError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NoPhoneNumber => "El cliente no tiene número de celular registrado.",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelTarget {
    pub channel: Channel,
    pub recipient: String,
    pub url: String,
    pub instruction: String,
}

/// Keeps only ASCII digits, so `"+57 300-123-4567"` becomes `"573001234567"`.
pub fn digits_only(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

pub fn email_subject(company_name: &str) -> String {
    format!("Cotización de seguro {company_name}")
}

pub fn email_body(quotation: &Quotation) -> String {
    let advisor = quotation.advisor.name.trim();
    let advisor = if advisor.is_empty() { ADVISOR_FALLBACK_NAME } else { advisor };
    format!(
        "Hola {},\n\nAdjunto encontrarás tu cotización de seguro.\n\nSaludos,\n{advisor}",
        quotation.client.name
    )
}

pub fn messaging_text(quotation: &Quotation, company_name: &str) -> String {
    format!("Hola {}, te comparto la cotización de seguro {company_name}.", quotation.client.name)
}

/// `mailto:` target addressed to the client's stored email.
pub fn email_target(quotation: &Quotation, company_name: &str) -> ChannelTarget {
    let recipient = quotation.client.email.trim().to_owned();
    let url = format!(
        "mailto:{recipient}?subject={}&body={}",
        urlencoding::encode(&email_subject(company_name)),
        urlencoding::encode(&email_body(quotation)),
    );
    ChannelTarget {
        channel: Channel::Email,
        recipient,
        url,
        instruction: Channel::Email.attachment_instruction().to_owned(),
    }
}

/// Chat deep link for the client's phone, stripped to digits.
pub fn messaging_target(
    quotation: &Quotation,
    company_name: &str,
) -> Result<ChannelTarget, HandoffError> {
    let recipient = digits_only(&quotation.client.phone);
    if recipient.is_empty() {
        return Err(HandoffError::NoPhoneNumber);
    }

    let url = format!(
        "{MESSAGING_BASE_URL}/{recipient}?text={}",
        urlencoding::encode(&messaging_text(quotation, company_name)),
    );
    Ok(ChannelTarget {
        channel: Channel::Messaging,
        recipient,
        url,
        instruction: Channel::Messaging.attachment_instruction().to_owned(),
    })
}

pub fn target_for(
    channel: Channel,
    quotation: &Quotation,
    company_name: &str,
) -> Result<ChannelTarget, HandoffError> {
    match channel {
        Channel::Email => Ok(email_target(quotation, company_name)),
        Channel::Messaging => messaging_target(quotation, company_name),
    }
}
