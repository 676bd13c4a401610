use crate::date_range::{DATE_FORMAT, DateRange};
use serde::{Deserialize, Serialize};

/// Placeholder in an email template that is replaced by the message content
pub const BODY_PLACEHOLDER: &str = "[%body%]";

/// An outgoing email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailData {
    pub to: String,
    pub from: String,
    pub subject: String,
    /// HTML content
    pub content: String,
    /// File name of the template the content is wrapped in, if any
    pub template: Option<String>,
}

impl MailData {
    /// Wraps the content in `template`, replacing the first placeholder
    pub fn render_with(&self, template: &str) -> String {
        template.replacen(BODY_PLACEHOLDER, &self.content, 1)
    }
}

/// What the confirmation messages say about a booking
#[derive(Debug, Clone)]
pub struct BookingNotice<'a> {
    pub guest_first_name: &'a str,
    pub guest_last_name: &'a str,
    pub guest_email: &'a str,
    pub room_name: &'a str,
    pub stay: DateRange,
}

impl BookingNotice<'_> {
    pub const TEMPLATE: &'static str = "basic.html";

    pub fn guest_confirmation(&self, from: &str) -> MailData {
        let content = format!(
            "<strong>Reservation confirmation</strong><br>\
             Dear {}, <br>\
             This is to confirm your reservation of the {} from {} to {}.",
            self.guest_first_name,
            self.room_name,
            self.stay.start().format(DATE_FORMAT),
            self.stay.end().format(DATE_FORMAT),
        );

        MailData {
            to: self.guest_email.to_owned(),
            from: from.to_owned(),
            subject: "Reservation confirmation".to_string(),
            content,
            template: Some(Self::TEMPLATE.to_string()),
        }
    }

    pub fn owner_notification(&self, owner: &str) -> MailData {
        let content = format!(
            "<strong>Reservation notification</strong><br>\
             A reservation has been made by {} {} ({}) for the {} from {} to {}.",
            self.guest_first_name,
            self.guest_last_name,
            self.guest_email,
            self.room_name,
            self.stay.start().format(DATE_FORMAT),
            self.stay.end().format(DATE_FORMAT),
        );

        MailData {
            to: owner.to_owned(),
            from: owner.to_owned(),
            subject: "Reservation notification".to_string(),
            content,
            template: Some(Self::TEMPLATE.to_string()),
        }
    }
}
