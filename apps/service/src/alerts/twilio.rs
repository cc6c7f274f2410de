use async_trait::async_trait;

use crate::config::Twilio;
use crate::error::AlertError;

use super::AlertGateway;

/// Twilio caps message bodies at 1600 characters.
const MAX_MESSAGE_LEN: usize = 1600;

/// SMS delivery through the Twilio REST API.
pub struct TwilioGateway {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_phone: String,
}

impl TwilioGateway {
    pub fn new(config: &Twilio) -> Self {
        Self {
            client: reqwest::Client::new(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_phone: config.from_phone.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json", self.account_sid)
    }
}

#[async_trait]
impl AlertGateway for TwilioGateway {
    async fn send(&self, recipient: &str, message: &str) -> Result<(), AlertError> {
        let recipient = recipient.trim();
        let message = message.trim();
        if recipient.is_empty() {
            return Err(AlertError::InvalidParameters("recipient is empty"));
        }
        if message.is_empty() || message.len() > MAX_MESSAGE_LEN {
            return Err(AlertError::InvalidParameters("message is empty or too long"));
        }

        let form = [("From", self.from_phone.as_str()), ("To", recipient), ("Body", message)];

        let response = self
            .client
            .post(self.endpoint())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await?;

        match response.status().as_u16() {
            200 | 201 => Ok(()),
            status => Err(AlertError::Rejected(status)),
        }
    }
}
