//! Order confirmation email.
//!
//! Uses SMTP via lettre with Askama templates (HTML and plain text).

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;
use yarn_core::ProductDescriptor;

use crate::config::EmailConfig;
use crate::models::Order;

#[derive(Template)]
#[template(path = "email/order_confirmation.html")]
struct OrderConfirmationHtml<'a> {
    customer_name: &'a str,
    order_id: &'a str,
    lines: Vec<&'a ProductDescriptor>,
    garment_count: u32,
    track_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/order_confirmation.txt")]
struct OrderConfirmationText<'a> {
    customer_name: &'a str,
    order_id: &'a str,
    lines: Vec<&'a ProductDescriptor>,
    garment_count: u32,
    track_url: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum MailerError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Sends transactional email to customers.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    base_url: String,
}

impl EmailService {
    /// Create a new email service. `base_url` is the public storefront URL
    /// used for tracking links.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig, base_url: &str) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn track_url(&self, order: &Order) -> String {
        format!("{}/track/{}", self.base_url, order.order_id)
    }

    /// Send the order confirmation to the order's customer.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_order_confirmation(&self, order: &Order) -> Result<(), MailerError> {
        let (text, html) = render_confirmation(order, &self.track_url(order))?;
        let subject = format!("Yarn order {} received", order.order_id);

        self.send_multipart_email(order.customer.email.as_str(), &subject, &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), MailerError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| MailerError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| MailerError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

/// Render the (text, html) bodies of an order confirmation.
fn render_confirmation(order: &Order, track_url: &str) -> Result<(String, String), MailerError> {
    let lines: Vec<&ProductDescriptor> = order.items.iter().map(|i| &i.product).collect();
    let order_id = order.order_id.as_str();
    let customer_name = order.customer.name.as_str();
    let garment_count = order.garment_count();

    let html = OrderConfirmationHtml {
        customer_name,
        order_id,
        lines: lines.clone(),
        garment_count,
        track_url,
    }
    .render()?;
    let text = OrderConfirmationText {
        customer_name,
        order_id,
        lines,
        garment_count,
        track_url,
    }
    .render()?;

    Ok((text, html))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use yarn_core::{CartItem, Email, OrderId};

    use super::*;
    use crate::models::Customer;

    fn order() -> Order {
        let customer = Customer {
            name: "Noura <Admin>".to_string(),
            email: Email::parse("noura@clinic.example").unwrap(),
            phone: None,
            organization: Some("Riyadh Clinic".to_string()),
        };
        let items = vec![CartItem::new(
            "line-1",
            ProductDescriptor {
                sector: "healthcare".to_string(),
                garment_type: "scrubs".to_string(),
                size: "M".to_string(),
                quantity: 12,
            },
        )];
        Order::new(OrderId::parse("YARN-AB12CD34").unwrap(), customer, items)
    }

    #[test]
    fn test_confirmation_contains_order_details() {
        let (text, html) =
            render_confirmation(&order(), "https://yarn.example/track/YARN-AB12CD34").unwrap();

        for body in [&text, &html] {
            assert!(body.contains("YARN-AB12CD34"));
            assert!(body.contains("scrubs"));
            assert!(body.contains("12"));
            assert!(body.contains("https://yarn.example/track/YARN-AB12CD34"));
        }
    }

    #[test]
    fn test_html_body_escapes_customer_name() {
        let (text, html) = render_confirmation(&order(), "https://yarn.example/t").unwrap();
        assert!(html.contains("Noura &#60;Admin&#62;") || html.contains("Noura &lt;Admin&gt;"));
        assert!(text.contains("Noura <Admin>"));
    }
}
