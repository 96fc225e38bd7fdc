use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::templates::OutgoingMail;
use super::transport::{AuthMechanism, MailTransportConfig, SmtpAuth, SmtpSettings};
use super::{MailError, MailTransport, TransportConnector};

/// Connector backed by lettre's async SMTP client
#[derive(Debug, Clone, Copy, Default)]
pub struct SmtpConnector;

impl TransportConnector for SmtpConnector {
    fn connect(&self, config: &MailTransportConfig) -> Result<Box<dyn MailTransport>, MailError> {
        let transport = match config {
            MailTransportConfig::Service { service, auth } => {
                AsyncSmtpTransport::<Tokio1Executor>::relay(service.relay_host())
                    .map_err(|e| MailError::InvalidConfig(format!("SMTP relay error: {}", e)))?
                    .credentials(credentials(auth))
                    .build()
            }
            MailTransportConfig::Smtp(settings) => smtp_transport(settings)?,
        };

        Ok(Box::new(SmtpMailTransport { transport }))
    }
}

fn credentials(auth: &SmtpAuth) -> Credentials {
    Credentials::new(auth.user.clone(), auth.pass.clone())
}

fn smtp_transport(
    settings: &SmtpSettings,
) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailError> {
    let tls_parameters = TlsParameters::builder(settings.host.clone())
        .dangerous_accept_invalid_certs(!settings.tls.reject_unauthorized)
        .build()
        .map_err(|e| MailError::InvalidConfig(format!("TLS configuration error: {}", e)))?;

    if let Some(ciphers) = &settings.tls.ciphers {
        tracing::debug!(
            host = %settings.host,
            ciphers = %ciphers,
            "Cipher override not supported by the TLS backend, using its defaults"
        );
    }

    let tls = if settings.secure {
        Tls::Wrapper(tls_parameters)
    } else if settings.require_tls {
        Tls::Required(tls_parameters)
    } else {
        Tls::Opportunistic(tls_parameters)
    };

    let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
        .port(settings.port)
        .tls(tls)
        .credentials(credentials(&settings.auth));

    if let Some(AuthMechanism::Plain) = settings.auth_mechanism {
        builder = builder.authentication(vec![Mechanism::Plain]);
    }

    Ok(builder.build())
}

struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn verify(&self) -> Result<(), MailError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(MailError::VerificationFailed(
                "SMTP server did not accept the connection".to_string(),
            )),
            Err(e) => Err(MailError::VerificationFailed(e.to_string())),
        }
    }

    async fn send_mail(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let message = build_message(mail)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::SendFailed(e.to_string()))?;

        tracing::info!(to = %mail.to, subject = %mail.subject, "Email sent");
        Ok(())
    }
}

fn parse_mailbox(name: Option<&str>, address: &str) -> Result<Mailbox, MailError> {
    let address = address
        .parse()
        .map_err(|e| MailError::InvalidAddress(format!("{}: {}", address, e)))?;
    Ok(Mailbox::new(name.map(str::to_string), address))
}

fn build_message(mail: &OutgoingMail) -> Result<Message, MailError> {
    let mut builder = Message::builder()
        .from(parse_mailbox(Some(mail.from_name.as_str()), &mail.from_address)?)
        .to(parse_mailbox(None, &mail.to)?)
        .subject(mail.subject.clone());

    if let Some(reply_to) = &mail.reply_to {
        builder = builder.reply_to(parse_mailbox(None, reply_to)?);
    }

    builder
        .multipart(MultiPart::alternative_plain_html(
            mail.text.clone(),
            mail.html.clone(),
        ))
        .map_err(|e| MailError::SendFailed(format!("Failed to build email: {}", e)))
}
