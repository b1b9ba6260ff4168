//! Delivery of a finished archive by email or to a server.
use std::path::Path;

use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use reqwest::{header::CONTENT_TYPE, Url};
use tracing::info;

use crate::{
    launcher::{
        channel::{EmailChannel, EmailTransport, ServerTarget},
        config::{EmailSection, HubSection},
    },
    lib::errors::PackagerError,
};

const ZIP_CONTENT_TYPE: &str = "application/zip";

/// Build the upload URL for a server target.
pub fn upload_url(target: &ServerTarget, hub: &HubSection) -> Result<Url, PackagerError> {
    let (scheme, host, port, segments, repository) = match target {
        ServerTarget::Customer(customer) => (
            scheme(hub.use_ssl),
            hub.default_host.as_str(),
            0,
            vec!["customers", customer.as_str(), "sessions"],
            None,
        ),
        ServerTarget::Explicit {
            server,
            port,
            use_ssl,
            base_directory,
            repository,
        } => {
            let mut segments: Vec<&str> = base_directory
                .as_deref()
                .unwrap_or_default()
                .split('/')
                .filter(|segment| !segment.is_empty())
                .collect();
            segments.push("sessions");
            (
                scheme(*use_ssl),
                server.as_str(),
                *port,
                segments,
                repository.as_deref().filter(|repo| !repo.is_empty()),
            )
        }
    };

    let invalid = |message: &str| PackagerError::InvalidAddress {
        field: "server",
        value: host.to_string(),
        message: message.to_string(),
    };

    let mut url =
        Url::parse(&format!("{scheme}://{host}/")).map_err(|err| invalid(&err.to_string()))?;
    if port != 0 {
        url.set_port(Some(port))
            .map_err(|_| invalid("cannot carry a port"))?;
    }
    url.path_segments_mut()
        .map_err(|_| invalid("cannot carry a path"))?
        .pop_if_empty()
        .extend(segments);
    if let Some(repository) = repository {
        url.query_pairs_mut().append_pair("repository", repository);
    }
    Ok(url)
}

fn scheme(use_ssl: bool) -> &'static str {
    if use_ssl {
        "https"
    } else {
        "http"
    }
}

/// POST the archive to the server target.
pub async fn upload_archive(
    target: &ServerTarget,
    hub: &HubSection,
    archive: &Path,
) -> Result<String, PackagerError> {
    let url = upload_url(target, hub)?;
    let body = tokio::fs::read(archive)
        .await
        .map_err(|source| PackagerError::Io {
            path: archive.to_path_buf(),
            source,
        })?;

    info!(
        target: "diag_packager::transport",
        url = %url,
        bytes = body.len(),
        "Uploading package"
    );

    let transport_error = |err: reqwest::Error| PackagerError::Transport {
        channel: "server",
        message: err.to_string(),
    };
    reqwest::Client::new()
        .post(url.clone())
        .header(CONTENT_TYPE, ZIP_CONTENT_TYPE)
        .body(body)
        .send()
        .await
        .map_err(transport_error)?
        .error_for_status()
        .map_err(transport_error)?;

    Ok(url.to_string())
}

/// Mail the archive as an attachment.
pub async fn email_archive(
    channel: &EmailChannel,
    settings: &EmailSection,
    archive: &Path,
    summary: &str,
) -> Result<String, PackagerError> {
    let from = parse_mailbox("from", channel.from.as_deref())?;
    let to = parse_mailbox("destination", channel.destination.as_deref())?;

    let file_name = archive
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "package.zip".to_string());
    let body = tokio::fs::read(archive)
        .await
        .map_err(|source| PackagerError::Io {
            path: archive.to_path_buf(),
            source,
        })?;
    let content_type = ContentType::parse(ZIP_CONTENT_TYPE).map_err(|err| {
        PackagerError::Transport {
            channel: "email",
            message: err.to_string(),
        }
    })?;

    let message = Message::builder()
        .from(from)
        .to(to.clone())
        .subject(settings.subject.as_str())
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(summary.to_string()))
                .singlepart(Attachment::new(file_name).body(body, content_type)),
        )
        .map_err(|err| PackagerError::Transport {
            channel: "email",
            message: format!("failed to create email message: {err}"),
        })?;

    let (mailer, host) = build_mailer(channel, settings)?;
    info!(
        target: "diag_packager::transport",
        smtp_host = %host,
        to = %to,
        "Sending package by email"
    );
    mailer
        .send(message)
        .await
        .map_err(|err| PackagerError::Transport {
            channel: "email",
            message: format!("failed to send email via {host}: {err}"),
        })?;

    Ok(to.to_string())
}

fn parse_mailbox(field: &'static str, value: Option<&str>) -> Result<Mailbox, PackagerError> {
    let value = value.unwrap_or_default();
    value
        .parse::<Mailbox>()
        .map_err(|err| PackagerError::InvalidAddress {
            field,
            value: value.to_string(),
            message: err.to_string(),
        })
}

fn build_mailer(
    channel: &EmailChannel,
    settings: &EmailSection,
) -> Result<(AsyncSmtpTransport<Tokio1Executor>, String), PackagerError> {
    match &channel.transport {
        EmailTransport::Default => Ok((
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(
                settings.default_server.clone(),
            )
            .port(settings.default_port)
            .build(),
            settings.default_server.clone(),
        )),
        EmailTransport::Explicit {
            server,
            port,
            use_ssl,
            credentials,
        } => {
            let mut builder = if *use_ssl {
                AsyncSmtpTransport::<Tokio1Executor>::relay(server).map_err(|err| {
                    PackagerError::Transport {
                        channel: "email",
                        message: format!("failed to create TLS SMTP mailer: {err}"),
                    }
                })?
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(server.clone())
            };
            if *port != 0 {
                builder = builder.port(*port);
            }
            if let Some(credentials) = credentials {
                builder = builder.credentials(Credentials::new(
                    credentials.user.clone(),
                    credentials.password.clone().unwrap_or_default(),
                ));
            }
            Ok((builder.build(), server.clone()))
        }
    }
}
